//! End-to-end tests for the need-data / enough-data handshake.

use synthsrc::prelude::*;

struct CollectingSink {
    frames: Vec<FrameBuffer>,
    eos_count: u32,
}

impl CollectingSink {
    fn new() -> Self {
        Self {
            frames: Vec::new(),
            eos_count: 0,
        }
    }
}

impl Sink for CollectingSink {
    fn consume(&mut self, frame: FrameBuffer) -> synthsrc::Result<()> {
        self.frames.push(frame);
        Ok(())
    }

    fn end_of_stream(&mut self) -> synthsrc::Result<()> {
        self.eos_count += 1;
        Ok(())
    }
}

#[test]
fn no_frames_without_need_data() {
    let controller = SourceController::new(VideoCaps::default());
    // Production is entirely demand driven.
    assert_eq!(controller.state(), SourceState::Idle);
    assert_eq!(controller.frames_emitted(), 0);
}

#[test]
fn need_enough_need_emits_three_frames() {
    let caps: VideoCaps = "video/x-raw,format=RGB,width=16,height=16,framerate=30/1"
        .parse()
        .unwrap();
    let mut controller = SourceController::new(caps);
    let mut sink = CollectingSink::new();

    controller.on_need_data(&mut sink, 768).unwrap();
    controller.on_need_data(&mut sink, 768).unwrap();
    controller.on_enough_data();
    controller.on_need_data(&mut sink, 768).unwrap();

    assert_eq!(sink.frames.len(), 3);
    assert_eq!(controller.state(), SourceState::Feeding);
}

#[test]
fn pts_ladder_matches_framerate() {
    let caps: VideoCaps = "video/x-raw,format=RGB,width=8,height=8,framerate=30/1"
        .parse()
        .unwrap();
    let duration = caps.framerate.frame_duration_ns();
    assert_eq!(duration, 33_333_333);

    let mut controller = SourceController::new(caps);
    let mut sink = CollectingSink::new();
    for _ in 0..30 {
        controller.on_need_data(&mut sink, 0).unwrap();
    }

    for (i, frame) in sink.frames.iter().enumerate() {
        let n = i as u64 + 1;
        assert_eq!(frame.pts(), ClockTime::from_nanos(n * duration));
        assert_eq!(frame.duration(), ClockTime::from_nanos(duration));
    }
    // Pausing and resuming must not disturb the ladder.
    controller.on_enough_data();
    controller.on_need_data(&mut sink, 0).unwrap();
    assert_eq!(
        sink.frames[30].pts(),
        ClockTime::from_nanos(31 * duration)
    );
}

#[test]
fn frame_payloads_are_caps_sized() {
    for (caps_str, expected) in [
        ("video/x-raw,format=RGB,width=32,height=16,framerate=25/1", 32 * 16 * 3),
        ("video/x-raw,format=RGBA,width=32,height=16,framerate=25/1", 32 * 16 * 4),
        ("video/x-raw,format=GRAY16_LE,width=32,height=16,framerate=25/1", 32 * 16 * 2),
    ] {
        let caps: VideoCaps = caps_str.parse().unwrap();
        let mut controller = SourceController::new(caps);
        let mut sink = CollectingSink::new();
        controller.on_need_data(&mut sink, 0).unwrap();
        assert_eq!(sink.frames[0].len(), expected, "caps: {caps_str}");
    }
}

#[test]
fn num_buffers_ends_stream_exactly_once() {
    let caps: VideoCaps = "video/x-raw,format=RGB,width=4,height=4,framerate=30/1"
        .parse()
        .unwrap();
    let mut controller = SourceController::new(caps).with_num_buffers(5);
    let mut sink = CollectingSink::new();

    for _ in 0..20 {
        controller.on_need_data(&mut sink, 0).unwrap();
    }

    assert_eq!(sink.frames.len(), 5);
    assert_eq!(sink.eos_count, 1);
    assert!(controller.is_eos());
    assert_eq!(controller.state(), SourceState::Idle);
}

#[test]
fn caps_from_pipeline_description_drive_the_source() {
    let caps = VideoCaps::from_pipeline(
        "appsrc caps=video/x-raw,format=BGRA,width=10,height=10,framerate=60/1 \
         ! queue ! videoconvert ! autovideosink",
        &VideoCaps::default(),
    )
    .unwrap();

    let mut controller = SourceController::new(caps);
    let mut sink = CollectingSink::new();
    controller.on_need_data(&mut sink, 0).unwrap();

    assert_eq!(sink.frames[0].len(), 10 * 10 * 4);
    assert_eq!(
        sink.frames[0].duration(),
        ClockTime::from_nanos(16_666_667)
    );
}

#[test]
fn bounded_queue_host_round_trips() {
    // Simulates the process-level run loop: fill to capacity, signal
    // enough-data, drain, repeat until end of stream.
    let caps: VideoCaps = "video/x-raw,format=RGB,width=8,height=8,framerate=30/1"
        .parse()
        .unwrap();
    let mut controller = SourceController::new(caps).with_num_buffers(20);
    let capacity = 6usize;

    struct BoundedSink {
        queue: Vec<FrameBuffer>,
        drained: Vec<FrameBuffer>,
        eos: bool,
    }
    impl Sink for BoundedSink {
        fn consume(&mut self, frame: FrameBuffer) -> synthsrc::Result<()> {
            self.queue.push(frame);
            Ok(())
        }
        fn end_of_stream(&mut self) -> synthsrc::Result<()> {
            self.eos = true;
            Ok(())
        }
    }

    let mut sink = BoundedSink {
        queue: Vec::new(),
        drained: Vec::new(),
        eos: false,
    };

    while !sink.eos {
        while sink.queue.len() < capacity && !controller.is_eos() {
            controller.on_need_data(&mut sink, 0).unwrap();
        }
        if controller.state() == SourceState::Feeding {
            controller.on_enough_data();
        }
        sink.drained.append(&mut sink.queue);
        if controller.is_eos() {
            break;
        }
    }

    assert_eq!(sink.drained.len(), 20);
    assert!(sink.eos);
    // Sequence numbers and timestamps are gapless despite the pauses.
    let d = caps.framerate.frame_duration_ns();
    for (i, frame) in sink.drained.iter().enumerate() {
        assert_eq!(frame.sequence(), i as u64);
        assert_eq!(frame.pts().nanos(), (i as u64 + 1) * d);
    }
}
