//! Command-line host for the on-demand frame source.
//!
//! Parses a gst-launch style pipeline description for its source caps,
//! then drives a [`SourceController`] against a bounded in-process queue:
//! fill the queue with need-data signals, signal enough-data when it is
//! full, drain, repeat. The run ends when the configured frame count is
//! reached (end-of-stream) or a fatal bus message is observed.

use std::collections::VecDeque;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use synthsrc::buffer::FrameBuffer;
use synthsrc::caps::VideoCaps;
use synthsrc::source::{BusMessage, Sink, SourceController, SourceState};
use synthsrc::Result;

const DEFAULT_PIPELINE: &str = "appsrc caps=video/x-raw,format=RGB,width=640,height=480,framerate=30/1 ! queue ! videoconvert ! autovideosink";

#[derive(Parser, Debug)]
#[command(name = "synthsrc", about = "On-demand synthetic video frame source", version)]
struct Args {
    /// Pipeline description; the first element's caps property configures
    /// the frames to synthesize.
    #[arg(long, default_value = DEFAULT_PIPELINE)]
    pipeline: String,

    /// Number of frames to produce before end-of-stream (0 = unbounded).
    #[arg(long, default_value_t = 100)]
    num_buffers: u64,

    /// Random seed for frame content (0 = default seed).
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Downstream queue capacity in frames.
    #[arg(long, default_value_t = 8)]
    queue_capacity: usize,
}

/// Bounded frame queue standing in for the downstream pipeline chain.
///
/// Accepts frames until full; the run loop watches [`QueueSink::is_full`]
/// to know when to signal enough-data, and drains between rounds. The
/// end-of-stream call posts [`BusMessage::Eos`] so the run loop observes
/// stream end the same way it would observe any other bus condition.
struct QueueSink {
    queue: VecDeque<FrameBuffer>,
    capacity: usize,
    bus: VecDeque<BusMessage>,
    frames_drained: u64,
    bytes_drained: u64,
}

impl QueueSink {
    fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            bus: VecDeque::new(),
            frames_drained: 0,
            bytes_drained: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    /// Consume everything queued, as the downstream chain would.
    fn drain(&mut self) {
        while let Some(frame) = self.queue.pop_front() {
            self.frames_drained += 1;
            self.bytes_drained += frame.len() as u64;
            tracing::trace!(
                sequence = frame.sequence(),
                pts = %frame.pts(),
                size = frame.len(),
                "frame drained"
            );
        }
    }

    fn poll_bus(&mut self) -> Option<BusMessage> {
        self.bus.pop_front()
    }
}

impl Sink for QueueSink {
    fn consume(&mut self, frame: FrameBuffer) -> Result<()> {
        self.queue.push_back(frame);
        Ok(())
    }

    fn end_of_stream(&mut self) -> Result<()> {
        self.bus.push_back(BusMessage::Eos);
        Ok(())
    }
}

fn run(args: &Args) -> Result<bool> {
    let caps = VideoCaps::from_pipeline(&args.pipeline, &VideoCaps::default())?;
    let frame_size = caps.frame_size()?;
    tracing::info!(
        caps = %caps,
        frame_size,
        num_buffers = args.num_buffers,
        "pipeline configured"
    );

    let mut controller = SourceController::new(caps)
        .with_seed(args.seed)
        .with_num_buffers(args.num_buffers);
    let mut sink = QueueSink::new(args.queue_capacity.max(1));

    loop {
        // Fill until the queue pushes back, one frame per signal.
        while !sink.is_full() && !controller.is_eos() {
            controller.on_need_data(&mut sink, frame_size)?;
        }
        if controller.state() == SourceState::Feeding {
            controller.on_enough_data();
        }

        sink.drain();

        while let Some(message) = sink.poll_bus() {
            match message {
                BusMessage::Eos => {
                    tracing::info!(
                        frames = sink.frames_drained,
                        bytes = sink.bytes_drained,
                        "end of stream"
                    );
                    return Ok(true);
                }
                BusMessage::Warning(text) => {
                    tracing::warn!(message = %text, "bus warning");
                }
                BusMessage::Error(text) => {
                    tracing::error!(message = %text, "bus error");
                    return Ok(false);
                }
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}
