//! The backpressure-driven source controller.
//!
//! This module implements the producer half of the `need-data` /
//! `enough-data` handshake. The host pipeline owns the element graph,
//! clocks, and message bus; it calls [`SourceController::on_need_data`]
//! when its queue wants frames and [`SourceController::on_enough_data`]
//! when the queue is full. The controller honors those signals and emits
//! exactly one stamped frame per `need-data`, through the [`Sink`]
//! boundary.
//!
//! # Design
//!
//! ```text
//! Host ──need-data──> SourceController ──synthesize──> FrameSynthesizer
//!  ^                        │                                │
//!  │                   PacingClock <──pixel buffer───────────┘
//!  └──── Sink::consume(frame) ── stamped pts/duration
//! ```
//!
//! Execution is single-threaded and callback-driven: the host serializes
//! signals, at most one callback is in flight, and nothing here blocks,
//! sleeps, or consults wall time. Pacing is logical (see
//! [`PacingClock`]); backpressure is cooperative and binary.

use crate::buffer::FrameBuffer;
use crate::caps::VideoCaps;
use crate::clock::PacingClock;
use crate::error::Result;
use crate::synth::FrameSynthesizer;

/// Conditions reported on the host's message bus.
///
/// These originate outside the source (decode errors, negotiation
/// failures, stream end); the run loop observes them to decide whether to
/// keep going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    /// Normal, non-error end of the stream.
    Eos,
    /// Transient condition; logged, does not stop the run.
    Warning(String),
    /// Fatal condition; stops the run.
    Error(String),
}

/// The consumer side of the host boundary.
///
/// The host pipeline implements this to receive frames. `consume` transfers
/// ownership of one frame; what happens downstream (queueing, conversion,
/// rendering) is the host's business.
pub trait Sink: Send {
    /// Consume one frame. Ownership transfers to the sink.
    fn consume(&mut self, frame: FrameBuffer) -> Result<()>;

    /// Called once when the source has produced its configured number of
    /// frames and will not produce more.
    fn end_of_stream(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Feeding state of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceState {
    /// Not producing; waiting for a need-data signal.
    #[default]
    Idle,
    /// Producing one frame per need-data signal.
    Feeding,
}

/// State machine driving on-demand frame production.
///
/// Starts [`Idle`](SourceState::Idle). A `need-data` signal promotes it to
/// [`Feeding`](SourceState::Feeding) and produces exactly one frame; further
/// `need-data` signals keep it in `Feeding`, one frame each. An
/// `enough-data` signal drops it back to `Idle` immediately; production
/// resumes only on the next `need-data`. Repeated `enough-data` while
/// already `Idle` is a no-op.
///
/// A synthesis or emission failure halts feeding (back to `Idle`) and
/// surfaces the error to the caller; there is no automatic retry.
///
/// # Example
///
/// ```rust
/// use synthsrc::prelude::*;
///
/// struct Collect(Vec<FrameBuffer>);
/// impl Sink for Collect {
///     fn consume(&mut self, frame: FrameBuffer) -> synthsrc::Result<()> {
///         self.0.push(frame);
///         Ok(())
///     }
/// }
///
/// let mut controller = SourceController::new(VideoCaps::default());
/// let mut sink = Collect(Vec::new());
///
/// controller.on_need_data(&mut sink, 4096).unwrap();
/// controller.on_need_data(&mut sink, 4096).unwrap();
/// controller.on_enough_data();
/// assert_eq!(sink.0.len(), 2);
/// assert_eq!(controller.state(), SourceState::Idle);
/// ```
#[derive(Debug)]
pub struct SourceController {
    synth: FrameSynthesizer,
    clock: PacingClock,
    state: SourceState,
    sequence: u64,
    num_buffers: Option<u64>,
    eos_sent: bool,
}

impl SourceController {
    /// Create a controller for the given caps.
    pub fn new(caps: VideoCaps) -> Self {
        Self {
            synth: FrameSynthesizer::new(caps),
            clock: PacingClock::new(caps.framerate),
            state: SourceState::Idle,
            sequence: 0,
            num_buffers: None,
            eos_sent: false,
        }
    }

    /// Set the random seed for frame synthesis.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.synth = self.synth.with_seed(seed);
        self
    }

    /// Limit the total number of frames produced before end-of-stream.
    ///
    /// `0` means unbounded, matching the process-level flag.
    pub fn with_num_buffers(mut self, count: u64) -> Self {
        self.num_buffers = if count == 0 { None } else { Some(count) };
        self
    }

    /// Current feeding state.
    #[inline]
    pub fn state(&self) -> SourceState {
        self.state
    }

    /// Number of frames emitted so far.
    #[inline]
    pub fn frames_emitted(&self) -> u64 {
        self.sequence
    }

    /// The caps this source produces.
    pub fn caps(&self) -> &VideoCaps {
        self.synth.caps()
    }

    /// Whether end-of-stream has been signaled to the sink.
    #[inline]
    pub fn is_eos(&self) -> bool {
        self.eos_sent
    }

    /// Handle a `need-data` signal from the host.
    ///
    /// Synthesizes, stamps, and emits exactly one frame. The
    /// `requested_length` hint is logged but does not influence frame
    /// size; the frame is sized by the caps alone.
    ///
    /// Errors from synthesis or the sink halt feeding and propagate; the
    /// controller does not retry.
    pub fn on_need_data<S: Sink>(&mut self, sink: &mut S, requested_length: usize) -> Result<()> {
        if self.eos_sent {
            tracing::trace!("need-data after eos, ignoring");
            return Ok(());
        }

        if let Some(max) = self.num_buffers {
            if self.sequence >= max {
                tracing::info!(frames = self.sequence, "frame limit reached, signaling eos");
                self.state = SourceState::Idle;
                self.eos_sent = true;
                return sink.end_of_stream();
            }
        }

        if self.state == SourceState::Idle {
            self.state = SourceState::Feeding;
            tracing::info!(pts = %self.clock.position(), "start feeding");
        }

        let data = match self.synth.synthesize() {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "frame synthesis failed, halting feed");
                self.state = SourceState::Idle;
                return Err(e);
            }
        };

        let (pts, duration) = self.clock.advance();
        let frame = FrameBuffer::new(data, pts, duration, self.sequence);
        self.sequence += 1;

        tracing::debug!(
            sequence = frame.sequence(),
            pts = %pts,
            size = frame.len(),
            requested_length,
            "frame emitted"
        );

        if let Err(e) = sink.consume(frame) {
            tracing::error!(error = %e, "sink rejected frame, halting feed");
            self.state = SourceState::Idle;
            return Err(e);
        }
        Ok(())
    }

    /// Handle an `enough-data` signal from the host.
    ///
    /// The downstream queue is full: stop producing immediately. Resumes
    /// only on the next `need-data`. A repeat signal while already idle is
    /// a no-op.
    pub fn on_enough_data(&mut self) {
        match self.state {
            SourceState::Feeding => {
                self.state = SourceState::Idle;
                tracing::info!(pts = %self.clock.position(), "stop feeding");
            }
            SourceState::Idle => {
                tracing::trace!("enough-data while idle, ignoring");
            }
        }
    }
}
