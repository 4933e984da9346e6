//! # synthsrc
//!
//! An on-demand synthetic video frame source with backpressure-aware pacing.
//!
//! The crate implements the producer half of a `need-data` / `enough-data`
//! handshake: a downstream host signals when it wants frames and when its
//! queue is full, and the [`SourceController`](source::SourceController)
//! responds by synthesizing exactly one caps-sized random frame per request,
//! stamped with logically paced presentation timestamps.
//!
//! The pipeline engine on the other side of the boundary (element graph,
//! conversion, rendering, clock threads) is deliberately out of scope; it is
//! represented by the [`Sink`](source::Sink) trait.
//!
//! ## Quick Start
//!
//! ```rust
//! use synthsrc::prelude::*;
//!
//! struct Collect(Vec<FrameBuffer>);
//!
//! impl Sink for Collect {
//!     fn consume(&mut self, frame: FrameBuffer) -> synthsrc::Result<()> {
//!         self.0.push(frame);
//!         Ok(())
//!     }
//! }
//!
//! let caps = VideoCaps::default(); // 640x480, RGB, 30/1
//! let mut controller = SourceController::new(caps);
//! let mut sink = Collect(Vec::new());
//!
//! controller.on_need_data(&mut sink, 4096).unwrap();
//! assert_eq!(sink.0.len(), 1);
//! controller.on_enough_data(); // downstream queue is full, stop
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod caps;
pub mod clock;
pub mod error;
pub mod parser;
pub mod source;
pub mod synth;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::buffer::FrameBuffer;
    pub use crate::caps::{Framerate, PixelFormat, SampleType, VideoCaps};
    pub use crate::clock::{ClockTime, PacingClock};
    pub use crate::error::{Error, Result};
    pub use crate::source::{BusMessage, Sink, SourceController, SourceState};
    pub use crate::synth::FrameSynthesizer;
}

pub use error::{Error, Result};
