//! Error types for synthsrc.

use thiserror::Error;

/// Result type alias using synthsrc's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for synthsrc operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caps string contains no parseable `key=value` properties.
    ///
    /// Callers that have defaults available (e.g. caps extracted from a
    /// pipeline description) recover from this locally.
    #[error("malformed caps: no parseable properties")]
    MalformedCaps,

    /// Pixel format is not in the known format table.
    ///
    /// Not recoverable: channel count and sample type cannot be derived
    /// for an unknown format.
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// Requested frame dimensions overflow buffer-size arithmetic.
    #[error("frame size overflow: {width}x{height} at {bytes_per_pixel} bytes/pixel")]
    FrameOverflow {
        /// Requested frame width in pixels.
        width: u32,
        /// Requested frame height in pixels.
        height: u32,
        /// Derived bytes per pixel for the requested format.
        bytes_per_pixel: usize,
    },

    /// Pipeline description could not be parsed.
    #[error("pipeline parse error: {0}")]
    Parse(String),

    /// Frame emission was rejected by the downstream sink.
    #[error("sink rejected frame: {0}")]
    Sink(String),
}
