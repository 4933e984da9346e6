//! Frame buffer type handed across the host boundary.

use crate::clock::ClockTime;
use bytes::Bytes;

/// One synthesized video frame.
///
/// Holds the raw pixel payload together with its timing metadata. The
/// payload length always equals `width * height * channels * sample_size`
/// for the caps in force when the frame was synthesized.
///
/// Ownership transfers to the consumer on emission; the producer never
/// retains or reuses a frame after hand-off. Cloning is cheap (the payload
/// is a reference-counted [`Bytes`]).
#[derive(Clone)]
pub struct FrameBuffer {
    data: Bytes,
    pts: ClockTime,
    duration: ClockTime,
    sequence: u64,
}

impl FrameBuffer {
    /// Create a new frame buffer.
    pub fn new(data: Bytes, pts: ClockTime, duration: ClockTime, sequence: u64) -> Self {
        Self {
            data,
            pts,
            duration,
            sequence,
        }
    }

    /// Get the pixel payload as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take the pixel payload.
    #[inline]
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Get the payload length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Presentation timestamp relative to stream start.
    #[inline]
    pub fn pts(&self) -> ClockTime {
        self.pts
    }

    /// Duration of this frame's content.
    #[inline]
    pub fn duration(&self) -> ClockTime {
        self.duration
    }

    /// Monotonic sequence number within the stream.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("len", &self.data.len())
            .field("pts", &self.pts)
            .field("duration", &self.duration)
            .field("sequence", &self.sequence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_accessors() {
        let frame = FrameBuffer::new(
            Bytes::from(vec![1, 2, 3, 4]),
            ClockTime::from_millis(33),
            ClockTime::from_millis(33),
            7,
        );
        assert_eq!(frame.len(), 4);
        assert!(!frame.is_empty());
        assert_eq!(frame.as_bytes(), &[1, 2, 3, 4]);
        assert_eq!(frame.pts().millis(), 33);
        assert_eq!(frame.sequence(), 7);
    }

    #[test]
    fn test_frame_buffer_clone_shares_payload() {
        let frame = FrameBuffer::new(
            Bytes::from(vec![0u8; 16]),
            ClockTime::ZERO,
            ClockTime::ZERO,
            0,
        );
        let clone = frame.clone();
        assert_eq!(frame.as_bytes().as_ptr(), clone.as_bytes().as_ptr());
    }
}
