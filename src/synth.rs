//! Random frame synthesis.
//!
//! Produces caps-sized buffers of uniform noise, one per request. This is
//! intentionally synthetic test data: there is no correctness relationship
//! between consecutive frames, only between each frame and the caps that
//! sized it.

use crate::caps::{SampleType, VideoCaps};
use crate::error::Result;
use bytes::{BufMut, Bytes, BytesMut};

/// Default seed, shared with nothing in particular.
const DEFAULT_SEED: u64 = 0x853c49e6748fea9b;

/// A generator of random video frames.
///
/// Each [`synthesize`](FrameSynthesizer::synthesize) call allocates a fresh
/// buffer of `width * height * channels` samples, each drawn independently
/// and uniformly from the sample type's full range. The generator is
/// explicitly seedable so synthesized content is reproducible under test;
/// the buffer *length* is a function of the caps alone and holds across
/// seeds.
///
/// # Example
///
/// ```rust
/// use synthsrc::caps::VideoCaps;
/// use synthsrc::synth::FrameSynthesizer;
///
/// let caps = VideoCaps::default();
/// let mut synth = FrameSynthesizer::new(caps).with_seed(42);
/// let frame = synth.synthesize().unwrap();
/// assert_eq!(frame.len(), 640 * 480 * 3);
/// ```
#[derive(Debug, Clone)]
pub struct FrameSynthesizer {
    caps: VideoCaps,
    rng_state: u64,
}

impl FrameSynthesizer {
    /// Create a synthesizer for the given caps.
    pub fn new(caps: VideoCaps) -> Self {
        Self {
            caps,
            rng_state: DEFAULT_SEED,
        }
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        // xorshift has a fixed point at zero
        self.rng_state = if seed == 0 { DEFAULT_SEED } else { seed };
        self
    }

    /// Get the caps this synthesizer produces frames for.
    pub fn caps(&self) -> &VideoCaps {
        &self.caps
    }

    // Simple xorshift64 PRNG
    fn next_random(&mut self) -> u64 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        x
    }

    /// Synthesize one frame of uniform noise.
    ///
    /// Fails with [`Error::FrameOverflow`](crate::Error::FrameOverflow)
    /// when the caps dimensions are not representable as a buffer size;
    /// otherwise always succeeds.
    pub fn synthesize(&mut self) -> Result<Bytes> {
        let samples = self.caps.samples_per_frame()?;
        let size = self.caps.frame_size()?;
        let mut data = BytesMut::with_capacity(size);

        match self.caps.sample_type() {
            SampleType::U8 => {
                for _ in 0..samples {
                    data.put_u8((self.next_random() & 0xFF) as u8);
                }
            }
            SampleType::U16 => {
                for _ in 0..samples {
                    data.put_u16_le((self.next_random() & 0xFFFF) as u16);
                }
            }
        }

        debug_assert_eq!(data.len(), size);
        Ok(data.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::{Framerate, PixelFormat};

    #[test]
    fn test_synthesize_length_matches_caps() {
        let caps = VideoCaps::new(100, 100, PixelFormat::Rgb24, Framerate::FPS_30);
        let mut synth = FrameSynthesizer::new(caps);
        assert_eq!(synth.synthesize().unwrap().len(), 100 * 100 * 3);

        let caps = VideoCaps::new(100, 100, PixelFormat::Rgba, Framerate::FPS_30);
        let mut synth = FrameSynthesizer::new(caps);
        assert_eq!(synth.synthesize().unwrap().len(), 100 * 100 * 4);

        let caps = VideoCaps::new(64, 64, PixelFormat::Gray16Le, Framerate::FPS_30);
        let mut synth = FrameSynthesizer::new(caps);
        assert_eq!(synth.synthesize().unwrap().len(), 64 * 64 * 2);
    }

    #[test]
    fn test_synthesize_length_invariant_across_seeds() {
        let caps = VideoCaps::new(32, 32, PixelFormat::Bgr24, Framerate::FPS_30);
        for seed in [1, 42, 12345, u64::MAX] {
            let mut synth = FrameSynthesizer::new(caps).with_seed(seed);
            assert_eq!(synth.synthesize().unwrap().len(), 32 * 32 * 3);
        }
    }

    #[test]
    fn test_synthesize_reproducible_with_seed() {
        let caps = VideoCaps::new(16, 16, PixelFormat::Rgb24, Framerate::FPS_30);
        let mut a = FrameSynthesizer::new(caps).with_seed(12345);
        let mut b = FrameSynthesizer::new(caps).with_seed(12345);
        assert_eq!(a.synthesize().unwrap(), b.synthesize().unwrap());
    }

    #[test]
    fn test_synthesize_differs_across_calls() {
        let caps = VideoCaps::new(16, 16, PixelFormat::Rgb24, Framerate::FPS_30);
        let mut synth = FrameSynthesizer::new(caps).with_seed(7);
        let first = synth.synthesize().unwrap();
        let second = synth.synthesize().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_synthesize_overflow() {
        let caps = VideoCaps::new(u32::MAX, u32::MAX, PixelFormat::Rgba, Framerate::FPS_30);
        let mut synth = FrameSynthesizer::new(caps);
        assert!(synth.synthesize().is_err());
    }

    #[test]
    fn test_zero_seed_is_remapped() {
        // A zero xorshift state would generate all-zero frames forever.
        let caps = VideoCaps::new(8, 8, PixelFormat::Gray8, Framerate::FPS_30);
        let mut synth = FrameSynthesizer::new(caps).with_seed(0);
        let frame = synth.synthesize().unwrap();
        assert!(frame.iter().any(|&b| b != 0));
    }
}
