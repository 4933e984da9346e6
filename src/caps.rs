//! Stream caps: negotiated frame parameters.
//!
//! A caps string is a compact description of a raw video stream:
//!
//! ```text
//! video/x-raw,format=RGB,width=640,height=480,framerate=30/1
//! ```
//!
//! [`VideoCaps`] parses such strings (either standalone or embedded as a
//! `caps=` property on the first element of a pipeline description), holds
//! the negotiated parameters immutably, and derives channel count and sample
//! type from the pixel format through a fixed lookup table.

use crate::error::{Error, Result};
use crate::parser::parse_pipeline;

// ============================================================================
// Pixel Formats
// ============================================================================

/// Pixel formats (color layout and per-channel width).
///
/// The format uniquely determines the channel count and sample type; they
/// are never configured independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PixelFormat {
    /// RGB 8-bit per channel, packed (24 bits/pixel).
    #[default]
    Rgb24 = 0,
    /// RGBA 8-bit per channel, packed (32 bits/pixel).
    Rgba,
    /// BGR 8-bit per channel, packed (24 bits/pixel).
    Bgr24,
    /// BGRA 8-bit per channel, packed (32 bits/pixel).
    Bgra,
    /// 8-bit grayscale.
    Gray8,
    /// 16-bit grayscale little endian.
    Gray16Le,
}

/// Per-sample storage type, derived from the pixel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SampleType {
    /// Unsigned 8-bit samples (0..=255).
    #[default]
    U8,
    /// Unsigned 16-bit little-endian samples (0..=65535).
    U16,
}

impl SampleType {
    /// Size of one sample in bytes.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::U16 => 2,
        }
    }
}

impl PixelFormat {
    /// Number of channels (samples per pixel).
    #[inline]
    pub const fn channels(self) -> u32 {
        match self {
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => 3,
            PixelFormat::Rgba | PixelFormat::Bgra => 4,
            PixelFormat::Gray8 | PixelFormat::Gray16Le => 1,
        }
    }

    /// Per-sample storage type.
    #[inline]
    pub const fn sample_type(self) -> SampleType {
        match self {
            PixelFormat::Gray16Le => SampleType::U16,
            _ => SampleType::U8,
        }
    }

    /// Bytes per pixel (channels times sample size).
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.channels() as usize * self.sample_type().size()
    }

    /// The name used in caps strings.
    pub const fn caps_name(self) -> &'static str {
        match self {
            PixelFormat::Rgb24 => "RGB",
            PixelFormat::Rgba => "RGBA",
            PixelFormat::Bgr24 => "BGR",
            PixelFormat::Bgra => "BGRA",
            PixelFormat::Gray8 => "GRAY8",
            PixelFormat::Gray16Le => "GRAY16_LE",
        }
    }

    /// Look up a format by its caps-string name.
    ///
    /// Returns `Error::UnsupportedFormat` for names outside the table:
    /// channel and sample-type derivation has no safe default.
    pub fn from_caps_name(name: &str) -> Result<Self> {
        match name {
            "RGB" => Ok(PixelFormat::Rgb24),
            "RGBA" => Ok(PixelFormat::Rgba),
            "BGR" => Ok(PixelFormat::Bgr24),
            "BGRA" => Ok(PixelFormat::Bgra),
            "GRAY8" => Ok(PixelFormat::Gray8),
            "GRAY16_LE" => Ok(PixelFormat::Gray16Le),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

// ============================================================================
// Framerate
// ============================================================================

/// Frame rate as numerator/denominator (8 bytes, Copy).
///
/// Using a fraction allows exact representation of common framerates
/// like 29.97 fps (30000/1001) and 23.976 fps (24000/1001).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Framerate {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (time units).
    pub den: u32,
}

impl Framerate {
    /// Create a new framerate.
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// 25 fps (PAL).
    pub const FPS_25: Self = Self::new(25, 1);
    /// 30 fps.
    pub const FPS_30: Self = Self::new(30, 1);
    /// 60 fps.
    pub const FPS_60: Self = Self::new(60, 1);
    /// 29.97 fps (NTSC).
    pub const FPS_29_97: Self = Self::new(30000, 1001);

    /// Get the framerate as a floating-point value.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.num as f64 / self.den.max(1) as f64
    }

    /// Get the frame duration in nanoseconds, rounded to nearest.
    #[inline]
    pub const fn frame_duration_ns(&self) -> u64 {
        if self.num == 0 {
            return 0;
        }
        let num = self.num as u64;
        ((self.den as u64).saturating_mul(1_000_000_000) + num / 2) / num
    }

    /// Parse from `"N/D"` or a bare `"N"` (denominator 1).
    fn parse(s: &str) -> Option<Self> {
        let (num, den) = match s.split_once('/') {
            Some((n, d)) => (n.trim().parse().ok()?, d.trim().parse().ok()?),
            None => (s.trim().parse().ok()?, 1),
        };
        if num == 0 || den == 0 {
            return None;
        }
        Some(Self::new(num, den))
    }
}

impl Default for Framerate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

// ============================================================================
// VideoCaps
// ============================================================================

/// Negotiated stream parameters (24 bytes, Copy).
///
/// Constructed once at startup from a caps string or defaults, immutable
/// thereafter. Invariants: width > 0, height > 0, framerate numerator and
/// denominator > 0.
///
/// # Example
///
/// ```rust
/// use synthsrc::caps::VideoCaps;
///
/// let caps: VideoCaps = "video/x-raw,format=RGB,width=320,height=240,framerate=25/1"
///     .parse()
///     .unwrap();
/// assert_eq!(caps.width, 320);
/// assert_eq!(caps.channels(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VideoCaps {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format (determines channels and sample type).
    pub format: PixelFormat,
    /// Frame rate.
    pub framerate: Framerate,
}

impl Default for VideoCaps {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            format: PixelFormat::Rgb24,
            framerate: Framerate::FPS_30,
        }
    }
}

impl VideoCaps {
    /// Create new caps.
    pub const fn new(width: u32, height: u32, format: PixelFormat, framerate: Framerate) -> Self {
        Self {
            width,
            height,
            format,
            framerate,
        }
    }

    /// Number of channels, derived from the pixel format.
    #[inline]
    pub const fn channels(&self) -> u32 {
        self.format.channels()
    }

    /// Per-sample storage type, derived from the pixel format.
    #[inline]
    pub const fn sample_type(&self) -> SampleType {
        self.format.sample_type()
    }

    /// Number of samples in one frame (`width * height * channels`).
    ///
    /// Fails with [`Error::FrameOverflow`] if the product is not
    /// representable.
    pub fn samples_per_frame(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(self.channels() as usize))
            .ok_or(Error::FrameOverflow {
                width: self.width,
                height: self.height,
                bytes_per_pixel: self.format.bytes_per_pixel(),
            })
    }

    /// Frame size in bytes (`width * height * channels * sample_size`).
    ///
    /// Fails with [`Error::FrameOverflow`] if the product is not
    /// representable.
    pub fn frame_size(&self) -> Result<usize> {
        self.samples_per_frame()?
            .checked_mul(self.sample_type().size())
            .ok_or(Error::FrameOverflow {
                width: self.width,
                height: self.height,
                bytes_per_pixel: self.format.bytes_per_pixel(),
            })
    }

    /// Parse a standalone caps string against the given defaults.
    ///
    /// The string is comma-separated `key=value` pairs; segments without
    /// `=` (like the `video/x-raw` media type) and unknown keys are
    /// ignored. Absent keys fall back to `defaults`; a value that does not
    /// parse (or violates an invariant, like a zero dimension) falls back
    /// the same way.
    ///
    /// Fails with [`Error::MalformedCaps`] if there are no `key=value`
    /// pairs at all, and [`Error::UnsupportedFormat`] for a `format` value
    /// outside the known table.
    pub fn parse_caps(s: &str, defaults: &VideoCaps) -> Result<Self> {
        let mut caps = *defaults;
        let mut seen_any = false;

        for pair in s.split(',') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            seen_any = true;
            let (key, value) = (key.trim(), value.trim());
            match key {
                "format" => caps.format = PixelFormat::from_caps_name(value)?,
                "width" => {
                    if let Some(w) = parse_dimension(value) {
                        caps.width = w;
                    } else {
                        tracing::debug!(key, value, "ignoring unparseable caps value");
                    }
                }
                "height" => {
                    if let Some(h) = parse_dimension(value) {
                        caps.height = h;
                    } else {
                        tracing::debug!(key, value, "ignoring unparseable caps value");
                    }
                }
                "framerate" => {
                    if let Some(rate) = Framerate::parse(value) {
                        caps.framerate = rate;
                    } else {
                        tracing::debug!(key, value, "ignoring unparseable caps value");
                    }
                }
                _ => {}
            }
        }

        if !seen_any {
            return Err(Error::MalformedCaps);
        }
        Ok(caps)
    }

    /// Extract caps from a pipeline description.
    ///
    /// Only the first element's `caps` property is considered, mirroring
    /// how the source element at the head of the chain is configured:
    ///
    /// ```text
    /// appsrc caps=video/x-raw,format=RGB,width=640,height=480 ! queue ! videoconvert ! autovideosink
    /// ```
    ///
    /// Fails softly: a description with no parseable caps yields the
    /// defaults rather than an error. An unsupported `format` value is
    /// still a hard error, since frame synthesis cannot proceed without a
    /// channel/sample derivation.
    pub fn from_pipeline(description: &str, defaults: &VideoCaps) -> Result<Self> {
        let caps_value = parse_pipeline(description).ok().and_then(|pipeline| {
            pipeline
                .elements
                .into_iter()
                .next()?
                .properties
                .into_iter()
                .find(|(key, _)| key == "caps")
                .map(|(_, value)| value.as_string())
        });

        let Some(caps_str) = caps_value else {
            tracing::debug!("no caps found in pipeline description, using defaults");
            return Ok(*defaults);
        };

        match Self::parse_caps(&caps_str, defaults) {
            Err(Error::MalformedCaps) => {
                tracing::debug!(caps = %caps_str, "malformed caps, using defaults");
                Ok(*defaults)
            }
            other => other,
        }
    }
}

/// Parse a strictly positive pixel dimension.
fn parse_dimension(s: &str) -> Option<u32> {
    s.parse().ok().filter(|&v| v > 0)
}

impl std::str::FromStr for VideoCaps {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_caps(s, &VideoCaps::default())
    }
}

impl std::fmt::Display for VideoCaps {
    /// Canonical caps serialization; parsing it back yields an equal value.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "video/x-raw,format={},width={},height={},framerate={}",
            self.format.caps_name(),
            self.width,
            self.height,
            self.framerate
        )
    }
}
