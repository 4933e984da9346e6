//! Timestamp types and the pacing clock.
//!
//! This module provides:
//! - [`ClockTime`]: A nanosecond timestamp type (8 bytes, Copy)
//! - [`PacingClock`]: Logical presentation-timestamp pacing for a source
//!
//! Pacing here is purely logical: the clock advances by one frame duration
//! per request and never consults wall time. Throughput is governed entirely
//! by the downstream consumption signals, not by a timer.

use crate::caps::Framerate;
use std::time::Duration;

// ============================================================================
// ClockTime
// ============================================================================

/// Time in nanoseconds (8 bytes, Copy).
///
/// Represents time as nanoseconds since stream start.
///
/// # Examples
///
/// ```rust
/// use synthsrc::clock::ClockTime;
///
/// let t1 = ClockTime::from_secs(1);
/// let t2 = ClockTime::from_millis(500);
/// let t3 = t1 + t2;
///
/// assert_eq!(t3.millis(), 1500);
/// assert_eq!(format!("{}", t3), "1.500s");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ClockTime(u64);

impl ClockTime {
    /// Zero time.
    pub const ZERO: Self = Self(0);

    /// Maximum representable time.
    pub const MAX: Self = Self(u64::MAX);

    /// Create from nanoseconds.
    #[inline]
    pub const fn from_nanos(ns: u64) -> Self {
        Self(ns)
    }

    /// Create from milliseconds.
    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms.saturating_mul(1_000_000))
    }

    /// Create from seconds.
    #[inline]
    pub const fn from_secs(s: u64) -> Self {
        Self(s.saturating_mul(1_000_000_000))
    }

    /// Get as nanoseconds.
    #[inline]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Get as milliseconds (truncated).
    #[inline]
    pub const fn millis(self) -> u64 {
        self.0 / 1_000_000
    }

    /// Get as seconds (truncated).
    #[inline]
    pub const fn secs(self) -> u64 {
        self.0 / 1_000_000_000
    }

    /// Saturating addition.
    #[inline]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Checked addition.
    #[inline]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl std::ops::Add for ClockTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl std::ops::AddAssign for ClockTime {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(rhs);
    }
}

impl std::ops::Sub for ClockTime {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl From<Duration> for ClockTime {
    #[inline]
    fn from(d: Duration) -> Self {
        Self(d.as_nanos() as u64)
    }
}

impl From<ClockTime> for Duration {
    #[inline]
    fn from(t: ClockTime) -> Self {
        Duration::from_nanos(t.0)
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secs = self.secs();
        let ms = (self.0 / 1_000_000) % 1000;
        write!(f, "{}.{:03}s", secs, ms)
    }
}

// ============================================================================
// PacingClock
// ============================================================================

/// Logical presentation-timestamp pacing for a frame source.
///
/// Each [`advance`](PacingClock::advance) call moves the running position
/// forward by one frame duration and returns the new position together with
/// that duration. The position advances *before* stamping, so the first
/// emitted frame carries `pts == frame_duration`, not zero, and consecutive
/// timestamps are `d, 2d, 3d, ...` with no drift.
///
/// The frame duration is computed once from the frame rate as
/// `round(1e9 * den / num)` nanoseconds and never changes for the lifetime
/// of the clock.
#[derive(Debug, Clone)]
pub struct PacingClock {
    position: ClockTime,
    frame_duration: ClockTime,
}

impl PacingClock {
    /// Create a pacing clock for the given frame rate.
    pub fn new(framerate: Framerate) -> Self {
        Self {
            position: ClockTime::ZERO,
            frame_duration: ClockTime::from_nanos(framerate.frame_duration_ns()),
        }
    }

    /// Get the per-frame duration.
    #[inline]
    pub fn frame_duration(&self) -> ClockTime {
        self.frame_duration
    }

    /// Get the current stream position (pts of the last stamped frame).
    #[inline]
    pub fn position(&self) -> ClockTime {
        self.position
    }

    /// Advance by one frame and return `(pts, duration)` for stamping.
    pub fn advance(&mut self) -> (ClockTime, ClockTime) {
        self.position += self.frame_duration;
        (self.position, self.frame_duration)
    }
}
