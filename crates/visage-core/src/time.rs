//! Time primitives for Visage
//!
//! Two notions of time meet in the avatar:
//! - Playback time: position inside the current audio clip, reported by the
//!   audio clock. Negative while the clip is scheduled but not yet audible.
//! - Frame time: wall-clock delta between two render frames, used to
//!   normalize smoothing.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Playback position, microseconds relative to clip start
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlaybackTime(pub i64);

impl PlaybackTime {
    pub const ZERO: PlaybackTime = PlaybackTime(0);

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        PlaybackTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        PlaybackTime(millis * 1000)
    }

    /// From fractional milliseconds, as audio clocks report them
    #[inline]
    pub fn from_millis_f64(millis: f64) -> Self {
        if millis.is_finite() {
            PlaybackTime((millis * 1000.0) as i64)
        } else if millis > 0.0 {
            PlaybackTime(i64::MAX)
        } else {
            PlaybackTime(i64::MIN)
        }
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Has the clip become audible?
    #[inline]
    pub fn has_started(self) -> bool {
        self.0 >= 0
    }
}

impl Add<Duration> for PlaybackTime {
    type Output = PlaybackTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        PlaybackTime(self.0.saturating_add(rhs.as_micros() as i64))
    }
}

impl Sub<PlaybackTime> for PlaybackTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: PlaybackTime) -> Self::Output {
        let diff = self.0.saturating_sub(rhs.0);
        if diff >= 0 {
            Duration::from_micros(diff as u64)
        } else {
            Duration::ZERO
        }
    }
}

impl std::fmt::Debug for PlaybackTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "τa({:.3}ms)", self.as_millis_f64())
    }
}

/// Clamp a frame delta so a stalled frame (tab in background, debugger
/// pause) cannot produce a single huge smoothing step.
#[inline]
pub fn clamp_frame_delta(dt: Duration, max: Duration) -> Duration {
    dt.min(max)
}
