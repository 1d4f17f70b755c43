//! Temporal smoothing
//!
//! Live weights approach their targets exponentially:
//! `next = current + (target - current) * f`.
//!
//! With a fixed per-frame `f` the approach speed depends on the frame rate.
//! [`SmoothingMode::TimeNormalized`] instead treats `f` as the per-frame
//! factor at `reference_fps` and derives the factor for the actual frame
//! delta, `1 - (1 - f)^(dt * reference_fps)`, so a 30 fps and a 144 fps
//! display converge in the same wall-clock time.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use visage_core::{clamp_frame_delta, VisageError, VisageResult};

/// How the smoothing factor relates to frame time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SmoothingMode {
    /// Same factor every frame, whatever the frame delta
    FrameLocked,
    /// Factor derived from the frame delta
    #[default]
    TimeNormalized,
}

/// Smoothing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SmoothingConfig {
    /// Per-frame interpolation factor in (0, 1]
    pub factor: f32,

    /// Frame rate at which `factor` applies verbatim
    pub reference_fps: f32,

    /// Frame-locked or time-normalized
    pub mode: SmoothingMode,

    /// Longest frame delta honored, in milliseconds
    pub max_frame_delta_ms: u64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self::responsive()
    }
}

impl SmoothingConfig {
    /// Fast mouth, for speech
    pub fn responsive() -> Self {
        Self {
            factor: 0.32,
            reference_fps: 60.0,
            mode: SmoothingMode::TimeNormalized,
            max_frame_delta_ms: 100,
        }
    }

    /// Slow, soft transitions
    pub fn relaxed() -> Self {
        Self {
            factor: 0.12,
            ..Self::responsive()
        }
    }

    /// Fixed factor per frame
    pub fn frame_locked(factor: f32) -> Self {
        Self {
            factor,
            mode: SmoothingMode::FrameLocked,
            ..Self::responsive()
        }
    }

    pub fn validate(&self) -> VisageResult<()> {
        if !(self.factor > 0.0 && self.factor <= 1.0) {
            return Err(VisageError::InvalidSmoothingFactor(self.factor));
        }
        if !(self.reference_fps.is_finite() && self.reference_fps > 0.0) {
            return Err(VisageError::InvalidFrameRate(self.reference_fps));
        }
        if self.max_frame_delta_ms == 0 {
            return Err(VisageError::InvalidConfig(
                "maxFrameDeltaMs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }

    /// Interpolation factor for a frame that took `dt`
    pub fn factor_for(&self, dt: Duration) -> f32 {
        let f = self.factor.clamp(0.0, 1.0);
        match self.mode {
            SmoothingMode::FrameLocked => f,
            SmoothingMode::TimeNormalized => {
                let dt = clamp_frame_delta(dt, self.max_frame_delta());
                let frames = dt.as_secs_f32() * self.reference_fps;
                if frames <= 0.0 {
                    return 0.0;
                }
                1.0 - (1.0 - f).powf(frames)
            }
        }
    }
}

/// Step `current` toward `target`. `t` is clamped to [0, 1], so the result
/// never overshoots.
#[inline]
pub fn approach(current: f32, target: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    current + (target - current) * t
}

/// Frames a frame-locked smoother needs to get within `epsilon` of a constant
/// target, starting a unit distance away.
pub fn frames_to_converge(factor: f32, epsilon: f32) -> u32 {
    if factor >= 1.0 {
        return 1;
    }
    if factor <= 0.0 || epsilon <= 0.0 {
        return u32::MAX;
    }
    if epsilon >= 1.0 {
        return 0;
    }
    let n = (epsilon.ln() / (1.0 - factor).ln()).ceil();
    n as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_presets_validate() {
        assert!(SmoothingConfig::responsive().validate().is_ok());
        assert!(SmoothingConfig::relaxed().validate().is_ok());
        assert_eq!(SmoothingConfig::relaxed().factor, 0.12);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = SmoothingConfig::responsive();
        cfg.factor = 0.0;
        assert!(matches!(cfg.validate(), Err(VisageError::InvalidSmoothingFactor(_))));
        cfg.factor = 1.5;
        assert!(cfg.validate().is_err());
        cfg.factor = f32::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = SmoothingConfig::responsive();
        cfg.reference_fps = 0.0;
        assert!(matches!(cfg.validate(), Err(VisageError::InvalidFrameRate(_))));
    }

    #[test]
    fn test_frame_locked_ignores_dt() {
        let cfg = SmoothingConfig::frame_locked(0.32);
        assert_eq!(cfg.factor_for(Duration::from_millis(1)), 0.32);
        assert_eq!(cfg.factor_for(Duration::from_secs(2)), 0.32);
    }

    #[test]
    fn test_time_normalized_matches_at_reference_rate() {
        let cfg = SmoothingConfig::responsive();
        let f = cfg.factor_for(Duration::from_secs_f32(1.0 / 60.0));
        assert!((f - 0.32).abs() < 1e-4);
    }

    #[test]
    fn test_time_normalized_composes() {
        // two 120 fps frames move as far as one 60 fps frame
        let cfg = SmoothingConfig::responsive();
        let half = cfg.factor_for(Duration::from_secs_f64(1.0 / 120.0));
        let one = cfg.factor_for(Duration::from_secs_f64(1.0 / 60.0));
        let mut v = 0.0;
        v = approach(v, 1.0, half);
        v = approach(v, 1.0, half);
        assert!((v - one).abs() < 1e-4);
    }

    #[test]
    fn test_stalled_frame_is_clamped() {
        let cfg = SmoothingConfig::relaxed();
        let long = cfg.factor_for(Duration::from_secs(5));
        let max = cfg.factor_for(cfg.max_frame_delta());
        assert_eq!(long, max);
        assert!(long < 1.0);
        assert_eq!(cfg.factor_for(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_frames_to_converge() {
        assert_eq!(frames_to_converge(0.5, 0.01), 7);
        assert_eq!(frames_to_converge(1.0, 0.01), 1);
        assert_eq!(frames_to_converge(0.32, 1.0), 0);
    }

    proptest! {
        #[test]
        fn prop_approach_never_overshoots(c in 0.0f32..=1.0, t in 0.0f32..=1.0, f in 0.0f32..=1.0) {
            let next = approach(c, t, f);
            let (lo, hi) = if c <= t { (c, t) } else { (t, c) };
            prop_assert!(next >= lo - 1e-6 && next <= hi + 1e-6);
        }

        #[test]
        fn prop_normalized_factor_in_unit_range(ms in 0u64..1000, factor in 0.01f32..=1.0) {
            let cfg = SmoothingConfig { factor, ..SmoothingConfig::responsive() };
            let f = cfg.factor_for(Duration::from_millis(ms));
            prop_assert!((0.0..=1.0).contains(&f));
        }
    }
}
