//! Pose resolution
//!
//! `viseme + intensity -> ResolvedPose`. Layers compose in a fixed order:
//! rest-state baseline, then the viseme's table entry, then tuning
//! overrides. Silence skips the baseline. Every value is scaled by the
//! clamped intensity.

use tracing::trace;
use visage_core::{BrowPose, Pose, PoseKey, Viseme};

use crate::{normalize, OverrideTable, PoseTable, SharedOverrides, VisemeEntry};

/// Output of one resolution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedPose {
    pub viseme: Viseme,
    /// Clamped intensity the weights were scaled by
    pub intensity: f32,
    /// Blendshape targets
    pub weights: Pose,
    /// Brow scalars, scaled like the weights
    pub brows: BrowPose,
}

/// Clamp an intensity to [0, 1]. NaN reads as zero.
#[inline]
pub fn clamp_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    }
}

/// Resolves visemes against a pose table and a shared override table
#[derive(Debug, Clone)]
pub struct PoseResolver {
    table: PoseTable,
    overrides: SharedOverrides,
}

impl PoseResolver {
    /// Canonical table, fresh override table
    pub fn new() -> Self {
        Self::with_table(PoseTable::canonical())
    }

    pub fn with_table(table: PoseTable) -> Self {
        Self::with_overrides(table, OverrideTable::shared())
    }

    pub fn with_overrides(table: PoseTable, overrides: SharedOverrides) -> Self {
        PoseResolver { table, overrides }
    }

    pub fn table(&self) -> &PoseTable {
        &self.table
    }

    /// Shared handle to the override table
    pub fn overrides(&self) -> &SharedOverrides {
        &self.overrides
    }

    /// Layered entry before intensity scaling
    pub fn layered_entry(&self, viseme: Viseme) -> VisemeEntry {
        let mut layered = if viseme.is_silence() {
            self.table.entry(viseme).clone()
        } else {
            let mut base = self.table.rest().clone();
            base.overlay(self.table.entry(viseme));
            base
        };

        if let Some(over) = self.overrides.read().entry(viseme) {
            layered.overlay(over);
        }

        layered
    }

    /// Resolve a canonical viseme at `intensity`
    pub fn resolve(&self, viseme: Viseme, intensity: f32) -> ResolvedPose {
        let amount = clamp_intensity(intensity);
        let layered = self.layered_entry(viseme);

        let mut weights = Pose::new();
        let mut brows = BrowPose::neutral();
        for (_, key, value) in layered.iter() {
            let scaled = value * amount;
            match key {
                PoseKey::Param(param) => weights.set(param, scaled),
                PoseKey::EyebrowRaise => brows.raise = scaled,
                PoseKey::EyebrowTilt => brows.tilt = scaled,
            }
        }

        trace!(viseme = %viseme, intensity = amount, keys = weights.len(), "resolved pose");

        ResolvedPose {
            viseme,
            intensity: amount,
            weights,
            brows,
        }
    }

    /// Normalize a raw label, then resolve it
    pub fn resolve_label(&self, label: &str, intensity: f32) -> ResolvedPose {
        self.resolve(normalize(label), intensity)
    }
}

impl Default for PoseResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use visage_core::{FacialParam, ParamGroup};

    #[test]
    fn test_pp_is_bilabial_closure() {
        let resolver = PoseResolver::new();
        let pose = resolver.resolve_label("viseme_PP", 1.0);
        assert_eq!(pose.viseme, Viseme::PP);
        assert_eq!(pose.weights.get(FacialParam::MouthClose), 1.0);
        assert_eq!(pose.weights.get(FacialParam::JawOpen), 0.0);
        assert!((pose.brows.raise - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_non_silent_visemes_carry_the_baseline() {
        let resolver = PoseResolver::new();
        let pose = resolver.resolve(Viseme::AA, 1.0);
        assert_eq!(pose.weights.get(FacialParam::JawOpen), 0.95);
        // untouched by the aa entry, inherited from rest
        assert_eq!(pose.weights.get(FacialParam::MouthRollLower), 0.35175);
        assert_eq!(pose.weights.get(FacialParam::BrowInnerUp), 0.12167);
    }

    #[test]
    fn test_silence_skips_the_baseline() {
        let resolver = PoseResolver::new();
        let pose = resolver.resolve(Viseme::Sil, 1.0);
        assert!(pose.weights.is_zero());
        assert_eq!(pose.brows, BrowPose::neutral());
    }

    #[test]
    fn test_silence_with_override() {
        let resolver = PoseResolver::new();
        resolver.overrides().write().set(
            Viseme::Sil,
            ParamGroup::Mouth,
            FacialParam::MouthClose.into(),
            0.2,
        );
        let pose = resolver.resolve(Viseme::Sil, 1.0);
        assert_eq!(pose.weights.get(FacialParam::MouthClose), 0.2);
        assert_eq!(pose.weights.get(FacialParam::JawOpen), 0.0);
    }

    #[test]
    fn test_override_priority() {
        let resolver = PoseResolver::new();
        resolver.overrides().write().set(
            Viseme::AA,
            ParamGroup::Mouth,
            FacialParam::JawOpen.into(),
            0.3,
        );
        assert_eq!(resolver.resolve(Viseme::AA, 1.0).weights.get(FacialParam::JawOpen), 0.3);

        resolver.overrides().write().clear_viseme(Viseme::AA);
        assert_eq!(resolver.resolve(Viseme::AA, 1.0).weights.get(FacialParam::JawOpen), 0.95);
    }

    #[test]
    fn test_brow_override() {
        let resolver = PoseResolver::new();
        resolver
            .overrides()
            .write()
            .set(Viseme::O, ParamGroup::Brows, PoseKey::EyebrowTilt, -0.2);
        let pose = resolver.resolve(Viseme::O, 0.5);
        assert!((pose.brows.tilt + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_intensity_is_clamped() {
        let resolver = PoseResolver::new();
        let loud = resolver.resolve(Viseme::O, 7.0);
        let full = resolver.resolve(Viseme::O, 1.0);
        assert_eq!(loud.weights, full.weights);
        assert_eq!(loud.intensity, 1.0);
        assert!(resolver.resolve(Viseme::O, -1.0).weights.is_zero());
        assert!(resolver.resolve(Viseme::O, f32::NAN).weights.is_zero());
    }

    proptest! {
        #[test]
        fn prop_zero_intensity_is_all_zero(idx in 0usize..15) {
            let pose = PoseResolver::new().resolve(Viseme::ALL[idx], 0.0);
            prop_assert!(pose.weights.is_zero());
            prop_assert_eq!(pose.brows.raise, 0.0);
        }

        #[test]
        fn prop_intensity_is_monotonic(idx in 0usize..15, a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let resolver = PoseResolver::new();
            let v = Viseme::ALL[idx];
            let low = resolver.resolve(v, lo);
            let high = resolver.resolve(v, hi);
            for (param, w) in high.weights.iter() {
                prop_assert!(w >= low.weights.get(param));
            }
        }

        #[test]
        fn prop_resolution_is_deterministic(idx in 0usize..15, i in 0.0f32..=1.0) {
            let resolver = PoseResolver::new();
            let v = Viseme::ALL[idx];
            prop_assert_eq!(resolver.resolve(v, i), resolver.resolve(v, i));
        }
    }
}
