//! Avatar driver
//!
//! Owns all per-avatar animation state. Several drivers can live in one
//! process; they share nothing unless given the same override table.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, trace};
use visage_core::{BrowPose, ParamGroup, Pose, PoseKey, VisageResult, Viseme};
use visage_rig::{
    adapt_blendshapes, apply_constraints, drive_mesh, BindingCache, BrowRig, CorrectedPose,
    MorphTargetMesh,
};
use visage_time::VisemeSink;
use visage_viseme::{clamp_intensity, normalize, PoseResolver, ResolvedPose, SharedOverrides};

use crate::DriverConfig;

/// What one tick touched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Meshes whose weights were written
    pub meshes_driven: usize,
    /// Meshes without morph targets
    pub meshes_skipped: usize,
    /// Individual weights written
    pub weights_written: usize,
    /// Interpolation factor used this frame
    pub factor: f32,
}

/// Cumulative driver counters
#[derive(Debug, Clone, Default)]
pub struct DriverStats {
    pub ticks: u64,
    pub viseme_changes: u64,
    pub blendshape_updates: u64,
    pub weights_written: u64,
    pub last_tick_duration: Duration,
}

/// Per-avatar driver
#[derive(Debug)]
pub struct AvatarDriver {
    config: DriverConfig,
    resolver: PoseResolver,
    /// Viseme set through the driver API; `None` after a clear
    external_viseme: Option<Viseme>,
    /// Most recent resolution (the pending mouth pose)
    resolved: ResolvedPose,
    /// Most recent adapted blendshape input
    pending_blendshapes: Option<Pose>,
    /// Smoothed brow scalars
    brows: BrowPose,
    bindings: BindingCache,
    stats: DriverStats,
}

impl AvatarDriver {
    /// Driver with default configuration and the canonical pose table
    pub fn new() -> Self {
        Self::build(DriverConfig::default(), PoseResolver::new())
    }

    pub fn with_config(config: DriverConfig) -> VisageResult<Self> {
        Self::with_resolver(config, PoseResolver::new())
    }

    /// Driver over a custom table or a shared override table
    pub fn with_resolver(config: DriverConfig, resolver: PoseResolver) -> VisageResult<Self> {
        config.validate()?;
        Ok(Self::build(config, resolver))
    }

    fn build(config: DriverConfig, resolver: PoseResolver) -> Self {
        let resolved = resolver.resolve(Viseme::Sil, 1.0);
        Self {
            config,
            resolver,
            external_viseme: None,
            resolved,
            pending_blendshapes: None,
            brows: BrowPose::neutral(),
            bindings: BindingCache::new(),
            stats: DriverStats::default(),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }

    pub fn resolver(&self) -> &PoseResolver {
        &self.resolver
    }

    /// Normalize, resolve and install a viseme pose
    pub fn set_viseme(&mut self, label: &str, amount: f32) -> Viseme {
        let viseme = normalize(label);
        let amount = clamp_intensity(amount);
        if self.external_viseme != Some(viseme) {
            debug!(label, viseme = %viseme, amount, "viseme changed");
            self.stats.viseme_changes += 1;
        }
        self.external_viseme = Some(viseme);
        self.resolved = self.resolver.resolve(viseme, amount);
        viseme
    }

    /// Resolve toward silence at full intensity. Live weights keep their
    /// values and converge over the following ticks.
    pub fn clear_viseme(&mut self) {
        if self.external_viseme.is_some() {
            debug!("viseme cleared");
        }
        self.external_viseme = None;
        self.resolved = self.resolver.resolve(Viseme::Sil, 1.0);
    }

    /// Install or replace the blendshape override. A missing or non-object
    /// input removes it.
    pub fn set_blendshapes(&mut self, blendshapes: Option<&Value>, amount: f32) {
        self.pending_blendshapes =
            adapt_blendshapes(blendshapes, amount, &self.config.blendshapes);
        self.stats.blendshape_updates += 1;
        trace!(
            keys = self.pending_blendshapes.as_ref().map(Pose::len),
            "blendshapes updated"
        );
    }

    pub fn clear_blendshapes(&mut self) {
        self.pending_blendshapes = None;
    }

    /// Viseme set through the driver API, `None` when cleared
    pub fn current_viseme(&self) -> Option<Viseme> {
        self.external_viseme
    }

    /// Intensity of the pending viseme pose
    pub fn intensity(&self) -> f32 {
        self.resolved.intensity
    }

    /// Pending viseme-driven pose
    pub fn pending_mouth_pose(&self) -> &Pose {
        &self.resolved.weights
    }

    /// Pending blendshape pose, `None` when no override is active
    pub fn pending_blendshape_pose(&self) -> Option<&Pose> {
        self.pending_blendshapes.as_ref()
    }

    /// Brow scalars the smoother is heading toward, clamped to [-1, 1]
    pub fn target_brows(&self) -> BrowPose {
        let b = self.resolved.brows;
        BrowPose::new(b.raise.clamp(-1.0, 1.0), b.tilt.clamp(-1.0, 1.0))
    }

    /// Smoothed brow scalars
    pub fn brows(&self) -> BrowPose {
        self.brows
    }

    /// Push the smoothed brows to a rig
    pub fn apply_brows<R: BrowRig + ?Sized>(&self, rig: &mut R) {
        rig.set_brows(self.brows);
    }

    /// This frame's merged and corrected target pose. Blendshape keys win.
    pub fn target_pose(&self) -> CorrectedPose {
        let merged = match &self.pending_blendshapes {
            Some(blend) => self.resolved.weights.merged(blend),
            None => self.resolved.weights.clone(),
        };
        apply_constraints(merged)
    }

    /// Shared override table handle, for a tuner
    pub fn overrides(&self) -> &SharedOverrides {
        self.resolver.overrides()
    }

    /// Edit an override and re-resolve the pending pose
    pub fn set_override(
        &mut self,
        viseme: Viseme,
        group: ParamGroup,
        key: PoseKey,
        value: f32,
    ) -> bool {
        let accepted = self.resolver.overrides().write().set(viseme, group, key, value);
        if accepted {
            debug!(viseme = %viseme, key = %key, value, "override set");
            self.refresh();
        }
        accepted
    }

    /// Drop every override for `viseme` and re-resolve
    pub fn clear_overrides(&mut self, viseme: Viseme) {
        self.resolver.overrides().write().clear_viseme(viseme);
        self.refresh();
    }

    /// Re-resolve the pending pose against the current tables
    pub fn refresh(&mut self) {
        let viseme = self.resolved.viseme;
        let amount = self.resolved.intensity;
        self.resolved = self.resolver.resolve(viseme, amount);
    }

    /// Advance one frame. `dt` is the time since the previous frame.
    pub fn tick<'m, M, I>(&mut self, dt: Duration, meshes: I) -> TickReport
    where
        M: MorphTargetMesh + ?Sized + 'm,
        I: IntoIterator<Item = &'m mut M>,
    {
        let started = Instant::now();
        let targets = self.target_pose();
        let factor = self.config.smoothing.factor_for(dt);

        let mut report = TickReport {
            factor,
            ..TickReport::default()
        };
        for mesh in meshes {
            match drive_mesh(mesh, &targets, factor, &mut self.bindings) {
                Some(written) => {
                    report.meshes_driven += 1;
                    report.weights_written += written;
                }
                None => report.meshes_skipped += 1,
            }
        }

        self.brows = self.brows.lerp(&self.target_brows(), factor);

        self.stats.ticks += 1;
        self.stats.weights_written += report.weights_written as u64;
        self.stats.last_tick_duration = started.elapsed();
        trace!(
            meshes = report.meshes_driven,
            skipped = report.meshes_skipped,
            weights = report.weights_written,
            factor,
            "tick"
        );
        report
    }
}

impl Default for AvatarDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl VisemeSink for AvatarDriver {
    fn set_viseme(&mut self, label: &str, amount: f32) {
        AvatarDriver::set_viseme(self, label, amount);
    }

    fn clear_viseme(&mut self) {
        AvatarDriver::clear_viseme(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use visage_core::FacialParam;
    use visage_rig::{MorphMesh, SmoothingConfig};

    const FRAME: Duration = Duration::from_millis(16);

    fn locked(factor: f32) -> AvatarDriver {
        let config = DriverConfig {
            smoothing: SmoothingConfig::frame_locked(factor),
            ..DriverConfig::default()
        };
        AvatarDriver::with_config(config).unwrap()
    }

    #[test]
    fn test_starts_silent() {
        let driver = AvatarDriver::new();
        assert_eq!(driver.current_viseme(), None);
        assert!(driver.pending_mouth_pose().is_zero());
        assert!(driver.pending_blendshape_pose().is_none());
    }

    #[test]
    fn test_set_viseme_resolves_immediately() {
        let mut driver = AvatarDriver::new();
        assert_eq!(driver.set_viseme("viseme_PP", 1.0), Viseme::PP);
        assert_eq!(driver.pending_mouth_pose().get(FacialParam::MouthClose), 1.0);
        assert_eq!(driver.pending_mouth_pose().get(FacialParam::JawOpen), 0.0);
        assert_eq!(driver.current_viseme(), Some(Viseme::PP));

        driver.set_viseme("garbage", 3.0);
        assert_eq!(driver.current_viseme(), Some(Viseme::Sil));
        assert_eq!(driver.intensity(), 1.0);
    }

    #[test]
    fn test_blendshapes_take_precedence() {
        let mut driver = AvatarDriver::new();
        driver.set_viseme("E", 1.0);
        assert_eq!(driver.pending_mouth_pose().get(FacialParam::JawOpen), 0.2);

        driver.set_blendshapes(Some(&json!({ "jawOpen": 0.9 })), 1.0);
        assert_eq!(driver.target_pose().get(FacialParam::JawOpen), 0.9);

        driver.set_blendshapes(Some(&json!("nope")), 1.0);
        assert!(driver.pending_blendshape_pose().is_none());
        assert_eq!(driver.target_pose().get(FacialParam::JawOpen), 0.2);
    }

    #[test]
    fn test_clear_keeps_blendshapes() {
        let mut driver = AvatarDriver::new();
        driver.set_blendshapes(Some(&json!({ "tongueOut": 0.5 })), 1.0);
        driver.clear_viseme();
        assert!(driver.pending_blendshape_pose().is_some());
        driver.clear_blendshapes();
        assert!(driver.pending_blendshape_pose().is_none());
    }

    #[test]
    fn test_tick_drives_every_mesh() {
        let mut driver = locked(0.5);
        driver.set_viseme("aa", 1.0);

        let mut face = MorphMesh::new("face", ["jawOpen", "mouthClose"]);
        let mut teeth = MorphMesh::new("teeth", ["Jaw_Open"]);
        let mut hair = MorphMesh::without_targets("hair");

        let report = driver.tick(FRAME, [&mut face, &mut teeth, &mut hair]);
        assert_eq!(report.meshes_driven, 2);
        assert_eq!(report.meshes_skipped, 1);
        assert_eq!(report.weights_written, 3);

        let jaw = face.influence("jawOpen").unwrap();
        assert!((jaw - 0.475).abs() < 1e-6);
        assert_eq!(teeth.influence("Jaw_Open"), Some(jaw));
    }

    #[test]
    fn test_tick_accepts_trait_objects() {
        let mut driver = locked(1.0);
        driver.set_viseme("O", 1.0);
        let mut face = MorphMesh::new("face", ["mouthPucker"]);
        let mut body = MorphMesh::without_targets("body");
        let meshes: [&mut dyn MorphTargetMesh; 2] = [&mut face, &mut body];
        let report = driver.tick(FRAME, meshes);
        assert_eq!(report.meshes_skipped, 1);
        assert!(face.influence("mouthPucker").unwrap() > 0.0);
    }

    #[test]
    fn test_clear_converges_gradually() {
        let mut driver = locked(0.32);
        let mut face = MorphMesh::new("face", ["mouthClose"]);
        driver.set_viseme("viseme_PP", 1.0);
        for _ in 0..60 {
            driver.tick(FRAME, [&mut face]);
        }
        let closed = face.influence("mouthClose").unwrap();
        assert!(closed > 0.99);

        driver.clear_viseme();
        driver.tick(FRAME, [&mut face]);
        let after_one = face.influence("mouthClose").unwrap();
        assert!(after_one < closed && after_one > 0.5);
    }

    #[test]
    fn test_brows_smooth_toward_target() {
        let mut driver = locked(0.5);
        driver.set_viseme("I", 1.0);
        driver.tick::<MorphMesh, _>(FRAME, []);
        assert!((driver.brows().raise - 0.05).abs() < 1e-6);

        let mut pair = visage_rig::EyebrowPair::default();
        driver.apply_brows(&mut pair);
        assert!((pair.left().position_y - 0.05 * 0.08).abs() < 1e-6);
    }

    #[test]
    fn test_set_override_reresolves() {
        let mut driver = AvatarDriver::new();
        driver.set_viseme("aa", 1.0);
        assert!(driver.set_override(
            Viseme::AA,
            ParamGroup::Mouth,
            FacialParam::JawOpen.into(),
            0.3
        ));
        assert_eq!(driver.pending_mouth_pose().get(FacialParam::JawOpen), 0.3);

        driver.clear_overrides(Viseme::AA);
        assert_eq!(driver.pending_mouth_pose().get(FacialParam::JawOpen), 0.95);
    }

    #[test]
    fn test_drivers_are_independent() {
        let mut a = AvatarDriver::new();
        let b = AvatarDriver::new();
        a.set_override(Viseme::O, ParamGroup::Mouth, FacialParam::JawOpen.into(), 0.1);
        assert!(b.overrides().read().is_empty());
    }

    #[test]
    fn test_stats() {
        let mut driver = AvatarDriver::new();
        driver.set_viseme("aa", 1.0);
        driver.set_viseme("aa", 0.5);
        driver.set_viseme("O", 1.0);
        let mut face = MorphMesh::new("face", ["jawOpen"]);
        driver.tick(FRAME, [&mut face]);
        assert_eq!(driver.stats().viseme_changes, 2);
        assert_eq!(driver.stats().ticks, 1);
        assert_eq!(driver.stats().weights_written, 1);
    }

    #[derive(Debug, Clone)]
    enum Call {
        Viseme(String, f32),
        Clear,
        Blend(f32, f32),
        Tick(u64),
    }

    fn call() -> impl Strategy<Value = Call> {
        prop_oneof![
            ("(viseme_)?(aa|PP|O|E|kk|sil|xyz)", -1.0f32..2.0).prop_map(|(l, a)| Call::Viseme(l, a)),
            Just(Call::Clear),
            (-1.0f32..2.0, -1.0f32..2.0).prop_map(|(w, a)| Call::Blend(w, a)),
            (0u64..300).prop_map(Call::Tick),
        ]
    }

    proptest! {
        #[test]
        fn prop_weights_stay_in_unit_range(calls in proptest::collection::vec(call(), 1..40)) {
            let mut driver = AvatarDriver::new();
            let mut face = MorphMesh::new("face", ["jawOpen", "mouthClose", "mouthSmile_L", "Brow_Down"]);
            for c in calls {
                match c {
                    Call::Viseme(label, amount) => {
                        driver.set_viseme(&label, amount);
                    }
                    Call::Clear => driver.clear_viseme(),
                    Call::Blend(w, amount) => {
                        driver.set_blendshapes(Some(&json!({ "jawOpen": w, "mouthClose": w })), amount)
                    }
                    Call::Tick(ms) => {
                        driver.tick(Duration::from_millis(ms), [&mut face]);
                    }
                }
                for w in face.influences() {
                    prop_assert!(w.is_finite() && (0.0..=1.0).contains(w));
                }
                let brows = driver.brows();
                prop_assert!((-1.0..=1.0).contains(&brows.raise));
                prop_assert!((-1.0..=1.0).contains(&brows.tilt));
            }
        }
    }
}
