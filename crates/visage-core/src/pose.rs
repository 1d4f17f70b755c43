//! Pose primitives
//!
//! A pose maps facial parameters to weights. Absent parameters read as zero,
//! so a missing key and an explicit `0.0` behave the same downstream. Weights
//! are not clamped on insertion; the rig clamps when it writes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::FacialParam;

/// Parameter -> weight map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose {
    weights: BTreeMap<FacialParam, f32>,
}

impl Pose {
    pub fn new() -> Self {
        Pose::default()
    }

    /// Weight of a parameter, zero if absent
    #[inline]
    pub fn get(&self, param: FacialParam) -> f32 {
        self.weights.get(&param).copied().unwrap_or(0.0)
    }

    /// Weight of a parameter only if the pose defines it
    #[inline]
    pub fn try_get(&self, param: FacialParam) -> Option<f32> {
        self.weights.get(&param).copied()
    }

    pub fn set(&mut self, param: FacialParam, weight: f32) {
        self.weights.insert(param, weight);
    }

    pub fn with(mut self, param: FacialParam, weight: f32) -> Self {
        self.set(param, weight);
        self
    }

    pub fn remove(&mut self, param: FacialParam) -> Option<f32> {
        self.weights.remove(&param)
    }

    pub fn contains(&self, param: FacialParam) -> bool {
        self.weights.contains_key(&param)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FacialParam, f32)> + '_ {
        self.weights.iter().map(|(p, w)| (*p, *w))
    }

    /// Largest of two weights, used for left/right pairs
    #[inline]
    pub fn max_of(&self, a: FacialParam, b: FacialParam) -> f32 {
        self.get(a).max(self.get(b))
    }

    /// Multiply every weight in place
    pub fn scale(&mut self, factor: f32) {
        for w in self.weights.values_mut() {
            *w *= factor;
        }
    }

    /// Overlay another pose on top of this one. Keys in `top` win.
    pub fn overlay(&mut self, top: &Pose) {
        for (p, w) in top.iter() {
            self.weights.insert(p, w);
        }
    }

    /// New pose with `top` layered over `self`
    pub fn merged(&self, top: &Pose) -> Pose {
        let mut out = self.clone();
        out.overlay(top);
        out
    }

    /// True if every weight is exactly zero (or the pose is empty)
    pub fn is_zero(&self) -> bool {
        self.weights.values().all(|w| *w == 0.0)
    }
}

impl FromIterator<(FacialParam, f32)> for Pose {
    fn from_iter<T: IntoIterator<Item = (FacialParam, f32)>>(iter: T) -> Self {
        Pose {
            weights: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(FacialParam, f32); N]> for Pose {
    fn from(pairs: [(FacialParam, f32); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Brow scalars driven outside the blendshape array
///
/// `raise` moves both brows vertically, `tilt` rotates them in opposite
/// directions. Tilt may be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowPose {
    pub raise: f32,
    pub tilt: f32,
}

impl BrowPose {
    pub fn new(raise: f32, tilt: f32) -> Self {
        BrowPose { raise, tilt }
    }

    pub fn neutral() -> Self {
        BrowPose::default()
    }

    /// Interpolate toward `other` by `t` (clamped to [0, 1])
    pub fn lerp(&self, other: &BrowPose, t: f32) -> BrowPose {
        let t = t.clamp(0.0, 1.0);
        BrowPose {
            raise: self.raise + (other.raise - self.raise) * t,
            tilt: self.tilt + (other.tilt - self.tilt) * t,
        }
    }
}
