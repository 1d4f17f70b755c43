//! Brow rig seam
//!
//! Brows are driven by two scalars rather than morph targets: `raise` lifts
//! both brow objects, `tilt` rotates them in opposite directions.

use serde::{Deserialize, Serialize};
use visage_core::BrowPose;

/// Anything that can show a brow pose
pub trait BrowRig {
    fn set_brows(&mut self, brows: BrowPose);
}

/// Brow rig configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrowRigConfig {
    /// Vertical offset per unit of raise, in scene units
    pub raise_scale: f32,
}

impl Default for BrowRigConfig {
    fn default() -> Self {
        Self { raise_scale: 0.08 }
    }
}

/// Position and rotation of one brow object
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrowTransform {
    pub position_y: f32,
    pub rotation_z: f32,
}

/// Left and right brow objects, offset from their captured rest transforms
#[derive(Debug, Clone, Default)]
pub struct EyebrowPair {
    config: BrowRigConfig,
    left_base: BrowTransform,
    right_base: BrowTransform,
    left: BrowTransform,
    right: BrowTransform,
}

impl EyebrowPair {
    /// Capture rest transforms for both brows
    pub fn new(left_base: BrowTransform, right_base: BrowTransform) -> Self {
        Self::with_config(BrowRigConfig::default(), left_base, right_base)
    }

    pub fn with_config(
        config: BrowRigConfig,
        left_base: BrowTransform,
        right_base: BrowTransform,
    ) -> Self {
        Self {
            config,
            left_base,
            right_base,
            left: left_base,
            right: right_base,
        }
    }

    pub fn left(&self) -> BrowTransform {
        self.left
    }

    pub fn right(&self) -> BrowTransform {
        self.right
    }
}

impl BrowRig for EyebrowPair {
    fn set_brows(&mut self, brows: BrowPose) {
        let lift = brows.raise * self.config.raise_scale;
        self.left = BrowTransform {
            position_y: self.left_base.position_y + lift,
            rotation_z: self.left_base.rotation_z + brows.tilt,
        };
        self.right = BrowTransform {
            position_y: self.right_base.position_y + lift,
            rotation_z: self.right_base.rotation_z - brows.tilt,
        };
    }
}
