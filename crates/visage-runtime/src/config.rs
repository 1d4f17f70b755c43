//! Driver configuration
//!
//! Loaded from camelCase JSON. Every section is optional; missing fields
//! take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;
use visage_core::{VisageError, VisageResult};
use visage_rig::{BlendshapeConfig, BrowRigConfig, SmoothingConfig};
use visage_time::PlayerConfig;

use crate::LogConfig;

/// Avatar driver configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverConfig {
    /// Weight smoothing
    pub smoothing: SmoothingConfig,

    /// Brow object offsets
    pub brows: BrowRigConfig,

    /// External blendshape input
    pub blendshapes: BlendshapeConfig,

    /// Lip-sync playback
    pub player: PlayerConfig,

    /// Logging
    pub log: LogConfig,
}

impl DriverConfig {
    /// Quick-settling preset for speech
    pub fn responsive() -> Self {
        Self {
            smoothing: SmoothingConfig::responsive(),
            ..Self::default()
        }
    }

    /// Soft preset for idle or expressive animation
    pub fn relaxed() -> Self {
        Self {
            smoothing: SmoothingConfig::relaxed(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> VisageResult<()> {
        self.smoothing.validate()?;
        if !self.brows.raise_scale.is_finite() {
            return Err(VisageError::InvalidConfig(format!(
                "brows.raiseScale must be finite, got {}",
                self.brows.raise_scale
            )));
        }
        if !(0.0..=1.0).contains(&self.player.amount) {
            return Err(VisageError::InvalidConfig(format!(
                "player.amount must be in [0, 1], got {}",
                self.player.amount
            )));
        }
        Ok(())
    }

    /// Parse and validate
    pub fn from_json_str(json: &str) -> VisageResult<Self> {
        let config: DriverConfig = serde_json::from_str(json).map_err(|e| {
            warn!(error = %e, "rejected driver config");
            VisageError::InvalidConfig(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate
    pub fn from_path(path: impl AsRef<Path>) -> VisageResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> VisageResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| VisageError::InvalidConfig(e.to_string()))
    }
}
