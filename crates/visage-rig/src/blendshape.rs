//! Blendshape adapter
//!
//! Turns an externally supplied ARKit-style dictionary into a [`Pose`].
//! Capture devices, other processes and test harnesses all feed this path,
//! so nothing here trusts its input:
//! - a missing or non-object input means "no override"
//! - keys outside the vocabulary are dropped
//! - values must be numbers or numeric strings; anything else is dropped
//! - accepted values clamp to [0, 1], then scale by intensity

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;
use visage_core::{FacialParam, Pose};

use crate::canonical_param;

/// Blendshape adapter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlendshapeConfig {
    /// Accept rig spellings (`mouthSmile_L`) by canonicalizing keys first
    pub canonicalize_keys: bool,
}

/// Numeric value of a dictionary entry, if it has one
fn coerce(value: &Value) -> Option<f32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if n.is_nan() {
        None
    } else {
        Some(n as f32)
    }
}

/// Adapt a blendshape dictionary.
///
/// Returns `None` when the input is absent or not an object; that is distinct
/// from an object with no usable keys, which yields an empty pose.
pub fn adapt_blendshapes(
    input: Option<&Value>,
    intensity: f32,
    config: &BlendshapeConfig,
) -> Option<Pose> {
    let map = input?.as_object()?;
    let amount = if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    };

    let mut pose = Pose::new();
    let mut dropped = 0usize;
    for (key, value) in map {
        let param = if config.canonicalize_keys {
            canonical_param(key)
        } else {
            FacialParam::parse(key)
        };
        match (param, coerce(value)) {
            (Some(param), Some(weight)) => pose.set(param, weight.clamp(0.0, 1.0)),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        trace!(accepted = pose.len(), dropped, "adapted blendshapes");
    }

    pose.scale(amount);
    Some(pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn adapt(v: &Value, i: f32) -> Option<Pose> {
        adapt_blendshapes(Some(v), i, &BlendshapeConfig::default())
    }

    #[test]
    fn test_absent_or_non_object_is_no_override() {
        let cfg = BlendshapeConfig::default();
        assert_eq!(adapt_blendshapes(None, 1.0, &cfg), None);
        assert_eq!(adapt(&json!(null), 1.0), None);
        assert_eq!(adapt(&json!(0.5), 1.0), None);
        assert_eq!(adapt(&json!("jawOpen"), 1.0), None);
        assert_eq!(adapt(&json!([0.1, 0.2]), 1.0), None);
    }

    #[test]
    fn test_empty_object_is_empty_pose() {
        let pose = adapt(&json!({}), 1.0).unwrap();
        assert!(pose.is_empty());
    }

    #[test]
    fn test_filters_and_clamps() {
        let pose = adapt(
            &json!({
                "jawOpen": 0.9,
                "mouthClose": "0.25",
                "mouthPucker": 1.8,
                "mouthFunnel": -0.3,
                "tongueOut": "lots",
                "cheekPuff": null,
                "eyeBlinkLeft": true,
                "mouthSmileLeft": "",
                "notAShape": 0.5,
            }),
            1.0,
        )
        .unwrap();

        assert_eq!(pose.get(FacialParam::JawOpen), 0.9);
        assert_eq!(pose.get(FacialParam::MouthClose), 0.25);
        assert_eq!(pose.get(FacialParam::MouthPucker), 1.0);
        assert_eq!(pose.try_get(FacialParam::MouthFunnel), Some(0.0));
        assert_eq!(pose.try_get(FacialParam::TongueOut), None);
        assert_eq!(pose.try_get(FacialParam::CheekPuff), None);
        assert_eq!(pose.try_get(FacialParam::EyeBlinkLeft), None);
        assert_eq!(pose.try_get(FacialParam::MouthSmileLeft), None);
        assert_eq!(pose.len(), 4);
    }

    #[test]
    fn test_intensity_scales() {
        let pose = adapt(&json!({ "jawOpen": 0.8 }), 0.5).unwrap();
        assert!((pose.get(FacialParam::JawOpen) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_rig_spellings_need_canonicalization() {
        let input = json!({ "mouthSmile_L": 0.6 });
        assert!(adapt(&input, 1.0).unwrap().is_empty());

        let cfg = BlendshapeConfig { canonicalize_keys: true };
        let pose = adapt_blendshapes(Some(&input), 1.0, &cfg).unwrap();
        assert_eq!(pose.get(FacialParam::MouthSmileLeft), 0.6);
    }

    proptest! {
        #[test]
        fn prop_output_is_in_unit_range(w in -10.0f64..10.0, i in -1.0f32..2.0) {
            let pose = adapt(&json!({ "jawOpen": w }), i).unwrap();
            let v = pose.get(FacialParam::JawOpen);
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }
}
