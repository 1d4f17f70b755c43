//! Facial parameter vocabulary
//!
//! The interchange vocabulary between rigs is the 52-name ARKit blendshape set.
//! Rig-specific morph target names are canonicalized onto it elsewhere; inside
//! the pipeline every weight is keyed by a [`FacialParam`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::VisageError;

macro_rules! facial_params {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// One of the 52 canonical ARKit blendshape names.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum FacialParam {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl FacialParam {
            /// Every parameter, in ARKit declaration order.
            pub const ALL: [FacialParam; 52] = [$(FacialParam::$variant),+];

            /// The canonical camelCase name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(FacialParam::$variant => $name,)+
                }
            }

            /// Exact lookup of a canonical name.
            pub fn parse(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(FacialParam::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

facial_params! {
    BrowDownLeft => "browDownLeft",
    BrowDownRight => "browDownRight",
    BrowInnerUp => "browInnerUp",
    BrowOuterUpLeft => "browOuterUpLeft",
    BrowOuterUpRight => "browOuterUpRight",
    CheekPuff => "cheekPuff",
    CheekSquintLeft => "cheekSquintLeft",
    CheekSquintRight => "cheekSquintRight",
    EyeBlinkLeft => "eyeBlinkLeft",
    EyeBlinkRight => "eyeBlinkRight",
    EyeLookDownLeft => "eyeLookDownLeft",
    EyeLookDownRight => "eyeLookDownRight",
    EyeLookInLeft => "eyeLookInLeft",
    EyeLookInRight => "eyeLookInRight",
    EyeLookOutLeft => "eyeLookOutLeft",
    EyeLookOutRight => "eyeLookOutRight",
    EyeLookUpLeft => "eyeLookUpLeft",
    EyeLookUpRight => "eyeLookUpRight",
    EyeSquintLeft => "eyeSquintLeft",
    EyeSquintRight => "eyeSquintRight",
    EyeWideLeft => "eyeWideLeft",
    EyeWideRight => "eyeWideRight",
    JawForward => "jawForward",
    JawLeft => "jawLeft",
    JawOpen => "jawOpen",
    JawRight => "jawRight",
    MouthClose => "mouthClose",
    MouthDimpleLeft => "mouthDimpleLeft",
    MouthDimpleRight => "mouthDimpleRight",
    MouthFrownLeft => "mouthFrownLeft",
    MouthFrownRight => "mouthFrownRight",
    MouthFunnel => "mouthFunnel",
    MouthLeft => "mouthLeft",
    MouthLowerDownLeft => "mouthLowerDownLeft",
    MouthLowerDownRight => "mouthLowerDownRight",
    MouthPressLeft => "mouthPressLeft",
    MouthPressRight => "mouthPressRight",
    MouthPucker => "mouthPucker",
    MouthRight => "mouthRight",
    MouthRollLower => "mouthRollLower",
    MouthRollUpper => "mouthRollUpper",
    MouthShrugLower => "mouthShrugLower",
    MouthShrugUpper => "mouthShrugUpper",
    MouthSmileLeft => "mouthSmileLeft",
    MouthSmileRight => "mouthSmileRight",
    MouthStretchLeft => "mouthStretchLeft",
    MouthStretchRight => "mouthStretchRight",
    MouthUpperUpLeft => "mouthUpperUpLeft",
    MouthUpperUpRight => "mouthUpperUpRight",
    NoseSneerLeft => "noseSneerLeft",
    NoseSneerRight => "noseSneerRight",
    TongueOut => "tongueOut",
}

impl FacialParam {
    /// Lookup that also accepts other casings (`JawOpen`, `jawopen`).
    pub fn parse_ignore_case(name: &str) -> Option<Self> {
        Self::parse(name).or_else(|| {
            FacialParam::ALL
                .iter()
                .copied()
                .find(|p| p.as_str().eq_ignore_ascii_case(name))
        })
    }

    /// The tuning group this parameter is edited under.
    pub fn group(self) -> ParamGroup {
        if self.as_str().starts_with("brow") {
            ParamGroup::Brows
        } else {
            ParamGroup::Mouth
        }
    }
}

impl fmt::Display for FacialParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacialParam {
    type Err = VisageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| VisageError::UnknownParam(s.to_string()))
    }
}

/// Sub-map of a viseme entry. Only used for organizing tables and overrides;
/// resolution flattens both groups into a single pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamGroup {
    Mouth,
    Brows,
}

impl ParamGroup {
    pub const ALL: [ParamGroup; 2] = [ParamGroup::Mouth, ParamGroup::Brows];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamGroup::Mouth => "mouth",
            ParamGroup::Brows => "brows",
        }
    }
}

/// A key inside a viseme table entry.
///
/// Besides blendshape parameters, brow sub-maps carry two scalars that drive
/// brow objects directly (position offset and rotation) instead of morph
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PoseKey {
    Param(FacialParam),
    EyebrowRaise,
    EyebrowTilt,
}

impl PoseKey {
    pub fn as_str(self) -> &'static str {
        match self {
            PoseKey::Param(p) => p.as_str(),
            PoseKey::EyebrowRaise => "eyebrowRaise",
            PoseKey::EyebrowTilt => "eyebrowTilt",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "eyebrowRaise" => Some(PoseKey::EyebrowRaise),
            "eyebrowTilt" => Some(PoseKey::EyebrowTilt),
            other => FacialParam::parse(other).map(PoseKey::Param),
        }
    }

    /// The parameter this key drives, if it is a blendshape key.
    pub fn param(self) -> Option<FacialParam> {
        match self {
            PoseKey::Param(p) => Some(p),
            _ => None,
        }
    }
}

impl From<FacialParam> for PoseKey {
    fn from(param: FacialParam) -> Self {
        PoseKey::Param(param)
    }
}

impl From<PoseKey> for String {
    fn from(key: PoseKey) -> Self {
        key.as_str().to_string()
    }
}

impl TryFrom<String> for PoseKey {
    type Error = VisageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PoseKey::parse(&value).ok_or(VisageError::UnknownParam(value))
    }
}

impl fmt::Display for PoseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
