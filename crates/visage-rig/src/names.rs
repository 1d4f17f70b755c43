//! Rig name canonicalization and binding
//!
//! Rigs name their morph targets however their authoring tool felt like it:
//! `mouthSmile_L`, `Mouth_Smile.R`, `01_jawOpen`, `MouthOpen`. A target name
//! binds to a canonical parameter in two stages:
//!
//! 1. Canonicalize the spelling and look the result up in the ARKit
//!    vocabulary (`Binding::Direct`).
//! 2. Otherwise walk [`BINDING_RULES`] in order; the first rule whose pattern
//!    occurs in the lowercased name decides (`Binding::Rule`).
//!
//! Names matching neither are `Binding::Unmapped` and always read zero.

use std::collections::{BTreeSet, HashMap};

use visage_core::{FacialParam, Pose};

use FacialParam::*;

/// Capture-tool spellings that do not canonicalize mechanically
const ALIASES: &[(&str, FacialParam)] = &[
    ("mouthSmile_L", MouthSmileLeft),
    ("mouthSmile_R", MouthSmileRight),
    ("mouthFrown_L", MouthFrownLeft),
    ("mouthFrown_R", MouthFrownRight),
    ("mouthStretch_L", MouthStretchLeft),
    ("mouthStretch_R", MouthStretchRight),
    ("mouthPress_L", MouthPressLeft),
    ("mouthPress_R", MouthPressRight),
    ("mouthUpperUp_L", MouthUpperUpLeft),
    ("mouthUpperUp_R", MouthUpperUpRight),
    ("mouthLowerDown_L", MouthLowerDownLeft),
    ("mouthLowerDown_R", MouthLowerDownRight),
    ("mouthDimple_L", MouthDimpleLeft),
    ("mouthDimple_R", MouthDimpleRight),
    ("browDown_L", BrowDownLeft),
    ("browDown_R", BrowDownRight),
    ("browOuterUp_L", BrowOuterUpLeft),
    ("browOuterUp_R", BrowOuterUpRight),
];

fn is_separator(c: char) -> bool {
    c == '_' || c == '-' || c == '.' || c.is_whitespace()
}

/// Split a trailing side marker off a name.
///
/// Recognizes `_L`, `.R`, `-l` and a bare capital `L`/`R` after a lowercase
/// letter (`mouthSmileL`).
fn split_side(name: &str) -> (&str, &'static str) {
    let bytes = name.as_bytes();
    let n = bytes.len();
    if n < 2 {
        return (name, "");
    }

    let side = match bytes[n - 1] {
        b'l' | b'L' => "Left",
        b'r' | b'R' => "Right",
        _ => return (name, ""),
    };

    let prev = bytes[n - 2] as char;
    if is_separator(prev) {
        return (&name[..n - 2], side);
    }
    if bytes[n - 1].is_ascii_uppercase() && prev.is_ascii_lowercase() {
        return (&name[..n - 1], side);
    }
    (name, "")
}

/// Canonical spelling of a rig target name. Not guaranteed to be an ARKit
/// name; pass the result to [`FacialParam::parse_ignore_case`] for that.
pub fn canonicalize(name: &str) -> String {
    let trimmed = name.trim();
    if let Some((_, param)) = ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
    {
        return param.as_str().to_string();
    }

    let (stem, side) = split_side(trimmed);
    let joined: String = stem.chars().filter(|c| !is_separator(*c)).collect();
    let body = joined.trim_start_matches(|c: char| c.is_ascii_digit());

    format!("{body}{side}")
}

/// Canonicalize and parse in one step
pub fn canonical_param(name: &str) -> Option<FacialParam> {
    FacialParam::parse_ignore_case(&canonicalize(name))
}

/// How a matched rule picks its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// A single parameter
    Param(FacialParam),
    /// First non-zero of two parameters
    Either(FacialParam, FacialParam),
    /// Left or right by the name's side word, max of both without one
    Sided { left: FacialParam, right: FacialParam },
    /// Upper if the name says "upper", lower otherwise
    UpperLower { upper: FacialParam, lower: FacialParam },
}

/// One fallback rule: any of `patterns` inside the lowercased name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingRule {
    pub patterns: &'static [&'static str],
    pub pick: Pick,
}

impl BindingRule {
    pub fn matches(&self, lower: &str) -> bool {
        self.patterns.iter().any(|p| lower.contains(p))
    }
}

/// Ordered fallback rules. The first match wins.
pub const BINDING_RULES: &[BindingRule] = &[
    BindingRule { patterns: &["jawopen", "mouthopen"], pick: Pick::Param(JawOpen) },
    BindingRule { patterns: &["mouthclose"], pick: Pick::Param(MouthClose) },
    BindingRule { patterns: &["funnel"], pick: Pick::Param(MouthFunnel) },
    BindingRule { patterns: &["pucker", "kiss"], pick: Pick::Param(MouthPucker) },
    BindingRule { patterns: &["browdown"], pick: Pick::Either(BrowDownLeft, BrowDownRight) },
    BindingRule { patterns: &["browinnerup"], pick: Pick::Param(BrowInnerUp) },
    BindingRule {
        patterns: &["browouterup"],
        pick: Pick::Either(BrowOuterUpLeft, BrowOuterUpRight),
    },
    BindingRule {
        patterns: &["smile"],
        pick: Pick::Sided { left: MouthSmileLeft, right: MouthSmileRight },
    },
    BindingRule {
        patterns: &["frown", "sad"],
        pick: Pick::Sided { left: MouthFrownLeft, right: MouthFrownRight },
    },
    BindingRule {
        patterns: &["stretch", "wide"],
        pick: Pick::Sided { left: MouthStretchLeft, right: MouthStretchRight },
    },
    BindingRule {
        patterns: &["press"],
        pick: Pick::Sided { left: MouthPressLeft, right: MouthPressRight },
    },
    BindingRule {
        patterns: &["mouthroll"],
        pick: Pick::UpperLower { upper: MouthRollUpper, lower: MouthRollLower },
    },
    BindingRule {
        patterns: &["mouthshrug"],
        pick: Pick::UpperLower { upper: MouthShrugUpper, lower: MouthShrugLower },
    },
    BindingRule {
        patterns: &["mouthlift"],
        pick: Pick::Either(MouthUpperUpLeft, MouthUpperUpRight),
    },
];

/// Where a rule-bound target reads its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    Param(FacialParam),
    FirstNonZero(FacialParam, FacialParam),
    Max(FacialParam, FacialParam),
}

impl RuleSource {
    fn read(self, pose: &Pose) -> f32 {
        match self {
            RuleSource::Param(p) => pose.get(p),
            RuleSource::FirstNonZero(a, b) => {
                let first = pose.get(a);
                if first != 0.0 {
                    first
                } else {
                    pose.get(b)
                }
            }
            RuleSource::Max(a, b) => pose.max_of(a, b),
        }
    }
}

/// Resolved binding of one mesh target name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Direct(FacialParam),
    Rule { index: usize, source: RuleSource },
    Unmapped,
}

impl Binding {
    /// Bind a mesh target name
    pub fn resolve(name: &str) -> Binding {
        let canonical = canonicalize(name);
        if let Some(param) = FacialParam::parse_ignore_case(&canonical) {
            return Binding::Direct(param);
        }

        let lower = canonical.to_ascii_lowercase();
        for (index, rule) in BINDING_RULES.iter().enumerate() {
            if !rule.matches(&lower) {
                continue;
            }
            let source = match rule.pick {
                Pick::Param(p) => RuleSource::Param(p),
                Pick::Either(a, b) => RuleSource::FirstNonZero(a, b),
                Pick::Sided { left, right } => {
                    if lower.contains("left") {
                        RuleSource::Param(left)
                    } else if lower.contains("right") {
                        RuleSource::Param(right)
                    } else {
                        RuleSource::Max(left, right)
                    }
                }
                Pick::UpperLower { upper, lower: low } => {
                    if lower.contains("upper") {
                        RuleSource::Param(upper)
                    } else {
                        RuleSource::Param(low)
                    }
                }
            };
            return Binding::Rule { index, source };
        }

        Binding::Unmapped
    }

    /// Target value for this binding under `pose`. Unmapped reads zero.
    #[inline]
    pub fn target(&self, pose: &Pose) -> f32 {
        match self {
            Binding::Direct(p) => pose.get(*p),
            Binding::Rule { source, .. } => source.read(pose),
            Binding::Unmapped => 0.0,
        }
    }
}

/// Per-name binding cache. Binding is pure, so entries never go stale.
#[derive(Debug, Default)]
pub struct BindingCache {
    bindings: HashMap<String, Binding>,
}

impl BindingCache {
    pub fn new() -> Self {
        BindingCache::default()
    }

    pub fn binding(&mut self, name: &str) -> Binding {
        if let Some(b) = self.bindings.get(name) {
            return *b;
        }
        let b = Binding::resolve(name);
        self.bindings.insert(name.to_string(), b);
        b
    }

    /// Bind every name not seen before. Returns the coverage of `names` when
    /// at least one of them was new, so a rig is summarized once.
    pub fn learn<'a, I>(&mut self, names: I) -> Option<CoverageReport>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        let known = self.bindings.len();
        for name in names.clone() {
            self.binding(name);
        }
        if self.bindings.len() == known {
            return None;
        }
        Some(coverage(names))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

/// How well a set of mesh target names covers the ARKit vocabulary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    /// Canonical parameters some name binds to directly
    pub direct: BTreeSet<FacialParam>,
    /// Names bound through a fallback rule, with the rule index
    pub via_rules: Vec<(String, usize)>,
    /// Names that bind to nothing
    pub unmapped: Vec<String>,
}

impl CoverageReport {
    /// Canonical parameters no name binds to directly
    pub fn missing(&self) -> Vec<FacialParam> {
        FacialParam::ALL
            .iter()
            .copied()
            .filter(|p| !self.direct.contains(p))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.direct.len() == FacialParam::ALL.len()
    }
}

/// Bind every name and summarize
pub fn coverage<'a, I>(names: I) -> CoverageReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = CoverageReport::default();
    for name in names {
        match Binding::resolve(name) {
            Binding::Direct(p) => {
                report.direct.insert(p);
            }
            Binding::Rule { index, .. } => report.via_rules.push((name.to_string(), index)),
            Binding::Unmapped => report.unmapped.push(name.to_string()),
        }
    }
    report
}
