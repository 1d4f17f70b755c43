//! Rest-state baseline and the canonical viseme pose table
//!
//! Each entry holds two sub-maps, `mouth` and `brows`. The split mirrors how
//! the tuning tool edits them; resolution flattens both into one pose.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use visage_core::{FacialParam, ParamGroup, PoseKey, Viseme};

use FacialParam::*;

/// One viseme's target values, grouped for editing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisemeEntry {
    pub mouth: BTreeMap<PoseKey, f32>,
    pub brows: BTreeMap<PoseKey, f32>,
}

impl VisemeEntry {
    pub fn new() -> Self {
        VisemeEntry::default()
    }

    /// Build from mouth parameters and brow keys
    pub fn from_parts(mouth: &[(FacialParam, f32)], brows: &[(PoseKey, f32)]) -> Self {
        VisemeEntry {
            mouth: mouth.iter().map(|(p, v)| (PoseKey::Param(*p), *v)).collect(),
            brows: brows.iter().copied().collect(),
        }
    }

    pub fn group(&self, group: ParamGroup) -> &BTreeMap<PoseKey, f32> {
        match group {
            ParamGroup::Mouth => &self.mouth,
            ParamGroup::Brows => &self.brows,
        }
    }

    pub fn group_mut(&mut self, group: ParamGroup) -> &mut BTreeMap<PoseKey, f32> {
        match group {
            ParamGroup::Mouth => &mut self.mouth,
            ParamGroup::Brows => &mut self.brows,
        }
    }

    pub fn get(&self, group: ParamGroup, key: PoseKey) -> Option<f32> {
        self.group(group).get(&key).copied()
    }

    pub fn set(&mut self, group: ParamGroup, key: PoseKey, value: f32) {
        self.group_mut(group).insert(key, value);
    }

    /// Every (group, key, value), mouth first
    pub fn iter(&self) -> impl Iterator<Item = (ParamGroup, PoseKey, f32)> + '_ {
        let mouth = self.mouth.iter().map(|(k, v)| (ParamGroup::Mouth, *k, *v));
        let brows = self.brows.iter().map(|(k, v)| (ParamGroup::Brows, *k, *v));
        mouth.chain(brows)
    }

    pub fn len(&self) -> usize {
        self.mouth.len() + self.brows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mouth.is_empty() && self.brows.is_empty()
    }

    /// Layer `top` over `self`, group by group. Keys in `top` win.
    pub fn overlay(&mut self, top: &VisemeEntry) {
        for (group, key, value) in top.iter() {
            self.set(group, key, value);
        }
    }
}

/// Values captured from the rig at rest. Every non-silent viseme starts here.
pub fn rest_state() -> VisemeEntry {
    VisemeEntry::from_parts(
        &[
            (CheekPuff, 0.07211),
            (CheekSquintLeft, 0.06493),
            (CheekSquintRight, 0.06679),
            (EyeBlinkLeft, 0.06235),
            (EyeBlinkRight, 0.0623),
            (EyeLookDownLeft, 0.32136),
            (EyeLookDownRight, 0.32038),
            (EyeLookInLeft, 0.0),
            (EyeLookInRight, 0.13493),
            (EyeLookOutLeft, 0.02952),
            (EyeLookOutRight, 0.0),
            (EyeLookUpLeft, 0.0),
            (EyeLookUpRight, 0.0),
            (EyeSquintLeft, 0.06009),
            (EyeSquintRight, 0.06009),
            (EyeWideLeft, 0.0),
            (EyeWideRight, 0.0),
            (JawForward, 0.09864),
            (JawLeft, 0.04152),
            (JawOpen, 0.1371),
            (JawRight, 0.0),
            (MouthClose, 0.15055),
            (MouthDimpleLeft, 0.11703),
            (MouthDimpleRight, 0.11252),
            (MouthFrownLeft, 0.12203),
            (MouthFrownRight, 0.11968),
            (MouthFunnel, 0.0726),
            (MouthLowerDownLeft, 0.09089),
            (MouthLowerDownRight, 0.09187),
            (MouthPressLeft, 0.11132),
            (MouthPressRight, 0.11226),
            (MouthPucker, 0.15672),
            (MouthRollLower, 0.35175),
            (MouthRollUpper, 0.08684),
            (MouthShrugLower, 0.23266),
            (MouthShrugUpper, 0.30389),
            (MouthSmileLeft, 0.0),
            (MouthSmileRight, 0.0),
            (MouthStretchLeft, 0.18252),
            (MouthStretchRight, 0.15953),
            (MouthUpperUpLeft, 0.04365),
            (MouthUpperUpRight, 0.04553),
            (NoseSneerLeft, 0.09437),
            (NoseSneerRight, 0.08506),
            (TongueOut, 0.00014),
        ],
        &[
            (PoseKey::Param(BrowDownLeft), 0.0),
            (PoseKey::Param(BrowDownRight), 0.0),
            (PoseKey::Param(BrowInnerUp), 0.12167),
            (PoseKey::Param(BrowOuterUpLeft), 0.02322),
            (PoseKey::Param(BrowOuterUpRight), 0.02321),
        ],
    )
}

fn brows(raise: f32, tilt: f32) -> [(PoseKey, f32); 2] {
    [(PoseKey::EyebrowRaise, raise), (PoseKey::EyebrowTilt, tilt)]
}

/// Rest-state baseline plus one entry per viseme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseTable {
    rest: VisemeEntry,
    entries: BTreeMap<Viseme, VisemeEntry>,
}

impl PoseTable {
    /// The stock table shipped with the avatar
    pub fn canonical() -> Self {
        let mut entries = BTreeMap::new();

        entries.insert(Viseme::Sil, VisemeEntry::new());
        entries.insert(
            Viseme::PP,
            VisemeEntry::from_parts(
                &[
                    (MouthClose, 1.0),
                    (MouthPressLeft, 0.4),
                    (MouthPressRight, 0.4),
                    (JawOpen, 0.0),
                    (MouthFunnel, 0.0),
                    (MouthPucker, 0.0),
                ],
                &brows(0.04, 0.0),
            ),
        );
        entries.insert(
            Viseme::FF,
            VisemeEntry::from_parts(
                &[
                    (MouthClose, 0.88),
                    (MouthPucker, 0.35),
                    (MouthPressLeft, 0.45),
                    (MouthPressRight, 0.45),
                ],
                &brows(0.05, 0.0),
            ),
        );
        entries.insert(
            Viseme::TH,
            VisemeEntry::from_parts(
                &[(JawOpen, 0.3), (MouthPucker, 0.1), (MouthFunnel, 0.1)],
                &brows(0.1, 0.05),
            ),
        );
        entries.insert(
            Viseme::DD,
            VisemeEntry::from_parts(&[(JawOpen, 0.4), (MouthClose, 0.15)], &brows(0.06, 0.0)),
        );
        entries.insert(
            Viseme::KK,
            VisemeEntry::from_parts(&[(JawOpen, 0.35), (MouthClose, 0.15)], &brows(0.0, 0.0)),
        );
        entries.insert(
            Viseme::CH,
            VisemeEntry::from_parts(
                &[(JawOpen, 0.45), (MouthFunnel, 0.25), (MouthPucker, 0.15)],
                &brows(0.08, 0.0),
            ),
        );
        entries.insert(
            Viseme::SS,
            VisemeEntry::from_parts(
                &[(JawOpen, 0.18), (MouthStretchLeft, 0.34), (MouthStretchRight, 0.34)],
                &brows(0.06, 0.0),
            ),
        );
        entries.insert(
            Viseme::NN,
            VisemeEntry::from_parts(&[(JawOpen, 0.2), (MouthClose, 0.1)], &brows(0.0, 0.0)),
        );
        entries.insert(
            Viseme::RR,
            VisemeEntry::from_parts(&[(JawOpen, 0.35), (MouthPucker, 0.2)], &brows(0.0, 0.0)),
        );
        entries.insert(
            Viseme::AA,
            VisemeEntry::from_parts(
                &[(JawOpen, 0.95), (MouthFunnel, 0.1), (MouthPucker, 0.05)],
                &brows(0.08, 0.02),
            ),
        );
        entries.insert(
            Viseme::E,
            VisemeEntry::from_parts(
                &[
                    (JawOpen, 0.2),
                    (MouthClose, 0.25),
                    (MouthSmileLeft, 0.2),
                    (MouthSmileRight, 0.2),
                    (MouthStretchLeft, 0.5),
                    (MouthStretchRight, 0.5),
                ],
                &brows(0.07, 0.05),
            ),
        );
        entries.insert(
            Viseme::I,
            VisemeEntry::from_parts(
                &[(JawOpen, 0.18), (MouthSmileLeft, 0.28), (MouthSmileRight, 0.28)],
                &brows(0.1, 0.0),
            ),
        );
        entries.insert(
            Viseme::O,
            VisemeEntry::from_parts(
                &[(JawOpen, 0.5), (MouthPucker, 0.85), (MouthFunnel, 0.7)],
                &brows(0.05, 0.0),
            ),
        );
        entries.insert(
            Viseme::U,
            VisemeEntry::from_parts(
                &[(JawOpen, 0.3), (MouthPucker, 0.6), (MouthFunnel, 0.3)],
                &brows(0.04, 0.0),
            ),
        );

        PoseTable {
            rest: rest_state(),
            entries,
        }
    }

    /// A table with custom baseline and entries
    pub fn from_entries(rest: VisemeEntry, entries: BTreeMap<Viseme, VisemeEntry>) -> Self {
        PoseTable { rest, entries }
    }

    pub fn rest(&self) -> &VisemeEntry {
        &self.rest
    }

    pub fn set_rest(&mut self, rest: VisemeEntry) {
        self.rest = rest;
    }

    /// Entry for `viseme`, falling back to the silence entry, then to empty
    pub fn entry(&self, viseme: Viseme) -> &VisemeEntry {
        static EMPTY: VisemeEntry = VisemeEntry {
            mouth: BTreeMap::new(),
            brows: BTreeMap::new(),
        };
        self.entries
            .get(&viseme)
            .or_else(|| self.entries.get(&Viseme::Sil))
            .unwrap_or(&EMPTY)
    }

    pub fn contains(&self, viseme: Viseme) -> bool {
        self.entries.contains_key(&viseme)
    }

    /// Entry for `viseme`, created empty on first access
    pub fn entry_mut(&mut self, viseme: Viseme) -> &mut VisemeEntry {
        self.entries.entry(viseme).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Viseme, &VisemeEntry)> + '_ {
        self.entries.iter().map(|(v, e)| (*v, e))
    }
}

impl Default for PoseTable {
    fn default() -> Self {
        Self::canonical()
    }
}
