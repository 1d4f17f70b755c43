//! Tuning overrides
//!
//! Per-viseme values written by a tuning tool, layered over the table at
//! resolution time. The table itself is never mutated, so clearing an
//! override restores the stock pose.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use visage_core::{ParamGroup, PoseKey, Viseme};

use crate::VisemeEntry;

/// Override table shared between a tuner and the renderer
pub type SharedOverrides = Arc<RwLock<OverrideTable>>;

/// Per-viseme override entries, created lazily
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    entries: BTreeMap<Viseme, VisemeEntry>,
}

impl OverrideTable {
    pub fn new() -> Self {
        OverrideTable::default()
    }

    /// Wrap a fresh table for sharing
    pub fn shared() -> SharedOverrides {
        Arc::new(RwLock::new(OverrideTable::new()))
    }

    /// Set one value. Blendshape weights clamp to [0, 1], brow scalars to
    /// [-1, 1]. Non-finite values are rejected.
    pub fn set(&mut self, viseme: Viseme, group: ParamGroup, key: PoseKey, value: f32) -> bool {
        if !value.is_finite() {
            debug!(viseme = %viseme, key = %key, "rejected non-finite override");
            return false;
        }
        let value = match key {
            PoseKey::Param(_) => value.clamp(0.0, 1.0),
            PoseKey::EyebrowRaise | PoseKey::EyebrowTilt => value.clamp(-1.0, 1.0),
        };
        self.entries.entry(viseme).or_default().set(group, key, value);
        true
    }

    pub fn get(&self, viseme: Viseme, group: ParamGroup, key: PoseKey) -> Option<f32> {
        self.entries.get(&viseme).and_then(|e| e.get(group, key))
    }

    /// Remove a single value
    pub fn unset(&mut self, viseme: Viseme, group: ParamGroup, key: PoseKey) -> Option<f32> {
        let entry = self.entries.get_mut(&viseme)?;
        let removed = entry.group_mut(group).remove(&key);
        if entry.is_empty() {
            self.entries.remove(&viseme);
        }
        removed
    }

    pub fn entry(&self, viseme: Viseme) -> Option<&VisemeEntry> {
        self.entries.get(&viseme)
    }

    /// Replace a whole entry
    pub fn insert_entry(&mut self, viseme: Viseme, entry: VisemeEntry) {
        self.entries.insert(viseme, entry);
    }

    pub fn clear_viseme(&mut self, viseme: Viseme) {
        self.entries.remove(&viseme);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Viseme, &VisemeEntry)> + '_ {
        self.entries.iter().map(|(v, e)| (*v, e))
    }
}
