//! Tuning persistence
//!
//! A mapping document is the full viseme table as a tuner sees it: the
//! rest-state baseline plus every viseme entry with its overrides flattened
//! on top.
//!
//! ```json
//! {
//!   "restState": { "mouth": { "jawOpen": 0.137 }, "brows": { "browInnerUp": 0.12 } },
//!   "visemes": { "aa": { "mouth": { "jawOpen": 0.95 }, "brows": { "eyebrowRaise": 0.08 } } }
//! }
//! ```
//!
//! Loading is lenient: unknown visemes, unknown parameter names and
//! non-numeric values are dropped with a warning.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use visage_core::{ParamGroup, PoseKey, VisageError, VisageResult, Viseme};
use visage_viseme::{OverrideTable, PoseResolver, PoseTable, VisemeEntry};

/// Serialized tuning state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDocument {
    pub rest_state: VisemeEntry,
    pub visemes: BTreeMap<Viseme, VisemeEntry>,
}

impl MappingDocument {
    /// Snapshot a resolver: table entries with overrides on top
    pub fn from_resolver(resolver: &PoseResolver) -> Self {
        let table = resolver.table();
        let overrides = resolver.overrides().read();

        let visemes = Viseme::ALL
            .iter()
            .map(|&v| {
                let mut entry = table.entry(v).clone();
                if let Some(over) = overrides.entry(v) {
                    entry.overlay(over);
                }
                (v, entry)
            })
            .collect();

        Self {
            rest_state: table.rest().clone(),
            visemes,
        }
    }

    /// Pose table with this document as its stock values
    pub fn to_table(&self) -> PoseTable {
        PoseTable::from_entries(self.rest_state.clone(), self.visemes.clone())
    }

    /// Install the document's entries as overrides on top of an existing
    /// table. Existing overrides for the same visemes are replaced.
    pub fn install_overrides(&self, overrides: &mut OverrideTable) {
        for (viseme, entry) in &self.visemes {
            overrides.insert_entry(*viseme, entry.clone());
        }
    }

    pub fn to_json(&self) -> VisageResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| VisageError::MalformedDocument(e.to_string()))
    }

    pub fn from_json(json: &str) -> VisageResult<Self> {
        let root: Value =
            serde_json::from_str(json).map_err(|e| VisageError::MalformedDocument(e.to_string()))?;
        let root = root
            .as_object()
            .ok_or_else(|| VisageError::MalformedDocument("expected an object".into()))?;

        let rest_state = match root.get("restState") {
            Some(value) => parse_entry("restState", value),
            None => VisemeEntry::new(),
        };

        let mut visemes = BTreeMap::new();
        if let Some(map) = root.get("visemes").and_then(Value::as_object) {
            for (code, value) in map {
                match Viseme::from_code(code) {
                    Some(viseme) => {
                        visemes.insert(viseme, parse_entry(code, value));
                    }
                    None => warn!(viseme = %code, "dropping unknown viseme"),
                }
            }
        }

        Ok(Self {
            rest_state,
            visemes,
        })
    }
}

fn parse_group(context: &str, group: ParamGroup, map: &Map<String, Value>) -> BTreeMap<PoseKey, f32> {
    let mut out = BTreeMap::new();
    for (name, value) in map {
        let Some(key) = PoseKey::parse(name) else {
            warn!(context, group = group.as_str(), key = %name, "dropping unknown parameter");
            continue;
        };
        match value.as_f64() {
            Some(v) if v.is_finite() => {
                out.insert(key, v as f32);
            }
            _ => warn!(context, key = %name, "dropping non-numeric value"),
        }
    }
    out
}

fn parse_entry(context: &str, value: &Value) -> VisemeEntry {
    let mut entry = VisemeEntry::new();
    for group in ParamGroup::ALL {
        if let Some(map) = value.get(group.as_str()).and_then(Value::as_object) {
            *entry.group_mut(group) = parse_group(context, group, map);
        }
    }
    entry
}

/// Write a document to `path`
pub fn save_mapping(path: impl AsRef<Path>, doc: &MappingDocument) -> VisageResult<()> {
    let path = path.as_ref();
    std::fs::write(path, doc.to_json()?)?;
    debug!(path = %path.display(), visemes = doc.visemes.len(), "mapping saved");
    Ok(())
}

/// Read a document from `path`
pub fn load_mapping(path: impl AsRef<Path>) -> VisageResult<MappingDocument> {
    let json = std::fs::read_to_string(path)?;
    MappingDocument::from_json(&json)
}
