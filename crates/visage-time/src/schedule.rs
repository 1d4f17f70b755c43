//! Viseme schedules
//!
//! A TTS engine delivers three parallel arrays: labels, onsets and
//! durations, times in milliseconds from clip start. The walker keeps an
//! index into them that only moves forward.

use serde::{Deserialize, Serialize};
use visage_core::{VisageError, VisageResult};

/// Viseme timing payload as TTS engines emit it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisemeTrack {
    /// Raw labels, normalized when played
    pub visemes: Vec<String>,
    /// Onsets in ms
    pub vtimes: Vec<f64>,
    /// Durations in ms
    pub vdurations: Vec<f64>,
}

impl VisemeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TTS payload. Extra fields are ignored.
    pub fn from_json(json: &str) -> VisageResult<Self> {
        serde_json::from_str(json).map_err(|e| VisageError::MalformedDocument(e.to_string()))
    }

    /// Append one viseme
    pub fn push(&mut self, label: impl Into<String>, onset_ms: f64, duration_ms: f64) {
        self.visemes.push(label.into());
        self.vtimes.push(onset_ms);
        self.vdurations.push(duration_ms);
    }

    pub fn with(mut self, label: impl Into<String>, onset_ms: f64, duration_ms: f64) -> Self {
        self.push(label, onset_ms, duration_ms);
        self
    }

    /// Number of entries, driven by the label array
    pub fn len(&self) -> usize {
        self.visemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visemes.is_empty()
    }

    /// Label at `index`; missing labels read as silence
    pub fn label(&self, index: usize) -> &str {
        self.visemes.get(index).map(String::as_str).unwrap_or("sil")
    }

    /// End of entry `index` in ms, if its onset is known.
    /// Missing durations read as zero.
    pub fn end_ms(&self, index: usize) -> Option<f64> {
        let onset = *self.vtimes.get(index)?;
        let duration = self.vdurations.get(index).copied().unwrap_or(0.0);
        let end = onset + duration;
        if end.is_nan() {
            None
        } else {
            Some(end)
        }
    }

    /// End of the last entry, if known
    pub fn total_ms(&self) -> Option<f64> {
        match self.len() {
            0 => Some(0.0),
            n => self.end_ms(n - 1),
        }
    }
}

/// Monotonic cursor over a [`VisemeTrack`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleWalker {
    index: usize,
}

impl ScheduleWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Move past every entry that ended at or before `t_ms`, never beyond
    /// the last entry. Returns the new index.
    pub fn advance(&mut self, track: &VisemeTrack, t_ms: f64) -> usize {
        while self.index + 1 < track.len() {
            match track.end_ms(self.index) {
                Some(end) if t_ms >= end => self.index += 1,
                _ => break,
            }
        }
        self.index
    }
}
