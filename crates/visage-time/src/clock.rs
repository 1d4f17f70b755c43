//! Audio clocks
//!
//! An audio clock answers one question: where is playback right now? The
//! answer is negative while a clip is scheduled but not yet audible.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use visage_core::PlaybackTime;

/// Source of playback position
pub trait AudioClock {
    fn now(&self) -> PlaybackTime;
}

/// Clock moved by hand. Clones share the same position, so a test or an
/// audio callback can keep one handle while the player owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    position: Arc<Mutex<PlaybackTime>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock starting at `ms` (may be negative)
    pub fn starting_at_ms(ms: f64) -> Self {
        let clock = Self::new();
        clock.set_ms(ms);
        clock
    }

    pub fn set(&self, t: PlaybackTime) {
        *self.position.lock() = t;
    }

    pub fn set_ms(&self, ms: f64) {
        self.set(PlaybackTime::from_millis_f64(ms));
    }

    pub fn advance(&self, dt: Duration) {
        let mut pos = self.position.lock();
        *pos = *pos + dt;
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> PlaybackTime {
        *self.position.lock()
    }
}
