//! Lip-sync player
//!
//! Walks a [`VisemeTrack`] against an [`AudioClock`] once per frame and
//! pushes the active viseme into a [`VisemeSink`]. At most one session is
//! active: starting a new one cancels the old one first, and stopping always
//! leaves the sink at silence.

use serde::{Deserialize, Serialize};
use tracing::debug;
use visage_core::Viseme;
use visage_viseme::normalize;

use crate::{AudioClock, ScheduleWalker, VisemeTrack};

/// Receiver of viseme changes, usually the avatar driver
pub trait VisemeSink {
    fn set_viseme(&mut self, label: &str, amount: f32);
    fn clear_viseme(&mut self);
}

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    /// End the session once the clock passes the last viseme
    pub finish_at_track_end: bool,

    /// Intensity passed to the sink
    pub amount: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            finish_at_track_end: true,
            amount: 1.0,
        }
    }
}

/// Identifies one playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(u64);

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No session
    Idle,
    /// Session active, audio not audible yet
    Waiting,
    /// Viseme shown this frame
    Active(Viseme),
    /// Session ended this frame; the sink was cleared
    Finished,
}

struct Session {
    handle: PlaybackHandle,
    track: VisemeTrack,
    clock: Box<dyn AudioClock + Send>,
    walker: ScheduleWalker,
    shown: Option<usize>,
}

/// Single-session viseme scheduler
pub struct LipSyncPlayer {
    config: PlayerConfig,
    session: Option<Session>,
    next_handle: u64,
}

impl LipSyncPlayer {
    pub fn new() -> Self {
        Self::with_config(PlayerConfig::default())
    }

    pub fn with_config(config: PlayerConfig) -> Self {
        Self {
            config,
            session: None,
            next_handle: 1,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Begin playing `track` against `clock`, cancelling any active session
    pub fn start<C, S>(&mut self, track: VisemeTrack, clock: C, sink: &mut S) -> PlaybackHandle
    where
        C: AudioClock + Send + 'static,
        S: VisemeSink + ?Sized,
    {
        self.stop(sink);

        let handle = PlaybackHandle(self.next_handle);
        self.next_handle += 1;
        debug!(handle = handle.0, visemes = track.len(), "lip-sync session started");

        self.session = Some(Session {
            handle,
            track,
            clock: Box::new(clock),
            walker: ScheduleWalker::new(),
            shown: None,
        });
        handle
    }

    /// Stop the active session, if any, and clear the sink
    pub fn stop<S: VisemeSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        match self.session.take() {
            Some(session) => {
                debug!(handle = session.handle.0, "lip-sync session stopped");
                sink.clear_viseme();
                true
            }
            None => false,
        }
    }

    /// Stop only if `handle` is still the active session
    pub fn stop_handle<S: VisemeSink + ?Sized>(&mut self, handle: PlaybackHandle, sink: &mut S) -> bool {
        if self.active_handle() == Some(handle) {
            self.stop(sink)
        } else {
            false
        }
    }

    pub fn active_handle(&self) -> Option<PlaybackHandle> {
        self.session.as_ref().map(|s| s.handle)
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    /// Advance the active session to the clock's current position
    pub fn poll<S: VisemeSink + ?Sized>(&mut self, sink: &mut S) -> PollOutcome {
        let Some(session) = self.session.as_mut() else {
            return PollOutcome::Idle;
        };

        let now = session.clock.now();
        if !now.has_started() {
            return PollOutcome::Waiting;
        }
        let t_ms = now.as_millis_f64();

        if self.config.finish_at_track_end {
            if let Some(total) = session.track.total_ms() {
                if t_ms >= total {
                    debug!(handle = session.handle.0, t_ms, "lip-sync session finished");
                    self.session = None;
                    sink.clear_viseme();
                    return PollOutcome::Finished;
                }
            }
        }

        let index = session.walker.advance(&session.track, t_ms);
        let label = session.track.label(index);
        if session.shown != Some(index) {
            session.shown = Some(index);
            sink.set_viseme(label, self.config.amount);
        }
        PollOutcome::Active(normalize(label))
    }
}

impl Default for LipSyncPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LipSyncPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LipSyncPlayer")
            .field("config", &self.config)
            .field("active", &self.active_handle())
            .finish()
    }
}
