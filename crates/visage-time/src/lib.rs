//! Visage Time - Keeping the mouth on the audio
//!
//! The audio collaborator reports playback position; a TTS engine supplies
//! viseme onsets and durations. The player walks that schedule once per
//! frame, monotonically, and pushes the active viseme into a sink.

pub mod clock;
pub mod player;
pub mod schedule;

pub use clock::*;
pub use player::*;
pub use schedule::*;
