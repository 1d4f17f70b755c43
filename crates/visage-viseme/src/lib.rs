//! Visage Viseme - From speech labels to target poses
//!
//! This crate implements the front half of the face pipeline:
//! - Label normalization onto the 15 canonical visemes
//! - The rest-state baseline and the canonical viseme pose table
//! - The tuning override table (shareable across threads)
//! - Pose resolution: baseline < table < override, scaled by intensity

pub mod normalize;
pub mod overrides;
pub mod resolve;
pub mod table;

pub use normalize::*;
pub use overrides::*;
pub use resolve::*;
pub use table::*;
