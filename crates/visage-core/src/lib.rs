//! Visage Core - Fundamental types and primitives
//!
//! This crate defines the vocabulary shared by every stage of the avatar face
//! pipeline:
//! - Facial parameters (the 52 ARKit blendshape names)
//! - Viseme symbols (the 15 canonical mouth shapes)
//! - Poses (parameter -> weight maps) and brow scalars
//! - Playback time primitives
//! - Error types for the fallible edges (configuration, persistence)

pub mod error;
pub mod param;
pub mod pose;
pub mod time;
pub mod viseme;

pub use error::*;
pub use param::*;
pub use pose::*;
pub use time::*;
pub use viseme::*;
