//! Visage Rig - From target poses to mesh weights
//!
//! - Blendshape adapter: external ARKit dictionaries into poses
//! - Constraint corrector: removes anatomically incoherent combinations
//! - Name binding: rig morph target names onto canonical parameters
//! - Smoothing: exponential approach of live weights toward targets
//! - Mesh and brow seams for the render collaborator

pub mod blendshape;
pub mod brows;
pub mod constraints;
pub mod mesh;
pub mod names;
pub mod smoothing;

pub use blendshape::*;
pub use brows::*;
pub use constraints::*;
pub use mesh::*;
pub use names::*;
pub use smoothing::*;
