//! Visage Test Harness - Frame-loop simulation
//!
//! This crate provides:
//! - Frame timing models (steady, jittery, stalling displays)
//! - A frame simulator running a driver, a player and meshes together
//! - Rig and payload fixtures shared by the integration tests and benches

pub mod fixtures;
pub mod simulator;

pub use fixtures::*;
pub use simulator::*;
