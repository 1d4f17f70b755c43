//! Visage Runtime - The avatar driver
//!
//! One [`AvatarDriver`] per avatar. Each frame:
//! 1. Merge the pending viseme pose with the pending blendshape pose
//! 2. Run the constraint corrector
//! 3. Bind every exposed morph target name to a target value
//! 4. Step live weights toward targets
//! 5. Step the brow scalars the same way
//!
//! Driver calls (`set_viseme`, `clear_viseme`, `set_blendshapes`) only
//! replace pending state; nothing touches a mesh until the next tick.

pub mod config;
pub mod driver;
pub mod telemetry;
pub mod tuning;

pub use config::*;
pub use driver::*;
pub use telemetry::*;
pub use tuning::*;
