//! Error types for Visage
//!
//! The per-frame path never fails: bad labels fall back to silence and bad
//! blendshape values are dropped. Errors only surface where configuration is
//! validated or tuning documents are read and written.

use thiserror::Error;

/// Core Visage errors
#[derive(Error, Debug)]
pub enum VisageError {
    // Vocabulary errors
    #[error("Unknown facial parameter: {0}")]
    UnknownParam(String),

    // Configuration errors
    #[error("Invalid smoothing factor {0}: must be within (0, 1]")]
    InvalidSmoothingFactor(f32),

    #[error("Invalid frame rate {0}: must be positive and finite")]
    InvalidFrameRate(f32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Persistence errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

/// Result type for Visage operations
pub type VisageResult<T> = Result<T, VisageError>;
