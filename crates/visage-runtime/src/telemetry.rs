//! Tracing setup
//!
//! `RUST_LOG` wins when set; otherwise the configured directive applies.
//! Logs go to stderr unless configured otherwise, keeping stdout free for
//! tool output.

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use visage_core::{VisageError, VisageResult};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Stderr,
    Stdout,
}

impl LogTarget {
    fn make_writer(self) -> BoxMakeWriter {
        match self {
            LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,

    /// Output format
    pub format: LogFormat,

    /// Output stream
    pub target: LogTarget,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "visage=info".to_string(),
            format: LogFormat::Pretty,
            target: LogTarget::Stderr,
        }
    }
}

impl LogConfig {
    /// Verbose per-frame logging
    pub fn trace() -> Self {
        Self {
            filter: "visage=trace".to_string(),
            ..Self::default()
        }
    }
}

/// Filter for `config`, honoring `RUST_LOG`
pub fn build_filter(config: &LogConfig) -> VisageResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| VisageError::InvalidConfig(format!("log filter {:?}: {e}", config.filter))),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LogConfig) -> VisageResult<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(config.target.make_writer());

    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| VisageError::InvalidConfig(format!("tracing init: {e}")))
}
