//! Structured logging setup.
//!
//! The embedding daemon calls [`init`] once at startup; everything in this
//! crate emits through `tracing` and inherits whatever subscriber is
//! installed. Re-initialization returns an error instead of panicking so a
//! host that already installed its own subscriber keeps it.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;

use crate::config::LoggingConfig;
use crate::error::{ProtocolError, Result};

/// Install a global `tracing` subscriber per the logging configuration.
///
/// The configured level is the default; `RUST_LOG` still overrides per
/// target.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.log_level).into())
        .from_env_lossy();

    let result = if config.json_format {
        tracing::subscriber::set_global_default(fmt().json().with_env_filter(filter).finish())
    } else {
        tracing::subscriber::set_global_default(fmt().with_env_filter(filter).finish())
    };

    result.map_err(|e| ProtocolError::ConfigError(format!("failed to install subscriber: {e}")))
}
