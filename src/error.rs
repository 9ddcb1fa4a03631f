//! # Error Types
//!
//! Comprehensive error handling for the collector protocol core.
//!
//! This module defines all error variants that can occur during protocol
//! operations, from low-level I/O errors to wire-format violations.
//!
//! ## Error Categories
//! - **I/O Errors**: Network failures while talking to the verifier
//! - **Decode Errors**: Unknown criterion codes, bad address versions, framing
//! - **Connection Errors**: Verifier connect failures, loss, watchdog aborts
//! - **Configuration Errors**: Invalid or unreadable configuration
//!
//! Decode errors are returned synchronously to the caller of the decode
//! operation. Connection errors never reach authentication submitters as
//! errors; they degrade to a denied (`false`) verdict instead.

use std::io;
use thiserror::Error;

/// Primary error type for all protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown criterion code '{0}'")]
    UnknownCriterion(char),

    #[error("unknown address version byte {0}")]
    UnknownAddressVersion(u8),

    #[error("malformed blob for criterion '{criterion}': {len} bytes is not a multiple of item width {item_len}")]
    MalformedBlob {
        criterion: char,
        len: usize,
        item_len: usize,
    },

    #[error("item for criterion '{criterion}' has {len} bytes, expected {item_len}")]
    TruncatedItem {
        criterion: char,
        len: usize,
        item_len: usize,
    },

    #[error("failed to connect to verifier: {0}")]
    ConnectionFailed(String),

    #[error("connection to verifier lost")]
    ConnectionLost,

    #[error("no reply activity within the watchdog bound")]
    WatchdogTimeout,

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("line framing error: {0}")]
    Framing(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<tokio_util::codec::LinesCodecError> for ProtocolError {
    fn from(err: tokio_util::codec::LinesCodecError) -> Self {
        match err {
            tokio_util::codec::LinesCodecError::Io(e) => ProtocolError::Io(e),
            other => ProtocolError::Framing(other.to_string()),
        }
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
