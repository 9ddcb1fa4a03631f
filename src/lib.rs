//! # Collector Protocol
//!
//! Wire-protocol core for the master side of a distributed
//! network-telemetry collector. Lightweight agents forward observations —
//! authentication challenges, hashed flow statistics, connection-log
//! events — and this crate supplies the two pieces with real protocol
//! state behind them:
//!
//! - **Verifier link** ([`service::auth`]): a single-connection
//!   request/response multiplexer that relays authentication challenges
//!   to a local verifier process, correlates replies positionally, and
//!   survives reconnection and stalled-verifier conditions with a
//!   fail-closed policy.
//! - **Criterion decoding** ([`core`]): fixed-width binary flow keys
//!   (ports, addresses, composites) decoded to canonical display strings,
//!   dispatched by one-byte wire codes through an immutable registry.
//!
//! Plugin dispatch, broadcast scheduling, and persistence live in the
//! embedding daemon; this crate exposes only the protocol seam they need:
//! [`AuthClient`] and [`CriterionRegistry`].
//!
//! ## Example
//! ```no_run
//! use collector_protocol::config::CollectorConfig;
//! use collector_protocol::{AuthClient, CriterionRegistry};
//!
//! # async fn run() {
//! let config = CollectorConfig::default();
//! let auth = AuthClient::spawn(config.auth);
//! let verified = auth.verify("router-7", "c9f2a1", "77e0b3").await;
//!
//! let registry = CriterionRegistry::new();
//! let keys = registry.decode('P', &[0x00, 0x50]).unwrap();
//! assert_eq!(keys, vec!["80"]);
//! # let _ = verified;
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod utils;

pub use crate::core::{Criterion, CriterionRegistry, Direction};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::{AuthRequest, Verdict};
pub use crate::service::{AuthClient, AuthTicket};
