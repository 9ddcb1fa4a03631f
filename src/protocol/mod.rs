//! # Verifier Protocol
//!
//! Line grammar of the authentication relay: request serialization,
//! reply classification, and the request type whose resolution is
//! guaranteed exactly once.

pub mod message;

pub use message::{AuthRequest, Verdict};
