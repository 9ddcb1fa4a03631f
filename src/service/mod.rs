//! # Services
//!
//! Long-lived protocol actors built on the core wire layer.
//!
//! ## Components
//! - **Auth**: the verifier link — client handle, connection supervisor,
//!   and the live line-correlating connection

pub mod auth;

pub use auth::{AuthClient, AuthTicket};
