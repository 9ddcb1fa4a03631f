//! # Core Wire Format
//!
//! Fixed-width flow-key decoding, and the code registry plugins use to
//! reach it.
//!
//! ## Components
//! - **Criterion**: per-code decoders for ports, addresses, and composites
//! - **Registry**: one-byte wire code to decoder lookup
//!
//! ## Wire Format
//! ```text
//! [Code(1)] configuration entries; data blobs: [Item(width)] * N
//! ```
//!
//! Every criterion has a fixed per-instance width, so concatenated
//! instances split without length prefixes. A blob whose length is not a
//! multiple of the width is rejected rather than truncated.

pub mod criterion;
pub mod registry;

pub use criterion::{Criterion, Direction};
pub use registry::CriterionRegistry;
