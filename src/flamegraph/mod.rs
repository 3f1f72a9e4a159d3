//! Flamegraph generation from collapsed call stacks.
//!
//! This module converts collapsed stacks into SVG flamegraphs showing
//! where the transaction's gas went, call by call.

pub mod generator;

// Re-export main types
pub use generator::{generate_flamegraph, FlamegraphConfig};
