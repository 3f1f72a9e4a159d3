//! Call-tree reconstruction and aggregation.
//!
//! This module transforms the flat call list into:
//! - The call hierarchy (shared by every consumer)
//! - Collapsed stack format (for flamegraph generation)
//! - Hot call analysis and gas distribution statistics

pub mod metrics;
pub mod stack_builder;
pub mod tree;

// Re-export main types and functions
pub use metrics::{calculate_gas_distribution, calculate_hot_paths, GasDistribution, HotPath};
pub use stack_builder::{build_collapsed_stacks, total_weight, CollapsedStack};
pub use tree::{build_tree, flatten, TreeNode};
