//! Calculate hot calls and gas distribution from collapsed stacks.
//!
//! Hot paths are the call stacks whose own frames consume the most gas.

use super::stack_builder::{total_weight, CollapsedStack};
use log::debug;
use serde::{Deserialize, Serialize};

/// A call stack ranked by self gas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPath {
    /// Semicolon-separated call stack
    pub stack: String,

    /// Self gas of the innermost call
    pub gas: u64,

    /// Share of total gas, 0-100
    pub percentage: f64,
}

/// Top `top_n` hot paths, heaviest first
///
/// # Arguments
/// * `stacks` - Collapsed stacks from stack_builder (already sorted)
/// * `total_gas` - Gas the percentages are relative to
/// * `top_n` - Number of paths to return
pub fn calculate_hot_paths(stacks: &[CollapsedStack], total_gas: u64, top_n: usize) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    stacks
        .iter()
        .filter(|stack| stack.weight > 0)
        .take(top_n)
        .map(|stack| create_hot_path(stack, total_gas))
        .collect()
}

fn create_hot_path(stack: &CollapsedStack, total_gas: u64) -> HotPath {
    let percentage = if total_gas > 0 {
        (stack.weight as f64 / total_gas as f64) * 100.0
    } else {
        0.0
    };

    HotPath {
        stack: stack.stack.clone(),
        gas: stack.weight,
        percentage,
    }
}

/// Gas distribution statistics
#[derive(Debug, Clone, Default)]
pub struct GasDistribution {
    /// Total gas across all stacks
    pub total_gas: u64,

    /// Number of stacks
    pub stack_count: usize,

    pub mean_gas_per_stack: u64,
    pub median_gas_per_stack: u64,

    /// Gas consumed by the heaviest 10% of stacks
    pub top_10_percent_gas: u64,

    /// Percentage of total gas in the heaviest 10%
    pub top_10_percent_percentage: f64,
}

pub fn calculate_gas_distribution(stacks: &[CollapsedStack]) -> GasDistribution {
    if stacks.is_empty() {
        return GasDistribution::default();
    }

    let total = total_weight(stacks);
    let count = stacks.len();
    let mean = total / count as u64;

    let mut weights: Vec<u64> = stacks.iter().map(|s| s.weight).collect();
    weights.sort_unstable();
    let median = weights[weights.len() / 2];

    weights.reverse();
    let top_count = (count as f64 * 0.1).ceil() as usize;
    let top_10_percent_gas = weights
        .iter()
        .take(top_count)
        .fold(0, |acc: u64, &w| acc.saturating_add(w));

    GasDistribution {
        total_gas: total,
        stack_count: count,
        mean_gas_per_stack: mean,
        median_gas_per_stack: median,
        top_10_percent_gas,
        top_10_percent_percentage: if total > 0 {
            (top_10_percent_gas as f64 / total as f64) * 100.0
        } else {
            0.0
        },
    }
}

impl GasDistribution {
    /// True if the heaviest 10% of stacks consume more than 80% of gas
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "Total: {} gas | Calls: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.total_gas,
            self.stack_count,
            self.mean_gas_per_stack,
            self.median_gas_per_stack,
            self.top_10_percent_percentage
        )
    }
}
