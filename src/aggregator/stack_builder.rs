//! Build collapsed stack format from the call tree.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "Router::swap;Pair::swap;Token::transfer 12000"
//! This means: Router::swap called Pair::swap which called Token::transfer,
//! and the transfer frame itself (excluding its own callees) used 12000 gas.

use super::tree::TreeNode;
use log::debug;

/// Label suffix marking a reverted frame
pub const REVERTED_SUFFIX: &str = " [reverted]";

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Self gas of the innermost frame
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Render as a `stack weight` line
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build one collapsed stack per call
///
/// Self gas is the call's gas annotation minus the annotations of its
/// direct children. Calls without an annotation weigh 0. Stacks are
/// returned heaviest first; equal weights keep execution order.
pub fn build_collapsed_stacks(forest: &[TreeNode]) -> Vec<CollapsedStack> {
    let mut stacks = Vec::new();
    let mut path = Vec::new();
    for node in forest {
        collect(node, &mut path, &mut stacks);
    }

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight));
    debug!("Built {} collapsed stacks", stacks.len());
    stacks
}

fn collect(node: &TreeNode, path: &mut Vec<String>, out: &mut Vec<CollapsedStack>) {
    path.push(frame_label(node));

    let children_gas: u64 = node
        .children
        .iter()
        .map(|child| child.call.gas.unwrap_or(0))
        .fold(0, u64::saturating_add);
    let self_gas = node.call.gas.unwrap_or(0).saturating_sub(children_gas);
    out.push(CollapsedStack::new(path.join(";"), self_gas));

    for child in &node.children {
        collect(child, path, out);
    }
    path.pop();
}

/// Frame name: signature head without separators, marked when reverted
fn frame_label(node: &TreeNode) -> String {
    let name = node.call.signature.replace(';', ",");
    if node.call.reverted {
        format!("{}{}", name, REVERTED_SUFFIX)
    } else {
        name
    }
}

/// Sum of all stack weights, saturating at `u64::MAX`
pub fn total_weight(stacks: &[CollapsedStack]) -> u64 {
    stacks.iter().map(|s| s.weight).fold(0, u64::saturating_add)
}
