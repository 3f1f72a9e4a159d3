//! Flat call list to call tree.
//!
//! Single left-to-right pass over the calls in index order, keeping the
//! chain of open ancestors on a stack. A call becomes a child of the
//! nearest open ancestor with a strictly smaller depth, or a root when
//! there is none. Depth jumps of more than one level are nested directly.

use crate::parser::schema::CallNode;
use serde::Serialize;

/// A call plus its direct children, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub call: CallNode,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(call: CallNode) -> Self {
        Self {
            call,
            children: Vec::new(),
        }
    }

    /// Number of calls in this subtree, including this one
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

/// Rebuild the call hierarchy from pre-order calls
///
/// Pure function of its input: every call appears exactly once in the
/// returned forest, and children keep their index order.
pub fn build_tree(calls: &[CallNode]) -> Vec<TreeNode> {
    let mut roots = Vec::new();
    let mut open: Vec<TreeNode> = Vec::new();

    for call in calls {
        while open.last().is_some_and(|top| top.call.depth >= call.depth) {
            close_innermost(&mut open, &mut roots);
        }
        open.push(TreeNode::leaf(call.clone()));
    }
    while !open.is_empty() {
        close_innermost(&mut open, &mut roots);
    }

    roots
}

/// Attach the innermost open node to its parent, or to the roots
fn close_innermost(open: &mut Vec<TreeNode>, roots: &mut Vec<TreeNode>) {
    if let Some(node) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Pre-order call list of a forest
pub fn flatten(forest: &[TreeNode]) -> Vec<CallNode> {
    let mut calls = Vec::with_capacity(forest.iter().map(TreeNode::size).sum());
    for node in forest {
        push_preorder(node, &mut calls);
    }
    calls
}

fn push_preorder(node: &TreeNode, out: &mut Vec<CallNode>) {
    out.push(node.call.clone());
    for child in &node.children {
        push_preorder(child, out);
    }
}
