use pretty_assertions::assert_eq;
use tx_trace_studio::aggregator::{build_tree, flatten, TreeNode};
use tx_trace_studio::parser::{parse, CallNode};

const SWAP_REVERT: &str = include_str!("fixtures/swap_revert.txt");

fn call(index: u32, depth: u32) -> CallNode {
    CallNode {
        index,
        depth,
        signature: format!("C{}::f", index),
        body: Vec::new(),
        raw: format!("C{}::f()", index),
        reverted: false,
        call_type: None,
        gas: None,
        address: None,
    }
}

/// Deterministic depth sequence that only ever opens one level at a time
fn generated_calls(count: u32, seed: u64) -> Vec<CallNode> {
    let mut state = seed;
    let mut depth = 0u32;
    let mut calls = Vec::new();
    for index in 0..count {
        calls.push(call(index, depth));
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let step = (state >> 33) % 3;
        depth = match step {
            0 => depth + 1,
            1 => depth,
            _ => depth.saturating_sub(1 + ((state >> 40) % 3) as u32),
        };
    }
    calls
}

fn assert_depths_monotone(node: &TreeNode) {
    for child in &node.children {
        assert!(
            child.call.depth > node.call.depth,
            "child {} at depth {} under parent {} at depth {}",
            child.call.index,
            child.call.depth,
            node.call.index,
            node.call.depth
        );
        assert_depths_monotone(child);
    }
}

#[test]
fn test_swap_trace_shape() {
    let result = parse(SWAP_REVERT).unwrap();
    let forest = build_tree(result.calls());

    assert_eq!(forest.len(), 1);
    let root = &forest[0];
    assert_eq!(root.size(), 5);
    assert_eq!(
        root.children.iter().map(|c| c.call.index).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(root.children[0].children.is_empty());
    assert_eq!(
        root.children[1]
            .children
            .iter()
            .map(|c| c.call.index)
            .collect::<Vec<_>>(),
        vec![3, 4]
    );
}

#[test]
fn test_sibling_revert_scenario() {
    let raw = "\
  [10000] Root::run()
    ├─ [2000] A::first()
    │   └─ ← [Return]
    ├─ [3000] B::second()
    │   └─ ← [Revert] nope
    └─ ← [Stop]";
    let result = parse(raw).unwrap();
    let forest = build_tree(result.calls());

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].children.len(), 2);
    assert!(!forest[0].children[0].call.reverted);
    assert!(forest[0].children[1].call.reverted);
}

#[test]
fn test_depth_monotone_on_generated_lists() {
    for seed in [1, 7, 42, 1234, 99_999] {
        let calls = generated_calls(200, seed);
        let forest = build_tree(&calls);

        assert_eq!(
            forest.iter().map(TreeNode::size).sum::<usize>(),
            calls.len()
        );
        for root in &forest {
            assert_depths_monotone(root);
        }
    }
}

#[test]
fn test_flatten_restores_index_order() {
    for seed in [3, 11, 2024] {
        let calls = generated_calls(150, seed);
        let forest = build_tree(&calls);

        assert_eq!(flatten(&forest), calls);
    }
}

#[test]
fn test_rebuild_is_idempotent() {
    let result = parse(SWAP_REVERT).unwrap();
    let once = build_tree(result.calls());
    let twice = build_tree(&flatten(&once));

    assert_eq!(once, twice);
}

#[test]
fn test_depth_jump_nests_under_nearest_shallower() {
    let calls = vec![call(0, 0), call(1, 3), call(2, 1)];
    let forest = build_tree(&calls);

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].children.len(), 2);
    assert_eq!(forest[0].children[0].call.index, 1);
    assert_eq!(forest[0].children[1].call.index, 2);
}

#[test]
fn test_several_roots() {
    let calls = vec![call(0, 0), call(1, 1), call(2, 0)];
    let forest = build_tree(&calls);

    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0].size(), 2);
    assert_eq!(forest[1].size(), 1);
}
