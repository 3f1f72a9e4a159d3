use tempfile::tempdir;
use tx_trace_studio::aggregator::{build_collapsed_stacks, build_tree, CollapsedStack};
use tx_trace_studio::flamegraph::{generate_flamegraph, FlamegraphConfig};
use tx_trace_studio::output::write_svg;
use tx_trace_studio::parser::parse;
use tx_trace_studio::utils::FlamegraphError;

const SWAP_REVERT: &str = include_str!("fixtures/swap_revert.txt");

#[test]
fn test_flamegraph_from_swap_trace() {
    let result = parse(SWAP_REVERT).unwrap();
    let stacks = build_collapsed_stacks(&build_tree(result.calls()));
    let config = FlamegraphConfig::new()
        .with_title("Swap <revert>")
        .with_width(800);

    let svg = generate_flamegraph(&stacks, Some(&config)).unwrap();

    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
    assert!(svg.contains(r#"width="800""#));
    assert!(svg.contains("Swap &lt;revert&gt;"));
    assert!(svg.contains("(62564 gas)"));
    assert!(svg.contains("balanceOf"));
    assert!(svg.contains(r#"fill="rgb(220, 20, 60)" class="func""#));
}

#[test]
fn test_flamegraph_needs_gas() {
    let stacks = vec![CollapsedStack::new("A::f".to_string(), 0)];
    let err = generate_flamegraph(&stacks, None).unwrap_err();
    assert!(matches!(err, FlamegraphError::EmptyStacks));

    assert!(matches!(
        generate_flamegraph(&[], None),
        Err(FlamegraphError::EmptyStacks)
    ));
}

#[test]
fn test_creation_frames_are_rendered() {
    let raw = "  [165406] → new Counter@0x5615dEB798BB3E4dFa0139dFa1b3D433Cc23b72f\n    └─ ← [Return] 826 bytes of code";
    let result = parse(raw).unwrap();
    let stacks = build_collapsed_stacks(&build_tree(result.calls()));

    let svg = generate_flamegraph(&stacks, None).unwrap();

    assert!(svg.contains("new Counter@0x5615dEB798BB3E4dFa0139dFa1b3D433Cc23b72f"));
    assert!(svg.contains(r#"fill="rgb(255, 140, 0)" class="func""#));
    assert!(svg.contains("Transaction Gas Profile"));
}

#[test]
fn test_write_svg_creates_parents() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("graphs/swap.svg");

    let result = parse(SWAP_REVERT).unwrap();
    let stacks = build_collapsed_stacks(&build_tree(result.calls()));
    let svg = generate_flamegraph(&stacks, None).unwrap();
    write_svg(&svg, &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), svg);
}
