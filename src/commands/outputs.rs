//! Shared tail of `debug` and `parse`: aggregate, render, write.

use super::models::OutputOptions;
use crate::aggregator::{
    build_collapsed_stacks, build_tree, calculate_gas_distribution, calculate_hot_paths,
    total_weight, HotPath,
};
use crate::flamegraph::generate_flamegraph;
use crate::output::{render_summary, write_report, write_svg};
use crate::parser::schema::{TraceReport, TraceResult};
use anyhow::{Context, Result};
use log::{debug, info, warn};

/// Produce every requested output for a parsed trace
pub fn emit_outputs(result: TraceResult, options: &OutputOptions) -> Result<()> {
    let forest = build_tree(result.calls());
    let stacks = build_collapsed_stacks(&forest);
    let gas_dist = calculate_gas_distribution(&stacks);
    info!("Gas distribution: {}", gas_dist.summary());

    let hot_paths = calculate_hot_paths(&stacks, total_weight(&stacks), options.top_paths);
    for (i, path) in hot_paths.iter().take(3).enumerate() {
        debug!("  {}. {} gas ({:.1}%): {}", i + 1, path.gas, path.percentage, path.stack);
    }

    if let Some(svg_path) = &options.output_svg {
        match generate_flamegraph(&stacks, options.flamegraph_config.as_ref()) {
            Ok(svg) => {
                write_svg(&svg, svg_path).context("Failed to write flamegraph SVG")?;
                info!("✓ Flamegraph written to: {}", svg_path.display());
            }
            Err(e) => warn!("Skipping flamegraph: {} (trace has no gas annotations)", e),
        }
    }

    if options.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("TRACE SUMMARY");
        println!("{}", "=".repeat(80));
        print!("{}", render_summary(&result));
        print_hot_paths(&hot_paths);
        println!("{}", "=".repeat(80));
    }

    if let Some(json_path) = &options.output_json {
        let report = TraceReport::new(result);
        write_report(&report, json_path).context("Failed to write trace report JSON")?;
        info!("✓ Trace report written to: {}", json_path.display());
    }

    Ok(())
}

fn print_hot_paths(hot_paths: &[HotPath]) {
    if hot_paths.is_empty() {
        return;
    }
    println!("\nHot calls (self gas)");
    for path in hot_paths {
        let frame = path.stack.rsplit(';').next().unwrap_or(&path.stack);
        println!("  {:>10} gas {:>6.1}%  {}", path.gas, path.percentage, frame);
    }
}
