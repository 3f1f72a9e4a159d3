//! Plain-text output: raw tracer dumps and human-readable summaries.

use super::prepare_output_path;
use crate::aggregator::tree::{build_tree, TreeNode};
use crate::parser::schema::{Status, TraceResult};
use crate::utils::error::OutputError;
use log::info;
use std::path::Path;

/// Events listed in a summary before the rest is elided
const MAX_SUMMARY_EVENTS: usize = 10;

/// Save the unmodified tracer output
pub fn write_raw_trace(raw: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    prepare_output_path(output_path)?;
    std::fs::write(output_path, raw)?;
    info!("Raw trace written to: {}", output_path.display());
    Ok(())
}

/// Render a trace result as plain text
pub fn render_summary(result: &TraceResult) -> String {
    let mut out = String::new();
    let overview = &result.overview;
    let info = &result.transaction_info;
    let gas = &result.gas_details;

    let status = match overview.status {
        Status::Success => "SUCCESS",
        Status::Failed => "FAILED",
    };
    let block = overview
        .block
        .map_or_else(|| "N/A".to_string(), |b| b.to_string());

    out.push_str(&format!("Transaction {}\n", overview.transaction_hash));
    out.push_str(&format!("  Status:    {}\n", status));
    out.push_str(&format!("  Block:     {}\n", block));
    out.push_str(&format!("  From:      {}\n", info.from));
    out.push_str(&format!(
        "  To:        {}\n",
        info.to.as_deref().unwrap_or("(contract creation)")
    ));
    out.push_str(&format!("  Function:  {}\n", info.function));
    out.push_str(&format!("  Value:     {}\n", info.value));
    out.push_str(&format!("  Nonce:     {}\n", info.nonce));

    out.push_str("\nGas\n");
    let fields = [
        ("Gas limit", &gas.gas_limit),
        ("Gas used", &gas.gas_used),
        ("Gas price", &gas.gas_price),
        ("Effective gas price", &gas.effective_gas_price),
        ("Total cost", &gas.total_cost),
    ];
    for (label, value) in fields {
        out.push_str(&format!(
            "  {:<20} {}\n",
            format!("{}:", label),
            value.as_deref().unwrap_or("-")
        ));
    }

    out.push_str(&format!("\nEvents ({})\n", result.events.len()));
    for event in result.events.iter().take(MAX_SUMMARY_EVENTS) {
        out.push_str(&format!(
            "  #{} {} @ {}\n",
            event.index,
            event.name,
            event.address.as_deref().unwrap_or("unknown")
        ));
    }
    if result.events.len() > MAX_SUMMARY_EVENTS {
        out.push_str(&format!(
            "  ... {} more\n",
            result.events.len() - MAX_SUMMARY_EVENTS
        ));
    }

    out.push_str(&format!("\nCall tree ({} calls)\n", result.calls().len()));
    for node in build_tree(result.calls()) {
        render_node(&node, 0, &mut out);
    }

    out
}

fn render_node(node: &TreeNode, indent: usize, out: &mut String) {
    let call = &node.call;
    let mut line = format!("{}{}", "  ".repeat(indent + 1), call.signature);
    if let Some(call_type) = call.call_type {
        line.push_str(&format!(" [{}]", call_type.as_str()));
    }
    if let Some(gas) = call.gas {
        line.push_str(&format!(" ({} gas)", gas));
    }
    if call.reverted {
        line.push_str(" REVERTED");
    }
    out.push_str(&line);
    out.push('\n');

    for child in &node.children {
        render_node(child, indent + 1, out);
    }
}
