//! Offline parse of captured tracer output.

use super::models::ParseArgs;
use super::outputs::emit_outputs;
use crate::parser::parse;
use anyhow::{Context, Result};
use log::info;

/// Parse a saved trace text file and produce the requested outputs
///
/// With neither a report path nor `--summary`, the summary is printed.
pub fn execute_parse(mut args: ParseArgs) -> Result<()> {
    info!("Parsing trace text: {}", args.input.display());

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let result = parse(&raw).context("Failed to parse trace text")?;

    if args.output.output_json.is_none() {
        args.output.print_summary = true;
    }
    emit_outputs(result, &args.output)
}
