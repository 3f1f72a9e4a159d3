//! Debug command implementation.
//!
//! The debug command:
//! 1. Forks the chain at the requested block and replays the transaction
//! 2. Optionally saves the raw tracer output
//! 3. Parses the trace into the structured model
//! 4. Writes the report, flamegraph and summary

use super::models::DebugArgs;
use super::outputs::emit_outputs;
use crate::acquisition::{Orchestrator, TraceRequest};
use crate::output::write_raw_trace;
use crate::parser::parse_with_side_channel;
use crate::rpc::normalize_tx_hash;
use crate::utils::config::AcquisitionConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Execute the debug command
///
/// `cancel` aborts the acquisition (the CLI wires it to Ctrl-C); the fork
/// and tracer are torn down either way.
///
/// # Errors
/// * Invalid request (hash, endpoint)
/// * Acquisition failures (timeout, fork setup, tracer exit, spawn)
/// * Parse failures (empty output, no top-level call)
/// * File write errors
pub async fn execute_debug(args: DebugArgs, cancel: CancellationToken) -> Result<()> {
    let start_time = Instant::now();

    let request = TraceRequest::new(
        normalize_tx_hash(&args.transaction_hash),
        args.rpc_url.clone(),
        args.block_number,
    )
    .context("Invalid trace request")?;

    info!("Starting debug for transaction: {}", request.tx_hash());
    info!("RPC endpoint: {}", request.rpc_url());

    info!("Step 1/3: Replaying transaction on a fork...");
    let orchestrator = Orchestrator::new(acquisition_config(&args));
    let raw = orchestrator
        .run_with_cancel(&request, cancel)
        .await
        .context("Failed to acquire trace")?;

    if let Some(raw_path) = &args.raw_output {
        write_raw_trace(&raw.text, raw_path).context("Failed to write raw trace")?;
    }
    if !raw.stderr.trim().is_empty() {
        debug!("Tracer stderr:\n{}", raw.stderr);
    }

    info!("Step 2/3: Parsing trace output...");
    let result = parse_with_side_channel(&raw.text, Some(&raw.side_channel))
        .context("Failed to parse tracer output")?;

    info!("Step 3/3: Writing outputs...");
    emit_outputs(result, &args.output)?;

    info!("Debug completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

fn acquisition_config(args: &DebugArgs) -> AcquisitionConfig {
    let mut config = AcquisitionConfig::new()
        .with_timeout(args.timeout)
        .with_metadata(args.fetch_metadata);
    if let Some(program) = &args.fork_program {
        config = config.with_fork_program(program);
    }
    if let Some(program) = &args.tracer_program {
        config = config.with_tracer_program(program);
    }
    config
}

/// Validate debug arguments before anything is spawned
pub fn validate_args(args: &DebugArgs) -> Result<()> {
    if args.rpc_url.trim().is_empty() {
        anyhow::bail!("RPC URL cannot be empty");
    }

    let schemes = ["http://", "https://", "ws://", "wss://"];
    if !schemes.iter().any(|s| args.rpc_url.starts_with(s)) {
        anyhow::bail!("RPC URL must start with http://, https://, ws:// or wss://");
    }

    if args.transaction_hash.is_empty() {
        anyhow::bail!("Transaction hash cannot be empty");
    }

    // Basic hex validation (with or without 0x prefix)
    let tx_hash = args
        .transaction_hash
        .strip_prefix("0x")
        .unwrap_or(&args.transaction_hash);

    if tx_hash.len() != 64 {
        anyhow::bail!("Transaction hash must be 32 bytes (64 hex characters)");
    }

    if !tx_hash.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("Transaction hash contains invalid characters");
    }

    if args.timeout.is_zero() {
        anyhow::bail!("Timeout must be greater than 0");
    }

    if args.output.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    if args.output.top_paths > 1000 {
        anyhow::bail!("top_paths is too large (max 1000)");
    }

    Ok(())
}
