use crate::output::read_report;
use crate::parser::schema::Status;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a trace report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating trace report: {}", file_path.display());

    let report = read_report(&file_path)?;
    let result = &report.result;

    if report.version != SCHEMA_VERSION {
        println!(
            "⚠ Schema version {} differs from current {}",
            report.version, SCHEMA_VERSION
        );
    }

    let indices_ok = result
        .calls()
        .iter()
        .enumerate()
        .all(|(i, call)| call.index as usize == i);
    if !indices_ok {
        anyhow::bail!("Call indices are not sequential");
    }

    let status = match result.overview.status {
        Status::Success => "Success",
        Status::Failed => "Failed",
    };

    println!("✓ Valid trace report JSON");
    println!("  Version: {}", report.version);
    println!("  Generated: {}", report.generated_at);
    println!("  Transaction: {}", result.overview.transaction_hash);
    println!("  Status: {}", status);
    println!("  Calls: {}", result.calls().len());
    println!("  Events: {}", result.events.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Transaction Trace Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string              - Schema version (e.g., '1.0.0')");
        println!("  generatedAt: string          - ISO 8601 timestamp");
        println!("  overview: object");
        println!("    status: string             - 'Success' or 'Failed'");
        println!("    transactionHash: string    - Transaction hash or 'N/A'");
        println!("    block: number?             - Block number");
        println!("  transactionInfo: object");
        println!("    from, to?, value, function, nonce: string");
        println!("  gasDetails: object           - Unit-bearing strings, null when absent");
        println!("    gasLimit, gasUsed, gasPrice, effectiveGasPrice, totalCost");
        println!("  events: array");
        println!("    index: number, address: string?, name: string");
        println!("    topics: string[], data: string");
        println!("  callTrace: object");
        println!("    calls: array               - Pre-order call list");
        println!("      index, depth: number");
        println!("      signature, raw: string");
        println!("      reverted: boolean");
        println!("      callType: string?        - CALL, DELEGATECALL, STATICCALL, CREATE, CREATE2");
        println!("      gas: number?, address: string?");
        println!("    raw: string                - Unmodified tracer output");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("tx-trace v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Replays a transaction on a forked chain and turns its trace into a call tree.");
}
