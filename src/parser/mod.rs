//! Trace text parsing and schema definitions.
//!
//! This module handles:
//! - Splitting raw tracer output into preamble, call tree and summary
//! - Recognising call signatures, events and revert/return markers
//! - Deriving overview, transaction info and gas details
//! - Defining the output schema

pub mod call_trace;
pub mod events;
pub mod grammar;
pub mod schema;
pub mod summary;

// Re-export main types
pub use call_trace::{parse_call_tree, ParsedTree, TraceSections};
pub use schema::{
    CallNode, CallTrace, CallType, Event, GasDetails, Overview, SideChannel, SideChannelLog,
    Status, TraceReport, TraceResult, TransactionInfo,
};

use crate::utils::error::ParseError;
use log::{debug, info};

/// Parse raw tracer text into a `TraceResult`
pub fn parse(raw: &str) -> Result<TraceResult, ParseError> {
    parse_with_side_channel(raw, None)
}

/// Parse raw tracer text, filling gaps from side-channel metadata
///
/// Fails with `Empty` for blank input and `NoRootCall` when no depth-0
/// signature line exists. Everything else is absorbed permissively.
pub fn parse_with_side_channel(
    raw: &str,
    side_channel: Option<&SideChannel>,
) -> Result<TraceResult, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let ParsedTree {
        calls,
        mut events,
        sections,
    } = parse_call_tree(raw);

    let root = calls
        .iter()
        .find(|call| call.depth == 0)
        .ok_or(ParseError::NoRootCall)?;

    if let Some(side) = side_channel {
        events::enrich_from_logs(&mut events, &side.logs);
    }

    let overview = summary::build_overview(root, &sections.summary, side_channel);
    let transaction_info = summary::build_transaction_info(root, &sections.summary, side_channel);
    let gas_details = summary::build_gas_details(&sections.summary, side_channel);

    if !sections.preamble.is_empty() {
        debug!("Ignored {} preamble lines", sections.preamble.len());
    }
    info!(
        "Parsed trace: {} calls, {} events, status {:?}",
        calls.len(),
        events.len(),
        overview.status
    );

    Ok(TraceResult {
        overview,
        transaction_info,
        gas_details,
        events,
        call_trace: CallTrace {
            calls,
            raw: raw.to_string(),
        },
    })
}
