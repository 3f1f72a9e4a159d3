//! Transaction Trace Studio
//!
//! Replays a single blockchain transaction against a forked copy of chain
//! state and turns the tracer's tree-formatted text into a structured,
//! navigable model: overview, transaction info, gas details, events and
//! an ordered call list that rebuilds into a call tree.
//!
//! This crate provides the core implementation for the `tx-trace` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! tx-trace debug --tx 0x… --rpc https://… --block 19000000 --summary
//! tx-trace parse --input trace.txt --output trace.json
//! ```
//!
//! ## Library use
//!
//! ```no_run
//! use tx_trace_studio::aggregator::build_tree;
//! use tx_trace_studio::parser::parse;
//!
//! let raw = std::fs::read_to_string("trace.txt").unwrap();
//! let result = parse(&raw).unwrap();
//! let tree = build_tree(result.calls());
//! println!("{} top-level calls", tree.len());
//! ```

pub mod acquisition;
pub mod aggregator;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod parser;
pub mod rpc;
pub mod utils;
