//! Trace acquisition: fork the chain, replay the transaction, capture the trace.
//!
//! This module handles:
//! - Validating the request (transaction hash, endpoint, block)
//! - Running the fork as a scoped child process
//! - Running the tracer against the fork under a hard deadline
//! - Best-effort transaction/receipt metadata from the fork

pub mod fork;
pub mod orchestrator;
mod process;
pub mod request;
pub mod tracer;

// Re-export main types
pub use fork::ForkHandle;
pub use orchestrator::{Orchestrator, RawTrace};
pub use request::{is_valid_tx_hash, TraceRequest};
pub use tracer::{TracerOutput, TracerProcess};
