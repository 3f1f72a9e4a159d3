//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while acquiring a raw trace from the fork and tracer
///
/// None of these are retried automatically. The caller decides whether to
/// try again with a different RPC, block or timeout.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Trace acquisition timed out after {0:?}")]
    Timeout(Duration),

    #[error("Trace acquisition was cancelled")]
    Cancelled,

    #[error("Failed to set up fork: {0}")]
    ForkSetupFailed(String),

    #[error("Tracer exited with {}: {excerpt}", exit_code_label(*.code))]
    TracerExited { code: Option<i32>, excerpt: String },

    #[error("Failed to spawn {program}: {source}")]
    ProcessSpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn exit_code_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

/// Errors that can occur during trace text parsing
///
/// Both variants are terminal: no partial result is ever produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Trace text is empty")]
    Empty,

    #[error("No top-level call found in trace text")]
    NoRootCall,
}

/// Errors raised when building a `TraceRequest`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid transaction hash (expected 0x + 64 hex characters): {0}")]
    InvalidTxHash(String),

    #[error("RPC URL cannot be empty")]
    EmptyRpcUrl,
}

/// Errors that can occur during RPC communication
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Method not supported by this RPC endpoint: {0}")]
    MethodNotSupported(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
