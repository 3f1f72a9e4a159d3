//! JSON-RPC client for metadata lookups against the forked node.

pub mod client;
pub mod types;

// Re-export main types
pub use client::{normalize_tx_hash, RpcClient};
pub use types::{into_side_channel, RpcLog, RpcReceipt, RpcTransaction};
