//! Types for JSON-RPC communication with the forked node.
//!
//! Based on the Ethereum JSON-RPC spec. Quantities arrive as hex strings
//! and are kept as strings here; conversion happens in `into_side_channel`.

use crate::parser::schema::{SideChannel, SideChannelLog};
use crate::utils::format::parse_quantity;
use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: serde_json::Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    pub fn transaction_by_hash(tx_hash: &str, id: u64) -> Self {
        Self::new("eth_getTransactionByHash", serde_json::json!([tx_hash]), id)
    }

    pub fn transaction_receipt(tx_hash: &str, id: u64) -> Self {
        Self::new("eth_getTransactionReceipt", serde_json::json!([tx_hash]), id)
    }
}

/// JSON-RPC 2.0 response structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub jsonrpc: String,
    pub id: u64,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Subset of `eth_getTransactionByHash` the report uses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: Option<String>,
    pub block_number: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub value: Option<String>,
    pub nonce: Option<String>,
    pub gas: Option<String>,
    pub gas_price: Option<String>,
}

/// Subset of `eth_getTransactionReceipt` the report uses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub gas_used: Option<String>,
    pub effective_gas_price: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcLog {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

fn quantity_u64(value: &Option<String>) -> Option<u64> {
    value
        .as_deref()
        .and_then(parse_quantity)
        .and_then(|v| u64::try_from(v).ok())
}

fn quantity_u128(value: &Option<String>) -> Option<u128> {
    value.as_deref().and_then(parse_quantity)
}

/// Merge transaction and receipt into side-channel metadata
pub fn into_side_channel(tx: Option<RpcTransaction>, receipt: Option<RpcReceipt>) -> SideChannel {
    let mut side = SideChannel::default();

    if let Some(tx) = tx {
        side.block_number = quantity_u64(&tx.block_number);
        side.value_wei = quantity_u128(&tx.value);
        side.nonce = quantity_u64(&tx.nonce);
        side.gas_limit = quantity_u64(&tx.gas);
        side.gas_price_wei = quantity_u128(&tx.gas_price);
        side.tx_hash = tx.hash;
        side.from = tx.from;
        side.to = tx.to;
    }

    if let Some(receipt) = receipt {
        side.gas_used = quantity_u64(&receipt.gas_used);
        side.effective_gas_price_wei = quantity_u128(&receipt.effective_gas_price);
        side.logs = receipt
            .logs
            .into_iter()
            .map(|log| SideChannelLog {
                address: log.address,
                topics: log.topics,
                data: log.data,
            })
            .collect();
    }

    side
}
