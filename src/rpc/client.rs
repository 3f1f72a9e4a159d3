//! HTTP client for JSON-RPC calls against the forked node.

use super::types::{
    into_side_channel, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcReceipt, RpcTransaction,
};
use crate::parser::schema::SideChannel;
use crate::utils::config::DEFAULT_RPC_TIMEOUT;
use crate::utils::error::RpcError;
use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Async JSON-RPC client
pub struct RpcClient {
    client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, RpcError> {
        Self::with_timeout(rpc_url, DEFAULT_RPC_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout
    pub fn with_timeout(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.rpc_url
    }

    /// Send one request; `Ok(None)` when the node answers with a null result
    async fn call<T: DeserializeOwned>(
        &self,
        request: JsonRpcRequest,
        tx_hash: &str,
    ) -> Result<Option<T>, RpcError> {
        debug!("RPC request: {} {}", request.method, request.params);

        let response = self.client.post(&self.rpc_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::InvalidResponse(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }

        let rpc_response: JsonRpcResponse<T> = response.json().await?;
        if rpc_response.id != request.id {
            debug!(
                "Response id {} does not match request id {}",
                rpc_response.id, request.id
            );
        }

        match rpc_response.error {
            Some(error) => Err(map_rpc_error(error, &request.method, tx_hash)),
            None => Ok(rpc_response.result),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub async fn get_transaction(&self, tx_hash: &str) -> Result<RpcTransaction, RpcError> {
        let tx_hash = normalize_tx_hash(tx_hash);
        let request = JsonRpcRequest::transaction_by_hash(&tx_hash, self.next_id());
        let tx = self.call(request, &tx_hash).await?;
        tx.ok_or(RpcError::TransactionNotFound(tx_hash))
    }

    /// Receipt of a mined transaction, `None` while pending
    pub async fn get_receipt(&self, tx_hash: &str) -> Result<Option<RpcReceipt>, RpcError> {
        let tx_hash = normalize_tx_hash(tx_hash);
        let request = JsonRpcRequest::transaction_receipt(&tx_hash, self.next_id());
        self.call(request, &tx_hash).await
    }

    /// Fetch transaction and receipt as side-channel metadata
    ///
    /// The transaction is required; a missing receipt only leaves the
    /// receipt-derived fields empty.
    pub async fn fetch_side_channel(&self, tx_hash: &str) -> Result<SideChannel, RpcError> {
        info!("Fetching transaction metadata for: {}", tx_hash);

        let tx = self.get_transaction(tx_hash).await?;
        let receipt = self.get_receipt(tx_hash).await?;
        if receipt.is_none() {
            debug!("No receipt for {}", tx_hash);
        }

        Ok(into_side_channel(Some(tx), receipt))
    }
}

/// Normalize transaction hash to include 0x prefix
pub fn normalize_tx_hash(tx_hash: &str) -> String {
    if tx_hash.starts_with("0x") {
        tx_hash.to_string()
    } else {
        format!("0x{}", tx_hash)
    }
}

/// Map JSON-RPC error to our error type
fn map_rpc_error(error: JsonRpcError, method: &str, tx_hash: &str) -> RpcError {
    match error.code {
        -32000 if error.message.to_lowercase().contains("not found") => {
            RpcError::TransactionNotFound(tx_hash.to_string())
        }
        -32601 => RpcError::MethodNotSupported(method.to_string()),
        -32000 => RpcError::InvalidResponse(error.message),
        _ => RpcError::InvalidResponse(format!("{}: {}", error.code, error.message)),
    }
}
