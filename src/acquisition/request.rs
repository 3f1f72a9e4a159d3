//! One debugging attempt: which transaction, which endpoint, which block.

use crate::utils::error::RequestError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable identification of one trace acquisition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRequest {
    tx_hash: String,
    rpc_url: String,
    block_number: u64,
}

impl TraceRequest {
    /// Validate and build a request
    ///
    /// `tx_hash` must be `0x` followed by 64 hex characters. `rpc_url` is
    /// opaque and only has to be non-blank.
    pub fn new(
        tx_hash: impl Into<String>,
        rpc_url: impl Into<String>,
        block_number: u64,
    ) -> Result<Self, RequestError> {
        let tx_hash = tx_hash.into();
        let rpc_url = rpc_url.into();

        if !is_valid_tx_hash(&tx_hash) {
            return Err(RequestError::InvalidTxHash(tx_hash));
        }
        if rpc_url.trim().is_empty() {
            return Err(RequestError::EmptyRpcUrl);
        }

        Ok(Self {
            tx_hash,
            rpc_url,
            block_number,
        })
    }

    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }
}

impl fmt::Display for TraceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ block {}", self.tx_hash, self.block_number)
    }
}

/// `0x` + 64 hex characters
pub fn is_valid_tx_hash(tx_hash: &str) -> bool {
    tx_hash
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
