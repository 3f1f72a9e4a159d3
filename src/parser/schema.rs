//! Structured trace model and the JSON schema written to disk.
//!
//! Field names serialize in camelCase, which is the shape the
//! presentation layer consumes. Schema is versioned through `TraceReport`.

use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Kind of frame, taken from the tracer's bracketed annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallType {
    Call,
    Delegatecall,
    Staticcall,
    Create,
    Create2,
}

impl CallType {
    /// Match an annotation token case-insensitively
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "call" => Some(Self::Call),
            "delegatecall" => Some(Self::Delegatecall),
            "staticcall" => Some(Self::Staticcall),
            "create" => Some(Self::Create),
            "create2" => Some(Self::Create2),
            _ => None,
        }
    }

    pub fn is_create(self) -> bool {
        matches!(self, Self::Create | Self::Create2)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::Delegatecall => "DELEGATECALL",
            Self::Staticcall => "STATICCALL",
            Self::Create => "CREATE",
            Self::Create2 => "CREATE2",
        }
    }
}

/// One frame of the execution call stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallNode {
    /// Position in pre-order execution sequence
    pub index: u32,

    /// Nesting level, 0 for the outermost call
    pub depth: u32,

    /// Display head of the call, up to the first `(`
    pub signature: String,

    /// Lines of `raw` after the signature line
    #[serde(skip)]
    pub body: Vec<String>,

    /// Verbatim text block of this call
    pub raw: String,

    /// True iff `raw` mentions a revert
    pub reverted: bool,

    #[serde(default)]
    pub call_type: Option<CallType>,

    /// Gas annotation of the signature line, when the tracer printed one
    #[serde(default)]
    pub gas: Option<u64>,

    /// Target address of the call, when the signature names one
    #[serde(default)]
    pub address: Option<String>,
}

impl CallNode {
    /// Split `raw` into the body lines (everything after the signature line)
    pub fn body_from_raw(raw: &str) -> Vec<String> {
        raw.lines().skip(1).map(str::to_string).collect()
    }

    /// Last segment of the signature head, e.g. `transfer` for `Token::transfer`
    pub fn function_name(&self) -> &str {
        let head = self.signature.trim();
        head.rsplit("::").next().unwrap_or(head)
    }
}

/// An event lifted out of an `emit` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub index: u32,

    /// Address of the emitting call; null when it could not be resolved
    pub address: Option<String>,

    pub name: String,

    /// Topics in emission order, verbatim
    pub topics: Vec<String>,

    pub data: String,
}

/// Overall outcome of the replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub status: Status,
    pub transaction_hash: String,
    pub block: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    pub from: String,

    /// Absent for contract creation
    pub to: Option<String>,

    pub value: String,
    pub function: String,
    pub nonce: String,
}

/// Gas accounting, kept as the unit-bearing strings the tracer emitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasDetails {
    pub gas_limit: Option<String>,
    pub gas_used: Option<String>,
    pub gas_price: Option<String>,
    pub effective_gas_price: Option<String>,
    pub total_cost: Option<String>,
}

/// Ordered call list plus the untouched trace text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTrace {
    pub calls: Vec<CallNode>,
    pub raw: String,
}

/// Everything the parser derives from one trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResult {
    pub overview: Overview,
    pub transaction_info: TransactionInfo,
    pub gas_details: GasDetails,
    pub events: Vec<Event>,
    pub call_trace: CallTrace,
}

impl TraceResult {
    /// The complete unmodified trace text
    pub fn raw(&self) -> &str {
        &self.call_trace.raw
    }

    pub fn calls(&self) -> &[CallNode] {
        &self.call_trace.calls
    }

    /// Rebuild `body` fields, which are not serialized
    pub fn restore_bodies(&mut self) {
        for call in &mut self.call_trace.calls {
            call.body = CallNode::body_from_raw(&call.raw);
        }
    }
}

/// A receipt log reported by the side channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideChannelLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
}

/// Structured facts gathered next to the trace text
///
/// Everything is optional: the parser never requires any of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideChannel {
    pub tx_hash: Option<String>,
    pub block_number: Option<u64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub value_wei: Option<u128>,
    pub nonce: Option<u64>,
    pub gas_limit: Option<u64>,
    pub gas_price_wei: Option<u128>,
    pub effective_gas_price_wei: Option<u128>,
    pub gas_used: Option<u64>,
    #[serde(default)]
    pub logs: Vec<SideChannelLog>,
}

/// Versioned file wrapper around a `TraceResult`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: String,

    #[serde(flatten)]
    pub result: TraceResult,
}

impl TraceReport {
    pub fn new(result: TraceResult) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_type_tokens() {
        assert_eq!(CallType::from_token("DelegateCall"), Some(CallType::Delegatecall));
        assert_eq!(CallType::from_token("create2"), Some(CallType::Create2));
        assert_eq!(CallType::from_token("21000"), None);
        assert!(CallType::Create2.is_create());
        assert!(!CallType::Staticcall.is_create());
    }

    #[test]
    fn test_call_node_json_shape() {
        let node = CallNode {
            index: 0,
            depth: 0,
            signature: "Token::transfer".to_string(),
            body: vec!["└─ ← [Stop]".to_string()],
            raw: "[21000] Token::transfer(0x1, 5)\n└─ ← [Stop]".to_string(),
            reverted: false,
            call_type: Some(CallType::Staticcall),
            gas: Some(21000),
            address: None,
        };

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["callType"], "STATICCALL");
        assert!(value.get("body").is_none());
        assert_eq!(node.function_name(), "transfer");
    }
}
