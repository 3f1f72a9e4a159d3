//! Summary extraction: overview, transaction info and gas details.
//!
//! Values come from the tracer's own summary block first (the `Gas used: …`
//! lines printed after the tree), then from the side channel. Anything
//! neither source provides stays absent instead of being guessed.

use super::grammar::{classify, parse_signature, split_prefix, LineKind, Outcome};
use super::schema::{
    CallNode, GasDetails, Overview, SideChannel, Status, TransactionInfo,
};
use crate::utils::format::{format_ether, format_gwei, parse_quantity};
use once_cell::sync::Lazy;
use regex::Regex;

const NOT_AVAILABLE: &str = "N/A";

static SUMMARY_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<key>gas used|gas limit|gas price|effective gas price|total cost|nonce|block number|block|transaction hash|tx hash)\s*:\s*(?P<value>.*\S)\s*$",
    )
    .expect("valid summary field regex")
});

static SUMMARY_STATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^transaction (?:successfully executed|failed)").expect("valid status regex")
});

/// Keys recognised in the summary block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKey {
    GasUsed,
    GasLimit,
    GasPrice,
    EffectiveGasPrice,
    TotalCost,
    Nonce,
    Block,
    TransactionHash,
}

impl SummaryKey {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "gas used" => Some(Self::GasUsed),
            "gas limit" => Some(Self::GasLimit),
            "gas price" => Some(Self::GasPrice),
            "effective gas price" => Some(Self::EffectiveGasPrice),
            "total cost" => Some(Self::TotalCost),
            "nonce" => Some(Self::Nonce),
            "block" | "block number" => Some(Self::Block),
            "transaction hash" | "tx hash" => Some(Self::TransactionHash),
            _ => None,
        }
    }
}

/// Is this a column-0 line of the tracer's summary block?
pub fn is_summary_line(line: &str) -> bool {
    let starts_at_column_zero = line.chars().next().is_some_and(|c| !c.is_whitespace());
    starts_at_column_zero && (SUMMARY_FIELD.is_match(line) || SUMMARY_STATUS.is_match(line))
}

/// Lines of the tracer summary block, kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryBlock {
    pub lines: Vec<String>,
}

impl SummaryBlock {
    pub fn push(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Value of the first line carrying `key`
    pub fn get(&self, key: SummaryKey) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let caps = SUMMARY_FIELD.captures(line)?;
            let found = SummaryKey::from_label(caps.name("key")?.as_str())?;
            (found == key).then(|| caps.name("value").map(|v| v.as_str()))?
        })
    }
}

/// Does the call's own body carry a `← [Revert]` marker?
pub fn has_revert_marker(call: &CallNode) -> bool {
    call.body.iter().any(|line| {
        let (_, content) = split_prefix(line);
        classify(content) == LineKind::Marker(Outcome::Revert)
    })
}

pub fn build_overview(
    root: &CallNode,
    summary: &SummaryBlock,
    side_channel: Option<&SideChannel>,
) -> Overview {
    let status = if has_revert_marker(root) {
        Status::Failed
    } else {
        Status::Success
    };

    let transaction_hash = side_channel
        .and_then(|s| s.tx_hash.clone())
        .or_else(|| summary.get(SummaryKey::TransactionHash).map(str::to_string))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let block = side_channel
        .and_then(|s| s.block_number)
        .or_else(|| {
            summary
                .get(SummaryKey::Block)
                .and_then(parse_quantity)
                .and_then(|b| u64::try_from(b).ok())
        });

    Overview {
        status,
        transaction_hash,
        block,
    }
}

pub fn build_transaction_info(
    root: &CallNode,
    summary: &SummaryBlock,
    side_channel: Option<&SideChannel>,
) -> TransactionInfo {
    let is_creation = root.call_type.is_some_and(|t| t.is_create());
    let signature = root
        .raw
        .lines()
        .next()
        .and_then(|line| parse_signature(split_prefix(line).1));

    let from = side_channel
        .and_then(|s| s.from.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let to = if is_creation {
        None
    } else {
        Some(
            side_channel
                .and_then(|s| s.to.clone())
                .or_else(|| root.address.clone())
                .or_else(|| contract_label(&root.signature))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        )
    };

    let value = signature
        .and_then(|sig| sig.value)
        .map(|raw| parse_quantity(&raw).map(format_ether).unwrap_or(raw))
        .or_else(|| side_channel.and_then(|s| s.value_wei).map(format_ether))
        .unwrap_or_else(|| format_ether(0));

    let function = if is_creation {
        "constructor".to_string()
    } else {
        root.function_name().to_string()
    };

    let nonce = summary
        .get(SummaryKey::Nonce)
        .map(str::to_string)
        .or_else(|| side_channel.and_then(|s| s.nonce).map(|n| n.to_string()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    TransactionInfo {
        from,
        to,
        value,
        function,
        nonce,
    }
}

pub fn build_gas_details(summary: &SummaryBlock, side_channel: Option<&SideChannel>) -> GasDetails {
    let from_summary = |key| summary.get(key).map(str::to_string);

    let gas_used = side_channel.and_then(|s| s.gas_used);
    let effective_price = side_channel.and_then(|s| s.effective_gas_price_wei);

    GasDetails {
        gas_limit: from_summary(SummaryKey::GasLimit)
            .or_else(|| side_channel.and_then(|s| s.gas_limit).map(|g| g.to_string())),
        gas_used: from_summary(SummaryKey::GasUsed).or_else(|| gas_used.map(|g| g.to_string())),
        gas_price: from_summary(SummaryKey::GasPrice)
            .or_else(|| side_channel.and_then(|s| s.gas_price_wei).map(format_gwei)),
        effective_gas_price: from_summary(SummaryKey::EffectiveGasPrice)
            .or_else(|| effective_price.map(format_gwei)),
        total_cost: from_summary(SummaryKey::TotalCost).or_else(|| {
            let (used, price) = (gas_used?, effective_price?);
            Some(format_ether(u128::from(used).saturating_mul(price)))
        }),
    }
}

/// `Token` for `Token::transfer`
fn contract_label(signature: &str) -> Option<String> {
    signature
        .rsplit_once("::")
        .map(|(contract, _)| contract.to_string())
        .filter(|c| !c.is_empty())
}
