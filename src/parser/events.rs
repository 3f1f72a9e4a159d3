//! Event extraction from `emit` lines and their topic/data sub-lines.

use super::grammar::{EmitOpen, EventField};
use super::schema::{Event, SideChannelLog};
use log::debug;

/// keccak256("Transfer(address,address,uint256)")
const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// keccak256("Approval(address,address,uint256)")
const APPROVAL_TOPIC: &str = "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925";

/// Event under construction while its sub-lines are still arriving
#[derive(Debug, Clone)]
pub(crate) struct EventBuilder {
    /// Index of the owning call
    pub owner: usize,
    name: String,
    topics: Vec<String>,
    data: Option<String>,
}

impl EventBuilder {
    pub fn open(owner: usize, emit: EmitOpen) -> Self {
        match emit {
            EmitOpen::Named(name) => Self {
                owner,
                name,
                topics: Vec::new(),
                data: None,
            },
            EmitOpen::RawTopic0(topic0) => Self {
                owner,
                name: decode_event_name(&topic0),
                topics: vec![topic0],
                data: None,
            },
        }
    }

    pub fn apply(&mut self, field: EventField) {
        match field {
            EventField::Topic(topic) => self.topics.push(topic),
            EventField::Data(data) => self.data = Some(data),
        }
    }

    pub fn finish(self, index: u32, address: Option<String>) -> Event {
        Event {
            index,
            address,
            name: self.name,
            topics: self.topics,
            data: self.data.unwrap_or_else(|| "0x".to_string()),
        }
    }
}

/// Name an undecoded event from its first topic
pub fn decode_event_name(topic0: &str) -> String {
    match topic0.to_ascii_lowercase().as_str() {
        TRANSFER_TOPIC => "Transfer(address,address,uint256)".to_string(),
        APPROVAL_TOPIC => "Approval(address,address,uint256)".to_string(),
        "" | "0x" => "Unknown Event".to_string(),
        other => {
            let short: String = other.chars().take(10).collect();
            format!("Event({}...)", short)
        }
    }
}

/// Fill gaps in text-derived events from receipt logs
///
/// Only applies when both lists have the same length, so that events can
/// be paired by position. Values already present in the text always win.
pub fn enrich_from_logs(events: &mut [Event], logs: &[SideChannelLog]) {
    if logs.is_empty() || logs.len() != events.len() {
        if !logs.is_empty() {
            debug!(
                "Skipping log enrichment: {} events vs {} receipt logs",
                events.len(),
                logs.len()
            );
        }
        return;
    }

    for (event, log) in events.iter_mut().zip(logs) {
        if event.address.is_none() {
            event.address = Some(log.address.clone());
        }
        if event.topics.is_empty() {
            event.topics = log.topics.clone();
        }
        if event.data == "0x" && !log.data.is_empty() {
            event.data = log.data.clone();
        }
    }
}
