//! Line grammar of the tree-formatted tracer output.
//!
//! Every line is split into a tree prefix (whitespace and box-drawing
//! glyphs) and its content. The content is then classified as a call
//! signature, an event emission, an event sub-field, a return/revert
//! marker, or anything else.
//!
//! ```text
//!   [24523] 0xA0b8…eB48::transfer(0x…, 100) [call]
//!     ├─ emit Transfer(from: 0x…, to: 0x…, value: 100)
//!     │     topic 0: 0xddf252ad…
//!     │        data: 0x…
//!     └─ ← [Return] true
//! ```

use super::schema::CallType;
use once_cell::sync::Lazy;
use regex::Regex;

/// `[12345]` in front of the call
static GAS_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\d+)\]\s*").expect("valid gas prefix regex"));

/// `Name::fn{value: 1}(args) [annotations]`
static CALL_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<head>[\w$][\w$.:@\-]*)(?:\{(?P<opts>[^}]*)\})?\((?P<args>.*)\)(?P<rest>.*)$")
        .expect("valid call signature regex")
});

/// `new Name@0x…` contract creation
static CREATE_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^new\s+(?P<name>[^\s@(\[]+)(?:@(?P<addr>0x[0-9a-fA-F]{40}))?(?P<rest>.*)$")
        .expect("valid create signature regex")
});

static ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]").expect("valid annotation regex"));

static ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"0x[0-9a-fA-F]{40}").expect("valid address regex"));

static VALUE_OPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"value:\s*(?P<value>[^,}\s]+)").expect("valid value regex"));

static EMIT_NAMED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^emit\s+(?P<name>[\w$.:]+)\s*\(").expect("valid emit regex"));

/// Undecoded log, printed as `emit topic 0: 0x…`
static EMIT_RAW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^emit\s+topic\s*0\s*:\s*(?P<hex>0x[0-9a-fA-F]*)").expect("valid raw emit regex")
});

static EVENT_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:topic\s*(?P<n>\d+)|data)\s*:\s*(?P<hex>0x[0-9a-fA-F]*)")
        .expect("valid event field regex")
});

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:←|<-)\s*\[(?P<kw>revert|return|stop)\]").expect("valid marker regex")
});

/// Parsed call-signature line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Display head, e.g. `0xA0b8…::transfer` or `new Token@0x…`
    pub head: String,
    pub call_type: Option<CallType>,
    pub gas: Option<u64>,
    pub address: Option<String>,
    /// Raw `value:` option of the call, if printed
    pub value: Option<String>,
}

/// Opening line of an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOpen {
    Named(String),
    RawTopic0(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventField {
    Topic(String),
    Data(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Revert,
    Return,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Signature(Signature),
    Emit(EmitOpen),
    EventField(EventField),
    Marker(Outcome),
    Other,
}

fn is_tree_glyph(ch: char) -> bool {
    matches!(ch, '│' | '├' | '└')
}

/// Split a line into its glyph count and content
///
/// The prefix is any run of whitespace and box-drawing characters. Each
/// `│`, `├` or `└` counts as one nesting level; `─` only decorates.
pub fn split_prefix(line: &str) -> (u32, &str) {
    let mut glyphs = 0;
    for (i, ch) in line.char_indices() {
        if is_tree_glyph(ch) {
            glyphs += 1;
        } else if ch != '─' && !ch.is_whitespace() {
            return (glyphs, line[i..].trim_end());
        }
    }
    (glyphs, "")
}

/// Deepest call depth that can own a non-signature line
///
/// A prefix ending in a branch (`├`, `└`) hangs the line off a call one
/// level up. A prefix of `│` only is the continuation of an item at the
/// glyph count's own level, such as an event's `topic`/`data` lines.
pub fn owner_depth(line: &str) -> u32 {
    let mut glyphs = 0;
    let mut branch = false;
    for ch in line.chars() {
        if is_tree_glyph(ch) {
            glyphs += 1;
            branch = ch != '│';
        } else if ch != '─' && !ch.is_whitespace() {
            break;
        }
    }
    if branch {
        glyphs - 1
    } else {
        glyphs
    }
}

/// Classify the content of a line (prefix already stripped)
pub fn classify(content: &str) -> LineKind {
    if let Some(caps) = EMIT_RAW.captures(content) {
        return LineKind::Emit(EmitOpen::RawTopic0(caps["hex"].to_string()));
    }
    if let Some(caps) = EMIT_NAMED.captures(content) {
        return LineKind::Emit(EmitOpen::Named(caps["name"].to_string()));
    }
    if let Some(caps) = EVENT_FIELD.captures(content) {
        let hex = caps["hex"].to_string();
        return LineKind::EventField(if caps.name("n").is_some() {
            EventField::Topic(hex)
        } else {
            EventField::Data(hex)
        });
    }
    if let Some(caps) = MARKER.captures(content) {
        let outcome = match caps["kw"].to_ascii_lowercase().as_str() {
            "revert" => Outcome::Revert,
            "return" => Outcome::Return,
            _ => Outcome::Stop,
        };
        return LineKind::Marker(outcome);
    }
    match parse_signature(content) {
        Some(signature) => LineKind::Signature(signature),
        None => LineKind::Other,
    }
}

/// Parse a call-signature line, `None` if the content is not one
pub fn parse_signature(content: &str) -> Option<Signature> {
    let (prefix_gas, rest) = match GAS_PREFIX.captures(content) {
        Some(caps) => (caps[1].parse::<u64>().ok(), &content[caps[0].len()..]),
        None => (None, content),
    };
    let rest = strip_call_arrow(rest);

    if let Some(caps) = CREATE_SIGNATURE.captures(rest) {
        let tail = caps.name("rest").map_or("", |m| m.as_str());
        let head = rest[..rest.len() - tail.len()].trim_end().to_string();
        let (annotated_type, annotated_gas) = scan_annotations(tail);
        return Some(Signature {
            head,
            call_type: Some(annotated_type.unwrap_or(CallType::Create)),
            gas: prefix_gas.or(annotated_gas),
            address: caps.name("addr").map(|m| m.as_str().to_string()),
            value: None,
        });
    }

    let caps = CALL_SIGNATURE.captures(rest)?;
    let head = caps["head"].to_string();
    let (call_type, annotated_gas) = scan_annotations(caps.name("rest").map_or("", |m| m.as_str()));
    let value = caps
        .name("opts")
        .and_then(|opts| VALUE_OPTION.captures(opts.as_str()))
        .map(|v| v["value"].to_string());
    let address = ADDRESS.find(&head).map(|m| m.as_str().to_string());

    Some(Signature {
        head,
        call_type,
        gas: prefix_gas.or(annotated_gas),
        address,
        value,
    })
}

fn strip_call_arrow(text: &str) -> &str {
    text.strip_prefix('→')
        .or_else(|| text.strip_prefix("->"))
        .map(str::trim_start)
        .unwrap_or(text)
}

/// First call-type token and first numeric token among `[…]` annotations
fn scan_annotations(text: &str) -> (Option<CallType>, Option<u64>) {
    let mut call_type = None;
    let mut gas = None;
    for caps in ANNOTATION.captures_iter(text) {
        let token = caps[1].trim();
        if call_type.is_none() {
            call_type = CallType::from_token(token);
        }
        if gas.is_none() {
            gas = token.parse::<u64>().ok();
        }
    }
    (call_type, gas)
}
