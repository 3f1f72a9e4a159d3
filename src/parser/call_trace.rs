//! Tree-text state machine producing the flat call list.
//!
//! The parser is either waiting for the first call signature or inside a
//! call body. A stack of open calls, keyed by depth, decides which call
//! owns each continuation line. A line whose prefix ends in a branch glyph
//! after `n` glyphs belongs to the innermost open call of depth `n - 1` or
//! less; a line prefixed by `n` `│` glyphs only (or by none) belongs to the
//! innermost open call of depth `n` or less. `topic`/`data` lines of an
//! open event always go to the call that emitted it.

use super::events::EventBuilder;
use super::grammar::{classify, owner_depth, split_prefix, LineKind, Signature};
use super::schema::{CallNode, CallType, Event};
use super::summary::{is_summary_line, SummaryBlock};
use log::debug;

/// Non-blank lines of the raw text, partitioned by role
///
/// `preamble`, `tree` and `summary` together hold every non-blank line of
/// the raw text exactly once, in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSections {
    /// Lines before the first call signature (e.g. `Traces:`)
    pub preamble: Vec<String>,
    /// Lines owned by some call
    pub tree: Vec<String>,
    /// Column-0 summary block lines
    pub summary: SummaryBlock,
}

/// Output of the tree pass
#[derive(Debug, Clone)]
pub struct ParsedTree {
    pub calls: Vec<CallNode>,
    pub events: Vec<Event>,
    pub sections: TraceSections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingSignature,
    InBody,
}

#[derive(Debug)]
struct CallBuilder {
    depth: u32,
    signature: String,
    call_type: Option<CallType>,
    gas: Option<u64>,
    address: Option<String>,
    lines: Vec<String>,
}

impl CallBuilder {
    fn new(depth: u32, signature: Signature, line: &str) -> Self {
        Self {
            depth,
            signature: signature.head,
            call_type: signature.call_type,
            gas: signature.gas,
            address: signature.address,
            lines: vec![line.to_string()],
        }
    }

    fn finish(self, index: u32) -> CallNode {
        let raw = self.lines.join("\n");
        let reverted = raw.to_lowercase().contains("revert");
        CallNode {
            index,
            depth: self.depth,
            signature: self.signature,
            body: self.lines.into_iter().skip(1).collect(),
            raw,
            reverted,
            call_type: self.call_type,
            gas: self.gas,
            address: self.address,
        }
    }
}

struct TreeParser {
    state: State,
    calls: Vec<CallBuilder>,
    /// Indices into `calls` of calls that may still own lines
    open: Vec<usize>,
    events: Vec<EventBuilder>,
    open_event: Option<usize>,
    sections: TraceSections,
}

impl TreeParser {
    fn new() -> Self {
        Self {
            state: State::AwaitingSignature,
            calls: Vec::new(),
            open: Vec::new(),
            events: Vec::new(),
            open_event: None,
            sections: TraceSections::default(),
        }
    }

    fn feed(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.open_event = None;
            return;
        }
        if is_summary_line(line) {
            self.open_event = None;
            self.sections.summary.push(line);
            return;
        }

        let (glyphs, content) = split_prefix(line);
        match (self.state, classify(content)) {
            (_, LineKind::Signature(signature)) => self.open_call(glyphs, signature, line),
            (State::AwaitingSignature, _) => self.sections.preamble.push(line.to_string()),
            (State::InBody, kind) => self.absorb(owner_depth(line), kind, line),
        }
    }

    fn open_call(&mut self, depth: u32, signature: Signature, line: &str) {
        while let Some(&top) = self.open.last() {
            if self.calls[top].depth >= depth {
                self.open.pop();
            } else {
                break;
            }
        }

        self.calls.push(CallBuilder::new(depth, signature, line));
        self.open.push(self.calls.len() - 1);
        self.sections.tree.push(line.to_string());
        self.open_event = None;
        self.state = State::InBody;
    }

    fn absorb(&mut self, max_depth: u32, kind: LineKind, line: &str) {
        let owner = match (&kind, self.open_event) {
            (LineKind::EventField(_), Some(event)) => self.events[event].owner,
            _ => self.owner_for(max_depth),
        };
        self.calls[owner].lines.push(line.to_string());
        self.sections.tree.push(line.to_string());

        match kind {
            LineKind::Emit(emit) => {
                self.events.push(EventBuilder::open(owner, emit));
                self.open_event = Some(self.events.len() - 1);
            }
            LineKind::EventField(field) => {
                if let Some(event) = self.open_event {
                    self.events[event].apply(field);
                }
            }
            LineKind::Marker(_) | LineKind::Other | LineKind::Signature(_) => {
                self.open_event = None;
            }
        }
    }

    /// Innermost open call no deeper than `max_depth`
    fn owner_for(&self, max_depth: u32) -> usize {
        self.open
            .iter()
            .rev()
            .copied()
            .find(|&i| self.calls[i].depth <= max_depth)
            // InBody guarantees at least one open call
            .or_else(|| self.open.first().copied())
            .unwrap_or(0)
    }

    fn finish(self) -> ParsedTree {
        let calls: Vec<CallNode> = self
            .calls
            .into_iter()
            .enumerate()
            .map(|(i, builder)| builder.finish(i as u32))
            .collect();

        let events = self
            .events
            .into_iter()
            .enumerate()
            .map(|(i, builder)| {
                let address = calls[builder.owner].address.clone();
                builder.finish(i as u32, address)
            })
            .collect();

        ParsedTree {
            calls,
            events,
            sections: self.sections,
        }
    }
}

/// Run the tree pass over raw tracer text
///
/// Never fails: unrecognised lines are absorbed into the nearest open call
/// (or the preamble before the first call).
pub fn parse_call_tree(raw: &str) -> ParsedTree {
    let mut parser = TreeParser::new();
    for line in raw.lines() {
        parser.feed(line);
    }
    let parsed = parser.finish();

    debug!(
        "Tree pass: {} calls, {} events, {} preamble lines, {} summary lines",
        parsed.calls.len(),
        parsed.events.len(),
        parsed.sections.preamble.len(),
        parsed.sections.summary.lines.len()
    );

    parsed
}
