//! SVG flamegraph generation for per-call gas.
//!
//! Hand-written SVG renderer:
//! - Frames coloured by outcome (reverted calls stand out, creations too)
//! - Inverted layout (root at bottom)
//! - No external rendering dependency

use crate::aggregator::stack_builder::{CollapsedStack, REVERTED_SUFFIX};
use crate::utils::error::FlamegraphError;
use log::info;
use std::collections::HashMap;

const REVERTED_COLOR: &str = "rgb(220, 20, 60)";
const CREATE_COLOR: &str = "rgb(255, 140, 0)";
const CALL_COLOR: &str = "rgb(70, 130, 180)";
const ROOT_COLOR: &str = "rgb(100, 149, 237)";

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Transaction Gas Profile".to_string(),
            width: 1200,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Internal node structure for building the frame tree
struct Node {
    name: String,
    value: u64,
    children: HashMap<String, Node>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            value: 0,
            children: HashMap::new(),
        }
    }

    fn insert(&mut self, stack: &[&str], value: u64) {
        self.value = self.value.saturating_add(value);
        if let Some((head, tail)) = stack.split_first() {
            let child = self
                .children
                .entry(head.to_string())
                .or_insert_with(|| Node::new(head.to_string()));
            child.insert(tail, value);
        }
    }

    /// Children widest first, ties by name
    fn sorted_children(&self) -> Vec<&Node> {
        let mut children: Vec<&Node> = self.children.values().collect();
        children.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
        children
    }
}

/// Generate an SVG flamegraph from collapsed stacks
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.iter().all(|s| s.weight == 0) {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    let mut root = Node::new("all".to_string());
    for stack in stacks.iter().filter(|s| s.weight > 0) {
        let parts: Vec<&str> = stack.stack.split(';').collect();
        root.insert(&parts, stack.weight);
    }

    let max_depth = calculate_max_depth(&root);
    let width = config.width;
    let height_per_level = 20;
    let graph_height = (max_depth + 1) * height_per_level;
    let legend_height = 80;
    let total_height = graph_height + legend_height;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width, total_height, width, total_height
    ));
    svg.push_str(
        r#"<style>.func { font: 12px sans-serif; } .func:hover { stroke: black; stroke-width: 1; cursor: pointer; opacity: 0.9; }</style>"#,
    );
    svg.push_str(&format!(
        r#"<text x="{}" y="20" font-size="16" text-anchor="middle" font-weight="bold">{}</text>"#,
        width / 2,
        escape_xml(&config.title)
    ));

    let layout = Layout {
        level_height: height_per_level,
        graph_height,
    };
    render_node(&root, 0, 0.0, width as f64, &layout, &mut svg);
    render_legend(&mut svg, graph_height);

    svg.push_str("</svg>");

    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

fn calculate_max_depth(node: &Node) -> usize {
    node.children
        .values()
        .map(|child| calculate_max_depth(child) + 1)
        .max()
        .unwrap_or(0)
}

fn node_color(name: &str, level: usize) -> &'static str {
    if level == 0 {
        ROOT_COLOR
    } else if name.ends_with(REVERTED_SUFFIX) {
        REVERTED_COLOR
    } else if name.starts_with("new ") {
        CREATE_COLOR
    } else {
        CALL_COLOR
    }
}

struct Layout {
    level_height: usize,
    graph_height: usize,
}

fn render_node(node: &Node, level: usize, x: f64, w: f64, layout: &Layout, out: &mut String) {
    if w < 0.5 {
        return;
    }

    let h = layout.level_height;
    let color = node_color(&node.name, level);
    let name = escape_xml(&node.name);

    // Inverted: graph bottom minus level height, plus 30px title margin
    let y = layout.graph_height - ((level + 1) * h) + 30;

    out.push_str(&format!(
        r#"<rect x="{:.2}" y="{}" width="{:.2}" height="{}" fill="{}" class="func"><title>{} ({} gas)</title></rect>"#,
        x, y, w, h, color, name, node.value
    ));

    if w > 35.0 {
        let max_chars = (w / 7.0) as usize;
        let display_name = truncate_label(&node.name, max_chars);
        if !display_name.is_empty() {
            out.push_str(&format!(
                r#"<text x="{:.2}" y="{}" dx="4" dy="14" font-size="12" fill="white" pointer-events="none">{}</text>"#,
                x,
                y,
                escape_xml(&display_name)
            ));
        }
    }

    let mut current_x = x;
    for child in node.sorted_children() {
        let child_w = (child.value as f64 / node.value as f64) * w;
        render_node(child, level + 1, current_x, child_w, layout, out);
        current_x += child_w;
    }
}

fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() > max_chars && max_chars > 3 {
        let head: String = name.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_legend(out: &mut String, graph_height: usize) {
    let legend_y = graph_height + 50;

    out.push_str(&format!(
        r#"<text x="10" y="{}" font-size="14" font-weight="bold">Legend:</text>"#,
        legend_y
    ));

    let items = [
        ("Call", CALL_COLOR),
        ("Create", CREATE_COLOR),
        ("Reverted", REVERTED_COLOR),
    ];

    for (i, (label, color)) in items.iter().enumerate() {
        let x = 80 + (i * 120);
        out.push_str(&format!(
            r#"<rect x="{}" y="{}" width="15" height="15" fill="{}" rx="2"/>"#,
            x,
            legend_y - 12,
            color
        ));
        out.push_str(&format!(
            r#"<text x="{}" y="{}" font-size="12">{}</text>"#,
            x + 20,
            legend_y,
            label
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_colors() {
        assert_eq!(node_color("all", 0), ROOT_COLOR);
        assert_eq!(node_color("B::b [reverted]", 2), REVERTED_COLOR);
        assert_eq!(node_color("new Token@0x01", 1), CREATE_COLOR);
        assert_eq!(node_color("Token::transfer", 1), CALL_COLOR);
    }

    #[test]
    fn test_truncate_label_on_char_boundary() {
        assert_eq!(truncate_label("Router::swap", 40), "Router::swap");
        assert_eq!(truncate_label("ééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
