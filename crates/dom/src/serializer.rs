//! DOM Serializer - Convert the tree back to markup
//!
//! This module handles:
//! - `outerHTML` / `innerHTML` style serialization
//! - Deterministic attribute order (sorted by name, `style` last)
//! - An indented outline for logs and debugging

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;
use crate::utils::{
    escape_attr, escape_text, is_escapable_raw_text_tag, is_raw_text_tag, is_void_tag,
};

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    pub include_comments: bool,
    pub max_text_length: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            include_comments: true,
            max_text_length: 200,
        }
    }
}

/// DOM Tree Serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Markup of the node itself and its subtree
    pub fn outer_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.write_nodes(arena, &[node_id], &mut output)?;
        Ok(output)
    }

    /// Markup of the node's children
    pub fn inner_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.write_nodes(arena, &arena.get(node_id)?.children_ids, &mut output)?;
        Ok(output)
    }

    /// Serialize `roots` and their subtrees (iterative, depth is bounded by memory only)
    fn write_nodes(&self, arena: &DomArena, roots: &[NodeId], output: &mut String) -> Result<()> {
        let mut stack: Vec<Step> = roots.iter().rev().map(|&id| Step::Open(id, false)).collect();

        while let Some(step) = stack.pop() {
            let (node_id, raw_text) = match step {
                Step::Open(node_id, raw_text) => (node_id, raw_text),
                Step::Close(node_id) => {
                    output.push_str("</");
                    output.push_str(&arena.get(node_id)?.node_name);
                    output.push('>');
                    continue;
                }
            };
            let node = arena.get(node_id)?;

            match node.node_type {
                NodeType::Element => {
                    output.push('<');
                    output.push_str(&node.node_name);
                    write_attributes(node, output);
                    output.push('>');

                    if is_void_tag(&node.node_name) {
                        continue;
                    }

                    // script/style text is written back verbatim
                    let raw_children = is_raw_text_tag(&node.node_name)
                        && !is_escapable_raw_text_tag(&node.node_name);
                    stack.push(Step::Close(node_id));
                    stack.extend(
                        node.children_ids
                            .iter()
                            .rev()
                            .map(|&child_id| Step::Open(child_id, raw_children)),
                    );
                }
                NodeType::Text if raw_text => output.push_str(&node.node_value),
                NodeType::Text => output.push_str(&escape_text(&node.node_value)),
                NodeType::Comment => {
                    if self.config.include_comments {
                        output.push_str("<!--");
                        output.push_str(&node.node_value);
                        output.push_str("-->");
                    }
                }
                NodeType::Document => {
                    stack.extend(
                        node.children_ids
                            .iter()
                            .rev()
                            .map(|&child_id| Step::Open(child_id, false)),
                    );
                }
            }
        }

        Ok(())
    }

    /// Indented one-node-per-line outline, text capped at `max_text_length`
    pub fn outline(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(1024);
        let mut stack = vec![(node_id, 0usize)];

        while let Some((node_id, depth)) = stack.pop() {
            let node = arena.get(node_id)?;
            let indent = "  ".repeat(depth);

            match node.node_type {
                NodeType::Element => {
                    output.push_str(&indent);
                    output.push('<');
                    output.push_str(&node.node_name);
                    write_attributes(node, &mut output);
                    output.push_str(">\n");

                    stack.extend(node.children_ids.iter().rev().map(|&id| (id, depth + 1)));
                }
                NodeType::Text => {
                    let text = node.node_value.trim();
                    if !text.is_empty() {
                        output.push_str(&indent);
                        output.push_str(&cap_text_length(text, self.config.max_text_length));
                        output.push('\n');
                    }
                }
                NodeType::Comment => {}
                NodeType::Document => {
                    stack.extend(node.children_ids.iter().rev().map(|&id| (id, depth)));
                }
            }
        }

        Ok(output)
    }
}

/// Pending work for the iterative serializer
enum Step {
    /// Write a node; the flag marks text inside script/style
    Open(NodeId, bool),
    /// Write an element's end tag
    Close(NodeId),
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn write_attributes(node: &DomNode, output: &mut String) {
    let mut names: Vec<&String> = node.attributes.keys().collect();
    names.sort();

    for name in names {
        let value = &node.attributes[name];
        output.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
    }

    if !node.style.is_empty() {
        output.push_str(&format!(" style=\"{}\"", escape_attr(&node.style.css_text())));
    }
}

/// Cap text length on a char boundary
pub fn cap_text_length(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fragment;

    fn parse(markup: &str) -> (DomArena, NodeId) {
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::new(0, NodeType::Document, "#document".into()));
        arena.set_root(root).unwrap();
        parse_fragment(&mut arena, root, markup).unwrap();
        (arena, root)
    }

    #[test]
    fn test_outer_html_sorted_attributes_and_style() {
        let (mut arena, _) = parse(r#"<section title="t" class="c">x &lt; y</section>"#);
        let section = arena.find_by_tag("section")[0];
        arena.set_style(section, "padding", "15px").unwrap();

        let html = DomSerializer::new().outer_html(&arena, section).unwrap();
        assert_eq!(
            html,
            r#"<section class="c" title="t" style="padding: 15px;">x &lt; y</section>"#
        );
    }

    #[test]
    fn test_inner_html_void_elements() {
        let (arena, root) = parse("<p>a<br>b</p><input value=\"q\">");
        let html = DomSerializer::new().inner_html(&arena, root).unwrap();
        assert_eq!(html, r#"<p>a<br>b</p><input value="q">"#);
    }

    #[test]
    fn test_outline() {
        let (arena, root) = parse("<main><h3>Dynamic Content</h3></main>");
        let outline = DomSerializer::new().outline(&arena, root).unwrap();
        assert_eq!(outline, "<main>\n  <h3>\n    Dynamic Content\n");
    }

    #[test]
    fn test_script_text_is_not_escaped() {
        let (arena, root) = parse("<script>if (a < b && c) {}</script><p>a &amp; b</p>");
        let html = DomSerializer::new().inner_html(&arena, root).unwrap();
        assert_eq!(html, "<script>if (a < b && c) {}</script><p>a &amp; b</p>");
    }

    #[test]
    fn test_deep_nesting_serializes() {
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::new(0, NodeType::Document, "#document".into()));
        arena.set_root(root).unwrap();

        let mut parent = root;
        for _ in 0..10_000 {
            let div = arena.create_element("div");
            arena.append_child(parent, div).unwrap();
            parent = div;
        }

        let html = DomSerializer::new().inner_html(&arena, root).unwrap();
        assert_eq!(html.len(), 10_000 * "<div></div>".len());
        assert!(html.starts_with("<div><div>"));
        assert!(html.ends_with("</div></div>"));
    }

    #[test]
    fn test_cap_text_length() {
        assert_eq!(cap_text_length("hello", 10), "hello");
        assert_eq!(cap_text_length("hello world", 5), "hello...");
        assert_eq!(cap_text_length("héllo", 2), "hé...");
    }
}
