//! Document - Main entry point for DOM operations
//!
//! Wraps a `DomArena` whose root is a `#document` node and exposes the
//! lookups a page script relies on:
//! - `getElementById` / `querySelector` / `querySelectorAll`
//! - element construction and insertion
//! - `textContent`, `innerHTML`, inline style and attribute access

use crate::arena::DomArena;
use crate::error::Result;
use crate::parser::parse_fragment;
use crate::selector::Selector;
use crate::serializer::DomSerializer;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for a document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Pre-allocated node slots
    pub initial_capacity: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
        }
    }
}

/// A live document tree
#[derive(Debug)]
pub struct Document {
    arena: DomArena,
    root: NodeId,
}

impl Document {
    /// Create an empty document (just the `#document` node)
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        let mut arena = DomArena::with_capacity(config.initial_capacity);
        let root = arena.add_root(DomNode::new(0, NodeType::Document, "#document".to_string()));
        Self { arena, root }
    }

    /// Parse a full page
    pub fn from_html(markup: &str) -> Result<Self> {
        Self::from_html_with_config(markup, DocumentConfig::default())
    }

    pub fn from_html_with_config(markup: &str, config: DocumentConfig) -> Result<Self> {
        let mut document = Self::with_config(config);
        parse_fragment(&mut document.arena, document.root, markup)?;
        Ok(document)
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// The `#document` node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Mutation revision of the underlying arena
    pub fn revision(&self) -> u64 {
        self.arena.revision()
    }

    /// First `<body>` element, if any
    pub fn body(&self) -> Option<NodeId> {
        self.arena.find_by_tag("body").first().copied()
    }

    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.arena.get(node_id)
    }

    /// `document.getElementById`
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.arena.find_by_id(id)
    }

    /// `document.querySelector`
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        if let Some(id) = selector.id_only() {
            return Ok(self.get_element_by_id(id));
        }
        Ok(self
            .arena
            .find_one(|node| node.is_element() && selector.matches(&self.arena, node.node_id)))
    }

    /// `document.querySelectorAll`, in tree order
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .arena
            .find(|node| node.is_element() && selector.matches(&self.arena, node.node_id)))
    }

    /// `document.createElement` (detached until appended)
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.create_element(tag)
    }

    /// `parent.appendChild(child)`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.arena.append_child(parent, child)
    }

    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        self.arena.text_content(node_id)
    }

    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        self.arena.set_text_content(node_id, text)
    }

    /// `element.innerHTML = markup`
    pub fn set_inner_html(&mut self, node_id: NodeId, markup: &str) -> Result<()> {
        self.arena.remove_children(node_id)?;
        parse_fragment(&mut self.arena, node_id, markup)?;
        Ok(())
    }

    pub fn inner_html(&self, node_id: NodeId) -> Result<String> {
        DomSerializer::new().inner_html(&self.arena, node_id)
    }

    pub fn outer_html(&self, node_id: NodeId) -> Result<String> {
        DomSerializer::new().outer_html(&self.arena, node_id)
    }

    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        self.arena.set_attribute(node_id, name, value)
    }

    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Result<Option<String>> {
        self.arena.get_attribute(node_id, name)
    }

    pub fn set_style(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        self.arena.set_style(node_id, property, value)
    }

    pub fn style(&self, node_id: NodeId, property: &str) -> Result<Option<&str>> {
        self.arena.style(node_id, property)
    }

    /// `element.value` for form controls
    ///
    /// A `<textarea>` reads its text, an `<option>` falls back to its text,
    /// a `<select>` reads its selected (or first) option, `input`/`button`
    /// read the `value` attribute. Anything else has no value and reads as
    /// empty.
    pub fn value(&self, node_id: NodeId) -> Result<String> {
        let node = self.arena.get(node_id)?;
        if !node.is_element() {
            return Ok(String::new());
        }
        match node.node_name.as_str() {
            "textarea" => self.arena.text_content(node_id),
            "option" => match node.attr("value") {
                Some(value) => Ok(value.to_string()),
                None => self.arena.text_content(node_id),
            },
            "select" => {
                let mut options = Vec::new();
                self.arena.traverse_df(node_id, |node| {
                    if node.is_element() && node.node_name == "option" {
                        options.push((node.node_id, node.attributes.contains_key("selected")));
                    }
                    Ok(())
                })?;
                let chosen = options
                    .iter()
                    .find(|(_, selected)| *selected)
                    .or(options.first());
                match chosen {
                    Some(&(option, _)) => self.value(option),
                    None => Ok(String::new()),
                }
            }
            "input" | "button" => Ok(node.attr("value").unwrap_or("").to_string()),
            _ => Ok(String::new()),
        }
    }

    /// Set `element.value`; a `<textarea>` takes it as its text
    pub fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.arena.get(node_id)?.node_name == "textarea" {
            return self.arena.set_text_content(node_id, value);
        }
        self.arena.set_attribute(node_id, "value", value)
    }

    /// Number of element children
    pub fn child_element_count(&self, node_id: NodeId) -> Result<usize> {
        Ok(self.arena.element_children(node_id)?.len())
    }

    /// JSON snapshot of every node reachable from the root
    pub fn snapshot_json(&self) -> Result<serde_json::Value> {
        let mut nodes = Vec::new();
        self.arena.traverse_df(self.root, |node| {
            nodes.push(serde_json::to_value(node)?);
            Ok(())
        })?;
        Ok(serde_json::Value::Array(nodes))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
