//! Arena-based DOM tree storage
//!
//! Nodes live in a single `Vec` and refer to each other by `NodeId`.
//! Nodes are never freed: detaching a subtree only unlinks it, so an id
//! handed out once stays valid for the life of the arena.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```

use crate::error::{DomError, Result};
use crate::types::{DomNode, InlineStyle, NodeId, NodeType};

/// Arena allocator for DOM nodes
///
/// Every mutating call bumps `revision`, which lets callers detect
/// whether an operation touched the tree at all.
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Root node ID (if set)
    root_id: Option<NodeId>,

    /// Mutation counter
    revision: u64,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
            revision: 0,
        }
    }

    /// Add a node to the arena, returns its ID
    ///
    /// The node's own `node_id` is overwritten with its slot index and it
    /// enters detached: links are only ever made through `append_child`.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        node.parent_id = None;
        node.children_ids.clear();
        self.nodes.push(node);
        self.revision += 1;
        node_id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node = DomNode::new(0, NodeType::Element, tag.to_ascii_lowercase());
        self.add_node(node)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Text, "#text".to_string());
        node.node_value = text.to_string();
        self.add_node(node)
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Comment, "#comment".to_string());
        node.node_value = text.to_string();
        self.add_node(node)
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable). Counts as a mutation.
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        let node = self
            .nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))?;
        self.revision += 1;
        Ok(node)
    }

    /// Add a node and make it the root
    pub fn add_root(&mut self, node: DomNode) -> NodeId {
        let node_id = self.add_node(node);
        self.root_id = Some(node_id);
        node_id
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        // Verify node exists
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Current mutation revision
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&DomNode>> {
        let node = self.get(node_id)?;
        node.children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Element children only, in order
    pub fn element_children(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .children(node_id)?
            .into_iter()
            .filter(|child| child.is_element())
            .map(|child| child.node_id)
            .collect())
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Whether `ancestor` is `node_id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node_id: NodeId) -> Result<bool> {
        let mut current = Some(node_id);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent_id;
        }
        Ok(false)
    }

    /// Whether the node is reachable from the root
    pub fn is_connected(&self, node_id: NodeId) -> bool {
        match self.root_id {
            Some(root_id) => self
                .is_inclusive_ancestor(root_id, node_id)
                .unwrap_or(false),
            None => false,
        }
    }

    /// Append `child` as the last child of `parent`
    ///
    /// A child that already has a parent is moved, not copied.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<()> {
        let parent = self.get(parent_id)?;
        if !matches!(parent.node_type, NodeType::Element | NodeType::Document) {
            return Err(DomError::HierarchyRequest(format!(
                "{} node {} cannot have children",
                parent.node_type.name(),
                parent_id
            )));
        }

        let child = self.get(child_id)?;
        if child.node_type == NodeType::Document {
            return Err(DomError::HierarchyRequest(
                "document node cannot be inserted".to_string(),
            ));
        }

        if self.is_inclusive_ancestor(child_id, parent_id)? {
            return Err(DomError::HierarchyRequest(format!(
                "node {} is an ancestor of {}",
                child_id, parent_id
            )));
        }

        self.detach(child_id)?;

        self.get_mut(parent_id)?.children_ids.push(child_id);
        self.get_mut(child_id)?.parent_id = Some(parent_id);
        Ok(())
    }

    /// Unlink a node from its parent (no-op for detached nodes)
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let Some(old_parent) = self.get(node_id)?.parent_id else {
            return Ok(());
        };

        self.get_mut(old_parent)?
            .children_ids
            .retain(|id| *id != node_id);
        self.get_mut(node_id)?.parent_id = None;
        Ok(())
    }

    /// Detach every child of a node
    pub fn remove_children(&mut self, node_id: NodeId) -> Result<()> {
        let children: Vec<NodeId> = self.get(node_id)?.children_ids.to_vec();
        for child_id in children {
            self.detach(child_id)?;
        }
        Ok(())
    }

    /// Concatenated character data of all descendant text nodes
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        let node = self.get(node_id)?;
        if matches!(node.node_type, NodeType::Text | NodeType::Comment) {
            return Ok(node.node_value.clone());
        }

        let mut text = String::new();
        self.traverse_df(node_id, |node| {
            if node.node_type == NodeType::Text {
                text.push_str(&node.node_value);
            }
            Ok(())
        })?;
        Ok(text)
    }

    /// Replace all children with a single text node (none for empty text)
    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        if matches!(self.get(node_id)?.node_type, NodeType::Text | NodeType::Comment) {
            self.get_mut(node_id)?.node_value = text.to_string();
            return Ok(());
        }

        self.remove_children(node_id)?;
        if !text.is_empty() {
            let text_id = self.create_text(text);
            self.append_child(node_id, text_id)?;
        }
        Ok(())
    }

    /// Set an attribute; `style` is routed into the inline style
    pub fn set_attribute(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.element_mut(node_id)?;
        let name = name.to_ascii_lowercase();
        if name == "style" {
            node.style = InlineStyle::parse(value);
        } else {
            node.attributes.insert(name, value.to_string());
        }
        Ok(())
    }

    /// Read an attribute; `style` reads back the serialized inline style
    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Result<Option<String>> {
        let node = self.get(node_id)?;
        let name = name.to_ascii_lowercase();
        if name == "style" {
            if node.style.is_empty() {
                return Ok(None);
            }
            return Ok(Some(node.style.css_text()));
        }
        Ok(node.attr(&name).map(String::from))
    }

    /// Set one inline style property (`element.style.prop = value`)
    pub fn set_style(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        self.element_mut(node_id)?.style.set(property, value);
        Ok(())
    }

    /// Read one inline style property
    pub fn style(&self, node_id: NodeId, property: &str) -> Result<Option<&str>> {
        Ok(self.get(node_id)?.style.get(property))
    }

    fn element_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        let node = self.get(node_id)?;
        if !node.is_element() {
            return Err(DomError::InvalidNodeType {
                expected: NodeType::Element.name().to_string(),
                actual: node.node_type.name().to_string(),
            });
        }
        self.get_mut(node_id)
    }

    /// Traverse tree depth-first (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Traverse tree breadth-first
    pub fn traverse_bf<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(start_id);

        while let Some(node_id) = queue.pop_front() {
            let node = self.get(node_id)?;
            visit(node)?;

            for &child_id in node.children_ids.iter() {
                queue.push_back(child_id);
            }
        }

        Ok(())
    }

    /// Connected nodes in tree order (iterative pre-order walk from the root)
    ///
    /// Nodes enter detached and `append_child` validates both ends, so
    /// every id on the walk resolves.
    fn connected(&self) -> impl Iterator<Item = &DomNode> + '_ {
        let mut stack: Vec<NodeId> = self.root_id.into_iter().collect();
        std::iter::from_fn(move || {
            let node_id = stack.pop()?;
            let node = &self.nodes[node_id as usize];
            stack.extend(node.children_ids.iter().rev().copied());
            Some(node)
        })
    }

    /// Connected nodes matching predicate, in tree order
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.connected()
            .filter(|node| predicate(node))
            .map(|node| node.node_id)
            .collect()
    }

    /// First connected node matching predicate, in tree order
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.connected()
            .find(|node| predicate(node))
            .map(|node| node.node_id)
    }

    /// Find all connected elements by tag name
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find(|node| node.is_element() && node.node_name.eq_ignore_ascii_case(tag))
    }

    /// Find connected element by ID attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_one(|node| node.is_element() && node.attr("id") == Some(id))
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with_root() -> (DomArena, NodeId) {
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::new(
            0,
            NodeType::Document,
            "#document".to_string(),
        ));
        arena.set_root(root).unwrap();
        (arena, root)
    }

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        let id = arena.create_element("DIV");
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "div");
        assert!(matches!(arena.get(42), Err(DomError::NodeNotFound(42))));
    }

    #[test]
    fn test_append_and_text_content() {
        let (mut arena, root) = arena_with_root();
        let div = arena.create_element("div");
        let text = arena.create_text("Run");
        arena.append_child(div, text).unwrap();
        arena.append_child(root, div).unwrap();

        assert_eq!(arena.text_content(div).unwrap(), "Run");
        arena.set_text_content(div, "Clicked!").unwrap();
        assert_eq!(arena.text_content(div).unwrap(), "Clicked!");
        assert_eq!(arena.get(div).unwrap().children_ids.len(), 1);
    }

    #[test]
    fn test_append_moves_existing_child() {
        let (mut arena, root) = arena_with_root();
        let a = arena.create_element("div");
        let b = arena.create_element("div");
        let child = arena.create_element("span");
        arena.append_child(root, a).unwrap();
        arena.append_child(root, b).unwrap();
        arena.append_child(a, child).unwrap();
        arena.append_child(b, child).unwrap();

        assert!(arena.get(a).unwrap().children_ids.is_empty());
        assert_eq!(arena.get(b).unwrap().children_ids.as_slice(), &[child]);
        assert_eq!(arena.get(child).unwrap().parent_id, Some(b));
    }

    #[test]
    fn test_append_rejects_cycle() {
        let (mut arena, root) = arena_with_root();
        let outer = arena.create_element("div");
        let inner = arena.create_element("div");
        arena.append_child(root, outer).unwrap();
        arena.append_child(outer, inner).unwrap();

        let err = arena.append_child(inner, outer).unwrap_err();
        assert!(matches!(err, DomError::HierarchyRequest(_)));
    }

    #[test]
    fn test_find_by_id_ignores_detached() {
        let (mut arena, root) = arena_with_root();
        let detached = arena.create_element("p");
        arena.set_attribute(detached, "id", "x").unwrap();
        assert_eq!(arena.find_by_id("x"), None);

        arena.append_child(root, detached).unwrap();
        assert_eq!(arena.find_by_id("x"), Some(detached));
    }

    #[test]
    fn test_find_walks_whole_tree_in_order() {
        let (mut arena, root) = arena_with_root();
        let outer = arena.create_element("div");
        let inner = arena.create_element("div");
        let tail = arena.create_element("div");
        arena.append_child(root, outer).unwrap();
        arena.append_child(outer, inner).unwrap();
        arena.append_child(root, tail).unwrap();

        assert_eq!(arena.find_by_tag("div"), vec![outer, inner, tail]);
    }

    #[test]
    fn test_add_node_drops_foreign_links() {
        let (mut arena, root) = arena_with_root();
        let mut node = DomNode::new(0, NodeType::Element, "div".to_string());
        node.parent_id = Some(root);
        node.children_ids.push(99);

        let id = arena.add_node(node);
        let added = arena.get(id).unwrap();
        assert_eq!(added.parent_id, None);
        assert!(added.children_ids.is_empty());

        arena.append_child(root, id).unwrap();
        assert_eq!(arena.find_by_tag("div"), vec![id]);
    }

    #[test]
    fn test_style_attribute_round_trip() {
        let (mut arena, root) = arena_with_root();
        let el = arena.create_element("div");
        arena.append_child(root, el).unwrap();
        arena
            .set_attribute(el, "style", "display: none; color: red")
            .unwrap();

        assert_eq!(arena.style(el, "display").unwrap(), Some("none"));
        assert_eq!(
            arena.get_attribute(el, "style").unwrap().as_deref(),
            Some("display: none; color: red;")
        );
    }

    #[test]
    fn test_revision_tracks_mutations() {
        let (mut arena, root) = arena_with_root();
        let before = arena.revision();
        let _ = arena.find_by_id("missing");
        let _ = arena.text_content(root).unwrap();
        assert_eq!(arena.revision(), before);

        let el = arena.create_element("div");
        arena.append_child(root, el).unwrap();
        assert!(arena.revision() > before);
    }

    #[test]
    fn test_traverse_df_order() {
        let (mut arena, root) = arena_with_root();
        let div = arena.create_element("div");
        let first = arena.create_element("span");
        let second = arena.create_element("p");
        arena.append_child(root, div).unwrap();
        arena.append_child(div, first).unwrap();
        arena.append_child(div, second).unwrap();

        let mut visited = Vec::new();
        arena
            .traverse_df(root, |node| {
                visited.push(node.node_name.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["#document", "div", "span", "p"]);
    }

    #[test]
    fn test_traverse_bf_and_connectivity() {
        let (mut arena, root) = arena_with_root();
        let div = arena.create_element("div");
        let span = arena.create_element("span");
        let aside = arena.create_element("aside");
        arena.append_child(root, div).unwrap();
        arena.append_child(div, span).unwrap();
        arena.append_child(root, aside).unwrap();

        let mut visited = Vec::new();
        arena
            .traverse_bf(root, |node| {
                visited.push(node.node_name.clone());
                Ok(())
            })
            .unwrap();
        assert_eq!(visited, vec!["#document", "div", "aside", "span"]);

        assert!(arena.is_connected(span));
        arena.detach(div).unwrap();
        assert!(!arena.is_connected(span));
        assert_eq!(arena.parent(span).unwrap().map(|p| p.node_id), Some(div));
    }
}
