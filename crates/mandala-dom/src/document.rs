//! Arena-backed tree of styled nodes.
//!
//! A [`Document`] owns every node it ever created. Detached nodes stay in
//! the arena, so a [`NodeId`] is stable for the life of the document and
//! across clones of it.

use crate::style::{ComputedStyle, Style, Stylesheet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Index of a node inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A handle to a node that remembers which document issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// The node
    pub node: NodeId,
    /// Generation of the issuing document
    pub generation: u64,
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A generic element with a tag name
    Element(String),
    /// An editable multi-line text field
    TextArea {
        /// Current value
        value: String,
        /// Hint shown while empty
        placeholder: String,
    },
    /// A run of text
    Text(String),
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node kind
    pub kind: NodeKind,
    /// Class markers, in authored order
    pub classes: Vec<String>,
    /// Inline style
    pub style: Style,
    /// Extra attributes (`aria-label`, `data-*`)
    pub attrs: BTreeMap<String, String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            classes: Vec::new(),
            style: Style::default(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent node, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Check whether this node carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Check whether this is an editable text field.
    #[must_use]
    pub const fn is_text_area(&self) -> bool {
        matches!(self.kind, NodeKind::TextArea { .. })
    }
}

/// Errors from tree manipulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The id does not belong to this document.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// `child` is not a child of `parent`.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Expected parent
        parent: NodeId,
        /// Offending node
        child: NodeId,
    },

    /// The node has no parent to be replaced in.
    #[error("{0:?} is detached")]
    Detached(NodeId),
}

/// A tree of styled nodes plus the stylesheet that applies to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    stylesheet: Stylesheet,
    generation: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Stylesheet::default())
    }
}

impl Document {
    /// Create an empty document styled by `stylesheet`.
    #[must_use]
    pub fn new(stylesheet: Stylesheet) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            stylesheet,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Identifies this document (and its clones) for [`NodeRef`] checks.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The stylesheet.
    #[must_use]
    pub const fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// The root node, if one was set.
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Make `id` the root.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node(id)?;
        self.root = Some(id);
        Ok(())
    }

    /// Number of nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no node was ever created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::new(NodeKind::Element(tag.to_string())))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(Node::new(NodeKind::Text(text.into())))
    }

    /// Create a detached text area.
    pub fn create_text_area(
        &mut self,
        value: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> NodeId {
        self.push(Node::new(NodeKind::TextArea {
            value: value.into(),
            placeholder: placeholder.into(),
        }))
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        if let Some(old_parent) = self.node_mut(id)?.parent.take() {
            self.node_mut(old_parent)?.children.retain(|c| *c != id);
        }
        Ok(())
    }

    /// Put `new` where `old` is under `parent`, keeping its position.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new: NodeId,
        old: NodeId,
    ) -> Result<(), DomError> {
        self.node(new)?;
        self.detach(new)?;
        let position = self
            .node(parent)?
            .children
            .iter()
            .position(|c| *c == old)
            .ok_or(DomError::NotAChild { parent, child: old })?;
        self.node_mut(parent)?.children[position] = new;
        self.node_mut(old)?.parent = None;
        self.node_mut(new)?.parent = Some(parent);
        Ok(())
    }

    /// Add a class marker.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let node = self.node_mut(id)?;
        if !node.has_class(class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    /// Set an attribute.
    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.node_mut(id)?.attrs.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Read an attribute.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(id.0)?.attrs.get(name).map(String::as_str)
    }

    /// Check whether `id` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if Some(node_id) == self.root {
                return true;
            }
            current = self.nodes.get(node_id.0).and_then(|n| n.parent);
        }
        false
    }

    /// Issue a handle for `id`.
    #[must_use]
    pub const fn node_ref(&self, id: NodeId) -> NodeRef {
        NodeRef {
            node: id,
            generation: self.generation,
        }
    }

    /// Resolve a handle issued by this document to an attached node.
    #[must_use]
    pub fn resolve(&self, handle: NodeRef) -> Option<NodeId> {
        (handle.generation == self.generation && self.is_attached(handle.node))
            .then_some(handle.node)
    }

    /// `from` and all its descendants, in document order.
    #[must_use]
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.0) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// All nodes under `from` (inclusive) that satisfy `pred`.
    pub fn find_all(&self, from: NodeId, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.descendants(from)
            .into_iter()
            .filter(|id| self.nodes.get(id.0).is_some_and(&pred))
            .collect()
    }

    /// First node under `from` (inclusive) carrying `class`.
    #[must_use]
    pub fn query_class(&self, from: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(from)
            .into_iter()
            .find(|id| self.nodes[id.0].has_class(class))
    }

    /// First node under `from` (inclusive) whose attribute `name` equals `value`.
    #[must_use]
    pub fn query_attr(&self, from: NodeId, name: &str, value: &str) -> Option<NodeId> {
        self.descendants(from)
            .into_iter()
            .find(|id| self.attr(*id, name) == Some(value))
    }

    /// Concatenated text of a subtree. Text areas contribute their value.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|d| match &self.nodes[d.0].kind {
                NodeKind::Text(text) | NodeKind::TextArea { value: text, .. } => {
                    Some(text.as_str())
                }
                NodeKind::Element(_) => None,
            })
            .collect()
    }

    /// Resolve the style of a node through the cascade.
    pub fn computed_style(&self, id: NodeId) -> Result<ComputedStyle, DomError> {
        let node = self.node(id)?;
        let mut computed = match node.parent {
            Some(parent) => ComputedStyle::inherit(&self.computed_style(parent)?),
            None => ComputedStyle::default(),
        };
        for rule in self.stylesheet.matching(&node.classes) {
            computed.apply(rule);
        }
        computed.apply(&node.style);
        Ok(computed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Border;

    fn sample() -> (Document, NodeId, [NodeId; 3]) {
        let mut doc = Document::default();
        let root = doc.create_element("div");
        doc.set_root(root).unwrap();
        let a = doc.create_text_area("a", "");
        let b = doc.create_text_area("b", "hint");
        let c = doc.create_text("c");
        for child in [a, b, c] {
            doc.append_child(root, child).unwrap();
        }
        (doc, root, [a, b, c])
    }

    #[test]
    fn test_append_and_descendants_order() {
        let (doc, root, [a, b, c]) = sample();
        assert_eq!(doc.descendants(root), vec![root, a, b, c]);
        assert_eq!(doc.node(a).unwrap().parent(), Some(root));
        assert_eq!(doc.text_content(root), "abc");
    }

    #[test]
    fn test_replace_child_keeps_position() {
        let (mut doc, root, [a, b, c]) = sample();
        let replacement = doc.create_element("div");
        doc.replace_child(root, replacement, b).unwrap();
        assert_eq!(doc.node(root).unwrap().children(), &[a, replacement, c]);
        assert_eq!(doc.node(b).unwrap().parent(), None);
        assert!(!doc.is_attached(b));
        assert!(doc.is_attached(replacement));
    }

    #[test]
    fn test_replace_child_rejects_stranger() {
        let (mut doc, root, _) = sample();
        let stranger = doc.create_element("div");
        let new = doc.create_element("div");
        assert_eq!(
            doc.replace_child(root, new, stranger),
            Err(DomError::NotAChild {
                parent: root,
                child: stranger
            })
        );
    }

    #[test]
    fn test_append_moves_node() {
        let (mut doc, root, [a, ..]) = sample();
        let other = doc.create_element("section");
        doc.append_child(root, other).unwrap();
        doc.append_child(other, a).unwrap();
        assert!(!doc.node(root).unwrap().children().contains(&a));
        assert_eq!(doc.node(a).unwrap().parent(), Some(other));
    }

    #[test]
    fn test_clone_is_independent_and_keeps_ids() {
        let (doc, root, [a, ..]) = sample();
        let mut copy = doc.clone();
        let div = copy.create_element("div");
        copy.replace_child(root, div, a).unwrap();
        assert_eq!(doc.node(root).unwrap().children()[0], a);
        assert_eq!(copy.node(root).unwrap().children()[0], div);
        assert_eq!(copy.generation(), doc.generation());
    }

    #[test]
    fn test_node_ref_resolution() {
        let (doc, _, [a, ..]) = sample();
        let handle = doc.node_ref(a);
        assert_eq!(doc.resolve(handle), Some(a));
        let other = Document::default();
        assert_eq!(other.resolve(handle), None);
        assert_ne!(other.generation(), doc.generation());
    }

    #[test]
    fn test_query_class_and_attr() {
        let (mut doc, root, [_, b, _]) = sample();
        doc.add_class(b, "minor-cell").unwrap();
        doc.add_class(b, "minor-cell").unwrap();
        doc.set_attr(b, "data-cell-index", "1").unwrap();
        assert_eq!(doc.query_class(root, "minor-cell"), Some(b));
        assert_eq!(doc.node(b).unwrap().classes.len(), 1);
        assert_eq!(doc.query_attr(root, "data-cell-index", "1"), Some(b));
        assert_eq!(doc.query_class(root, "missing"), None);
    }

    #[test]
    fn test_computed_style_cascade() {
        let (mut doc, root, [a, _, c]) = sample();
        doc.add_class(a, "minor-cell").unwrap();
        doc.add_class(a, "core-goal").unwrap();
        doc.node_mut(a).unwrap().style = Style {
            background_color: Some("#186429".into()),
            color: Some("white".into()),
            ..Style::default()
        };
        doc.node_mut(root).unwrap().style.color = Some("#333333".into());

        let cell = doc.computed_style(a).unwrap();
        assert_eq!(cell.width, Some(72.0));
        assert_eq!(cell.font_weight, 700);
        assert_eq!(cell.font_size, 14.0);
        assert_eq!(cell.color, "white");
        assert_eq!(cell.background_color, "#186429");
        assert_eq!(cell.border, Border::solid(1.0, "#dee2e6"));

        // text inherits from root, not from its sibling
        assert_eq!(doc.computed_style(c).unwrap().color, "#333333");
    }

    #[test]
    fn test_unknown_node() {
        let doc = Document::default();
        assert!(matches!(
            doc.computed_style(NodeId(3)),
            Err(DomError::UnknownNode(_))
        ));
    }
}
