//! HTML node tree for tagsift.
//!
//! This crate provides the arena-based tree that the tolerant parser builds
//! and that cursors and traversals observe.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for child
//! relationships. A node records only its own payload and its ordered child
//! list: there are no parent or sibling back-links. Upward and sideways
//! navigation is the job of a cursor, which carries the ancestor chain it was
//! reached through, so one node can be observed through several independent
//! ancestor chains at once.
//!
//! A node belongs to whichever container lists it among its children. A node
//! removed from its container is detached: it no longer shows up in any walk
//! from the root, but an id still held by a caller keeps observing it for as
//! long as the tree lives.

mod builder;
mod compare;
/// Error types shared by the tree, cursors and traversals.
pub mod error;
/// Rendering the tree to markup, plain text and debug output.
pub mod render;
/// Tag classification table (ordinary, void, suppressed, implicit close).
pub mod tags;

pub use builder::{ElementBuilder, NodeSpec};
pub use error::DomError;
pub use render::{debug_tree, escape_attribute, print_tree, summary, to_html, to_text};
pub use tags::{TagKind, TagTable};

use std::collections::HashMap;

use strum_macros::Display;

/// Map of attribute names to values for an element.
///
/// A `None` value means the attribute is present without a value
/// (`<input disabled>`). Keys are case-sensitive.
pub type AttributesMap = HashMap<String, Option<String>>;

/// A type-safe index into the tree arena.
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A single tree node: its payload plus the ordered ids of its children.
///
/// Only Document and Element nodes ever have children.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is, with its payload.
    pub node_type: NodeType,

    /// Children in document order.
    pub children: Vec<NodeId>,
}

/// The node variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// Synthetic root of a parse result. Behaves like an element whose tag
    /// is the empty string.
    Document,
    /// A tagged node with attributes and ordered children.
    Element(ElementData),
    /// Character data, stored exactly as it appeared in the source.
    Text(String),
    /// Comment data, without the `<!--` / `-->` delimiters.
    Comment(String),
}

impl NodeType {
    /// The payload-free kind of this node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Document => NodeKind::Document,
            Self::Element(_) => NodeKind::Element,
            Self::Text(_) => NodeKind::Text,
            Self::Comment(_) => NodeKind::Comment,
        }
    }
}

/// Node variant without its payload, used in errors and kind predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum NodeKind {
    /// The document root.
    Document,
    /// An element.
    Element,
    /// A text node.
    Text,
    /// A comment node.
    Comment,
}

/// Element-specific data.
///
/// The tag is a first-class field; it is never stored in `attrs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// The element's tag name, lowercase when produced by the parser.
    pub tag_name: String,
    /// The element's attributes.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with no attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: AttributesMap::new(),
        }
    }

    /// Returns the element's id attribute value if present with a value.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").and_then(Option::as_deref)
    }
}

/// Arena-based node tree with O(1) node access.
///
/// All nodes live in a contiguous vector and refer to their children by
/// index. The Document node is always at [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        let document = Node {
            node_type: NodeType::Document,
            children: Vec::new(),
        };
        Self {
            nodes: vec![document],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes allocated in the arena, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (never true: the Document always exists).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            children: Vec::new(),
        });
        id
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag_name: &str, attrs: AttributesMap) -> NodeId {
        self.alloc(NodeType::Element(ElementData {
            tag_name: tag_name.to_string(),
            attrs,
        }))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeType::Text(data.into()))
    }

    /// Allocate a detached comment node.
    pub fn create_comment(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeType::Comment(data.into()))
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.get_mut(id).ok_or(DomError::UnknownNode(id))
    }

    /// Children of a node that may hold them, for mutation.
    fn container_children_mut(&mut self, parent: NodeId) -> Result<&mut Vec<NodeId>, DomError> {
        let node = self.node_mut(parent)?;
        match node.node_type {
            NodeType::Document | NodeType::Element(_) => Ok(&mut node.children),
            ref other => Err(DomError::NotATagHolder { kind: other.kind() }),
        }
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotATagHolder`] if `parent` is a Text or Comment
    /// node, or [`DomError::UnknownNode`] if it does not exist.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.container_children_mut(parent)?.push(child);
        Ok(())
    }

    /// Insert `child` so that it ends up at `index` in `parent`'s children.
    ///
    /// `index` may equal the current child count (append).
    ///
    /// # Errors
    ///
    /// Returns [`DomError::IndexOutOfRange`] if `index` is past the end,
    /// [`DomError::NotATagHolder`] if `parent` is a Text or Comment node, or
    /// [`DomError::UnknownNode`] if `parent` does not exist.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), DomError> {
        let children = self.container_children_mut(parent)?;
        if index > children.len() {
            return Err(DomError::IndexOutOfRange {
                index,
                len: children.len(),
            });
        }
        children.insert(index, child);
        Ok(())
    }

    /// Remove and return the child at `index`, shifting later children left.
    ///
    /// The removed node is detached, not destroyed.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::IndexOutOfRange`] if there is no such child.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId, DomError> {
        let children = &mut self.node_mut(parent)?.children;
        if index >= children.len() {
            return Err(DomError::IndexOutOfRange {
                index,
                len: children.len(),
            });
        }
        Ok(children.remove(index))
    }

    /// Put `child` at `index` in place of the current child, returning the
    /// node it displaced. No other child moves.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::IndexOutOfRange`] if there is no such child.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<NodeId, DomError> {
        let children = &mut self.node_mut(parent)?.children;
        let len = children.len();
        let slot = children
            .get_mut(index)
            .ok_or(DomError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, child))
    }

    /// Get the child of `parent` at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::IndexOutOfRange`] if there is no such child.
    pub fn child(&self, parent: NodeId, index: usize) -> Result<NodeId, DomError> {
        let children = &self.node(parent)?.children;
        children
            .get(index)
            .copied()
            .ok_or(DomError::IndexOutOfRange {
                index,
                len: children.len(),
            })
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Number of children of a node (0 for unknown ids and leaves).
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Reverse the order of a node's children.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnknownNode`] if `id` does not exist.
    pub fn reverse_children(&mut self, id: NodeId) -> Result<(), DomError> {
        self.node_mut(id)?.children.reverse();
        Ok(())
    }

    /// Stable-sort a node's children by structural order (see [`DomTree::compare`]).
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnknownNode`] if `id` does not exist.
    pub fn sort_children(&mut self, id: NodeId) -> Result<(), DomError> {
        let mut children = self.node(id)?.children.clone();
        children.sort_by(|&a, &b| self.compare(a, self, b));
        self.node_mut(id)?.children = children;
        Ok(())
    }

    /// The payload-free kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(|n| n.node_type.kind())
    }

    /// The tag of a node: the element's tag name, or `""` for the Document.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotATagHolder`] for Text and Comment nodes.
    pub fn tag(&self, id: NodeId) -> Result<&str, DomError> {
        match &self.node(id)?.node_type {
            NodeType::Document => Ok(""),
            NodeType::Element(data) => Ok(&data.tag_name),
            other => Err(DomError::NotATagHolder { kind: other.kind() }),
        }
    }

    /// Rename an element.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotATagHolder`] for anything but an Element; the
    /// Document's empty tag is fixed.
    pub fn set_tag(&mut self, id: NodeId, tag_name: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.node_type {
            NodeType::Element(data) => {
                tag_name.clone_into(&mut data.tag_name);
                Ok(())
            }
            other => Err(DomError::NotATagHolder { kind: other.kind() }),
        }
    }

    /// Look up an attribute.
    ///
    /// Returns `None` if the attribute is absent (or the node is not an
    /// element), `Some(None)` if it is present without a value.
    #[must_use]
    #[allow(clippy::option_option)]
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<Option<&str>> {
        self.as_element(id)?.attrs.get(name).map(Option::as_deref)
    }

    /// Whether the element carries the attribute, with or without a value.
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.as_element(id)
            .is_some_and(|data| data.attrs.contains_key(name))
    }

    /// Set (or overwrite) an attribute. `None` stores a valueless attribute.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotATagHolder`] if the node is not an element.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: Option<String>,
    ) -> Result<(), DomError> {
        let data = self.as_element_mut(id)?;
        let _ = data.attrs.insert(name.to_string(), value);
        Ok(())
    }

    /// Remove an attribute. Returns whether it was present; absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotATagHolder`] if the node is not an element.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        let data = self.as_element_mut(id)?;
        Ok(data.attrs.remove(name).is_some())
    }

    /// Attribute names of an element in sorted order (empty for non-elements).
    #[must_use]
    pub fn attribute_names(&self, id: NodeId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .as_element(id)
            .map(|data| data.attrs.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    fn as_element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(id)?.node_type {
            NodeType::Element(data) => Ok(data),
            other => Err(DomError::NotATagHolder { kind: other.kind() }),
        }
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get comment data if this node is a comment.
    #[must_use]
    pub fn as_comment(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Comment(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Whether the node can hold children (Document or Element).
    #[must_use]
    pub fn is_container(&self, id: NodeId) -> bool {
        matches!(
            self.kind(id),
            Some(NodeKind::Document | NodeKind::Element)
        )
    }

    /// Whether the node is itself string-like, i.e. a Text node.
    #[must_use]
    pub fn is_string_like(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Text)
    }

    /// The first Element among the Document's children, if any.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.kind(id) == Some(NodeKind::Element))
            .copied()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
