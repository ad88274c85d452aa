//! Programmatic tree construction.
//!
//! ```ignore
//! use tagsift_dom::{DomTree, ElementBuilder, NodeId};
//!
//! let mut tree = DomTree::new();
//! let html = tree.append_built(
//!     NodeId::ROOT,
//!     ElementBuilder::new("html").child(
//!         ElementBuilder::new("body")
//!             .attr("bgcolor", "black")
//!             .text("foo")
//!             .child(ElementBuilder::new("br"))
//!             .child(ElementBuilder::new("p").attr("class", "42").text("bar")),
//!     ),
//! )?;
//! assert_eq!(tree.tag(html).unwrap(), "html");
//! ```

use crate::{AttributesMap, DomError, DomTree, NodeId, NodeType};

/// A detached description of a subtree, materialized by [`DomTree::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    /// An element with its attributes and children.
    Element(ElementBuilder),
    /// A text node.
    Text(String),
    /// A comment node.
    Comment(String),
}

/// Builder for an element and its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBuilder {
    tag_name: String,
    attrs: AttributesMap,
    children: Vec<NodeSpec>,
}

impl ElementBuilder {
    /// Start an element with the given tag.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            attrs: AttributesMap::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute with a value.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attrs.insert(name.to_string(), Some(value.to_string()));
        self
    }

    /// Set an attribute that is present without a value.
    #[must_use]
    pub fn flag(mut self, name: &str) -> Self {
        let _ = self.attrs.insert(name.to_string(), None);
        self
    }

    /// Append a text child.
    #[must_use]
    pub fn text(mut self, data: &str) -> Self {
        self.children.push(NodeSpec::Text(data.to_string()));
        self
    }

    /// Append a comment child.
    #[must_use]
    pub fn comment(mut self, data: &str) -> Self {
        self.children.push(NodeSpec::Comment(data.to_string()));
        self
    }

    /// Append any child.
    #[must_use]
    pub fn child(mut self, child: impl Into<NodeSpec>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl From<ElementBuilder> for NodeSpec {
    fn from(builder: ElementBuilder) -> Self {
        Self::Element(builder)
    }
}

impl From<&str> for NodeSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl DomTree {
    /// Allocate the subtree described by `spec` and return its detached root.
    ///
    /// Nesting depth is limited only by memory.
    pub fn build(&mut self, spec: impl Into<NodeSpec>) -> NodeId {
        let (root, children) = self.alloc_spec(spec.into());
        let mut pending: Vec<(NodeId, std::vec::IntoIter<NodeSpec>)> =
            children.map(|children| (root, children)).into_iter().collect();

        while let Some((parent, children)) = pending.last_mut() {
            let parent = *parent;
            let Some(child) = children.next() else {
                let _ = pending.pop();
                continue;
            };
            let (id, grandchildren) = self.alloc_spec(child);
            if let Some(node) = self.get_mut(parent) {
                node.children.push(id);
            }
            if let Some(grandchildren) = grandchildren {
                pending.push((id, grandchildren));
            }
        }
        root
    }

    /// Allocate one node of `spec`, handing back its unbuilt children.
    fn alloc_spec(&mut self, spec: NodeSpec) -> (NodeId, Option<std::vec::IntoIter<NodeSpec>>) {
        match spec {
            NodeSpec::Text(data) => (self.alloc(NodeType::Text(data)), None),
            NodeSpec::Comment(data) => (self.alloc(NodeType::Comment(data)), None),
            NodeSpec::Element(builder) => {
                let id = self.create_element(&builder.tag_name, builder.attrs);
                (id, Some(builder.children.into_iter()))
            }
        }
    }

    /// Build `spec` and append it as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotATagHolder`] if `parent` is a Text or Comment
    /// node, or [`DomError::UnknownNode`] if it does not exist. Nothing is
    /// allocated in either case.
    pub fn append_built(
        &mut self,
        parent: NodeId,
        spec: impl Into<NodeSpec>,
    ) -> Result<NodeId, DomError> {
        if !self.is_container(parent) {
            return Err(self
                .kind(parent)
                .map_or(DomError::UnknownNode(parent), |kind| DomError::NotATagHolder {
                    kind,
                }));
        }
        let id = self.build(spec);
        self.append_child(parent, id)?;
        Ok(id)
    }
}
