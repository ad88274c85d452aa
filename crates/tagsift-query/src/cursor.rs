use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use tagsift_dom::{DomError, DomTree, NodeId, NodeKind, TagTable, to_html, to_text};

/// A positional view of one node plus the chain of cursors it was reached through.
///
/// The tree stores no parent or sibling links, so a cursor is what makes
/// upward and sideways navigation possible. Ancestors are shared through
/// [`Rc`], so creating a child cursor is O(1) and the same node can be
/// observed through several cursors with different histories.
///
/// A cursor holds ids only. Every operation takes the tree it was created
/// over; handing it a different tree gives unspecified (but memory-safe)
/// results.
#[derive(Clone)]
pub struct Cursor {
    node: NodeId,
    parent: Option<Rc<Cursor>>,
    position: usize,
    depth: usize,
}

impl Drop for Cursor {
    /// Unlink the ancestor chain one cursor at a time, stopping at the first
    /// ancestor still shared with another cursor.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(rc) = next {
            next = match Rc::try_unwrap(rc) {
                Ok(mut cursor) => cursor.parent.take(),
                Err(_) => None,
            };
        }
    }
}

impl PartialEq for Cursor {
    /// Equal when both view the same node through the same positions.
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        loop {
            if left.node != right.node
                || left.position != right.position
                || left.depth != right.depth
            {
                return false;
            }
            match (&left.parent, &right.parent) {
                (None, None) => return true,
                (Some(l), Some(r)) if Rc::ptr_eq(l, r) => return true,
                (Some(l), Some(r)) => (left, right) = (l.as_ref(), r.as_ref()),
                _ => return false,
            }
        }
    }
}

impl Eq for Cursor {}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("node", &self.node)
            .field("position", &self.position)
            .field("depth", &self.depth)
            .field("path", &self.path())
            .finish()
    }
}

impl Cursor {
    /// A cursor at `node` with no ancestors.
    #[must_use]
    pub const fn root(node: NodeId) -> Self {
        Self {
            node,
            parent: None,
            position: 0,
            depth: 0,
        }
    }

    /// The node this cursor views.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Index of the node among its parent's children (0 at the root).
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Number of ancestors in the chain.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The cursor this one was reached from, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// All ancestors, outermost first.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        let mut chain = Vec::with_capacity(self.depth);
        let mut current = self.parent();
        while let Some(cursor) = current {
            chain.push(cursor.clone());
            current = cursor.parent();
        }
        chain.reverse();
        chain
    }

    /// Child positions leading from the chain's root to this node.
    #[must_use]
    pub fn path(&self) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(cursor) = current {
            if cursor.parent.is_some() {
                path.push(cursor.position);
            }
            current = cursor.parent();
        }
        path.reverse();
        path
    }

    fn descendant(&self, node: NodeId, position: usize) -> Self {
        Self {
            node,
            parent: Some(Rc::new(self.clone())),
            position,
            depth: self.depth + 1,
        }
    }

    /// Cursor at the child `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::IndexOutOfRange`] if there is no such child.
    pub fn child(&self, tree: &DomTree, index: usize) -> Result<Self, DomError> {
        let node = tree.child(self.node, index)?;
        Ok(self.descendant(node, index))
    }

    /// Cursors at every child, in order. Empty for text and comments.
    #[must_use]
    pub fn children(&self, tree: &DomTree) -> Vec<Self> {
        let parent = Rc::new(self.clone());
        tree.children(self.node)
            .iter()
            .enumerate()
            .map(|(position, &node)| Self {
                node,
                parent: Some(Rc::clone(&parent)),
                position,
                depth: self.depth + 1,
            })
            .collect()
    }

    /// Cursors at the children in `range`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::IndexOutOfRange`] if the range reaches past the
    /// last child or is reversed.
    pub fn slice(&self, tree: &DomTree, range: Range<usize>) -> Result<Vec<Self>, DomError> {
        let len = tree.child_count(self.node);
        if range.start > range.end || range.end > len {
            return Err(DomError::IndexOutOfRange {
                index: range.end,
                len,
            });
        }
        let mut children = self.children(tree);
        children.truncate(range.end);
        Ok(children.split_off(range.start))
    }

    /// Raw value of an attribute of the viewed element.
    ///
    /// Attributes are not part of the tree, so this never yields a cursor.
    /// `Some(None)` means the attribute is present without a value.
    #[must_use]
    #[allow(clippy::option_option)]
    pub fn attribute<'t>(&self, tree: &'t DomTree, name: &str) -> Option<Option<&'t str>> {
        tree.get_attribute(self.node, name)
    }

    /// Cursor at the first direct child with tag `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NoMatch`] if no child has that tag.
    pub fn child_by_tag(&self, tree: &DomTree, name: &str) -> Result<Self, DomError> {
        tree.children(self.node)
            .iter()
            .enumerate()
            .find(|&(_, &child)| tree.tag(child).is_ok_and(|tag| tag == name))
            .map(|(index, &child)| self.descendant(child, index))
            .ok_or(DomError::NoMatch)
    }

    /// Follow a dotted path of tags, one [`Cursor::child_by_tag`] step per
    /// segment: `"html.body.title"`. An empty path returns this cursor.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NoMatch`] at the first segment with no matching child.
    pub fn descend(&self, tree: &DomTree, path: &str) -> Result<Self, DomError> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.clone(), |cursor, segment| {
                cursor.child_by_tag(tree, segment)
            })
    }

    /// The sibling `offset` places away from this node.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NoSuchSibling`] at the root or when the target
    /// index falls outside the parent's children.
    pub fn sibling(&self, tree: &DomTree, offset: isize) -> Result<Self, DomError> {
        let no_such_sibling = DomError::NoSuchSibling {
            position: self.position,
            offset,
        };
        let parent = self.parent().ok_or_else(|| no_such_sibling.clone())?;
        let index = self
            .position
            .checked_add_signed(offset)
            .ok_or_else(|| no_such_sibling.clone())?;
        parent.child(tree, index).map_err(|_| no_such_sibling)
    }

    /// The following sibling.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NoSuchSibling`] if this is the last child or the root.
    pub fn next(&self, tree: &DomTree) -> Result<Self, DomError> {
        self.sibling(tree, 1)
    }

    /// The preceding sibling.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NoSuchSibling`] if this is the first child or the root.
    pub fn previous(&self, tree: &DomTree) -> Result<Self, DomError> {
        self.sibling(tree, -1)
    }

    /// Put `node` at child `index` in place of the current child and return
    /// the displaced node.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::IndexOutOfRange`] if there is no such child.
    pub fn set(&self, tree: &mut DomTree, index: usize, node: NodeId) -> Result<NodeId, DomError> {
        tree.replace_child(self.node, index, node)
    }

    /// Delete child `index` by replacing it with an empty text node.
    ///
    /// The child list keeps its length, so positions held by other cursors
    /// over the same parent still point at the same nodes. Returns the
    /// node that was removed.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::IndexOutOfRange`] if there is no such child.
    pub fn delete(&self, tree: &mut DomTree, index: usize) -> Result<NodeId, DomError> {
        let _ = tree.child(self.node, index)?;
        let empty = tree.create_text("");
        tracing::trace!(parent = self.node.0, index, "deleting child through cursor");
        tree.replace_child(self.node, index, empty)
    }

    /// Set an attribute on the viewed element.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotATagHolder`] if the node is not an element.
    pub fn set_attribute(
        &self,
        tree: &mut DomTree,
        name: &str,
        value: Option<String>,
    ) -> Result<(), DomError> {
        tree.set_attribute(self.node, name, value)
    }

    /// Remove an attribute from the viewed element; returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotATagHolder`] if the node is not an element.
    pub fn remove_attribute(&self, tree: &mut DomTree, name: &str) -> Result<bool, DomError> {
        tree.remove_attribute(self.node, name)
    }

    /// Tag of the viewed node.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NotATagHolder`] for text and comments.
    pub fn tag<'t>(&self, tree: &'t DomTree) -> Result<&'t str, DomError> {
        tree.tag(self.node)
    }

    /// String form of the viewed node: a text node is its own payload,
    /// anything else renders as markup.
    #[must_use]
    pub fn render(&self, tree: &DomTree, tags: &TagTable) -> String {
        tree.as_text(self.node)
            .map_or_else(|| to_html(tree, self.node, tags), str::to_string)
    }

    /// Descendant text of the viewed node.
    #[must_use]
    pub fn text(&self, tree: &DomTree, tags: &TagTable) -> String {
        to_text(tree, self.node, tags)
    }

    /// Whether the descendant text contains `needle`.
    #[must_use]
    pub fn contains_text(&self, tree: &DomTree, tags: &TagTable, needle: &str) -> bool {
        self.text(tree, tags).contains(needle)
    }

    /// Whether any descendant (not the node itself) is of `kind`.
    #[must_use]
    pub fn contains_kind(&self, tree: &DomTree, kind: NodeKind) -> bool {
        let mut pending: Vec<NodeId> = tree.children(self.node).to_vec();
        while let Some(id) = pending.pop() {
            if tree.kind(id) == Some(kind) {
                return true;
            }
            pending.extend_from_slice(tree.children(id));
        }
        false
    }
}
