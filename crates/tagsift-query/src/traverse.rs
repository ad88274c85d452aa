//! Lazy tree search.
//!
//! A [`Traversal`] owns a work queue of cursors and nothing else that
//! changes; each call to `next` pops cursors until one matches. The search
//! never fails because of tree shape. It simply ends.
//!
//! Depths are counted from the cursor the search starts at: its children
//! are depth 1. Yielded cursors still carry the start cursor's own
//! ancestors, so [`Cursor::parent`] can climb above where the search began.

use std::collections::VecDeque;

use tagsift_dom::{DomError, DomTree, NodeId};

use crate::{Cursor, Predicate};

/// Parameters of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Keep descending into a node after it matched.
    pub nest: bool,
    /// Shallowest depth that may match. 1 excludes the start node.
    pub min_depth: usize,
    /// Deepest depth that is visited, inclusive.
    pub max_depth: usize,
    /// Visit children before later siblings (otherwise level by level).
    pub depth_first: bool,
}

impl SearchOptions {
    /// Defaults: nesting, depth 1 and deeper, unbounded, depth-first.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nest: true,
            min_depth: 1,
            max_depth: usize::MAX,
            depth_first: true,
        }
    }

    /// Set [`SearchOptions::nest`].
    #[must_use]
    pub const fn nest(mut self, nest: bool) -> Self {
        self.nest = nest;
        self
    }

    /// Set [`SearchOptions::min_depth`].
    #[must_use]
    pub const fn min_depth(mut self, depth: usize) -> Self {
        self.min_depth = depth;
        self
    }

    /// Set [`SearchOptions::max_depth`].
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set [`SearchOptions::depth_first`].
    #[must_use]
    pub const fn depth_first(mut self, depth_first: bool) -> Self {
        self.depth_first = depth_first;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the cursors matching a predicate below a start cursor.
///
/// Finite and not restartable: start a new traversal to search again.
/// Dropping it part way has no effect on the tree.
#[derive(Debug)]
pub struct Traversal<'a> {
    tree: &'a DomTree,
    predicate: Predicate,
    options: SearchOptions,
    base_depth: usize,
    queue: VecDeque<Cursor>,
}

impl<'a> Traversal<'a> {
    /// Start a search below `start`.
    #[must_use]
    pub fn new(
        tree: &'a DomTree,
        start: Cursor,
        predicate: Predicate,
        options: SearchOptions,
    ) -> Self {
        let base_depth = start.depth();
        Self {
            tree,
            predicate,
            options,
            base_depth,
            queue: VecDeque::from([start]),
        }
    }

    fn enqueue_children(&mut self, cursor: &Cursor) {
        let children = cursor.children(self.tree);
        if self.options.depth_first {
            for child in children.into_iter().rev() {
                self.queue.push_front(child);
            }
        } else {
            self.queue.extend(children);
        }
    }
}

impl Iterator for Traversal<'_> {
    type Item = Cursor;

    fn next(&mut self) -> Option<Cursor> {
        while let Some(cursor) = self.queue.pop_front() {
            let depth = cursor.depth() - self.base_depth;
            let matched =
                depth >= self.options.min_depth && self.predicate.matches(self.tree, &cursor);
            let descend = (self.options.nest || !matched)
                && depth < self.options.max_depth
                && self.tree.is_container(cursor.node());
            if descend {
                self.enqueue_children(&cursor);
            }
            if matched {
                tracing::trace!(node = cursor.node().0, depth, "traversal match");
                return Some(cursor);
            }
        }
        None
    }
}

impl Cursor {
    /// All matches below this cursor under `options`.
    #[must_use]
    pub fn find_all<'a>(
        &self,
        tree: &'a DomTree,
        predicate: Predicate,
        options: SearchOptions,
    ) -> Traversal<'a> {
        Traversal::new(tree, self.clone(), predicate, options)
    }

    /// First match with default options.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NoMatch`] if nothing matches.
    pub fn find_first(&self, tree: &DomTree, predicate: Predicate) -> Result<Self, DomError> {
        self.find_all(tree, predicate, SearchOptions::new())
            .next()
            .ok_or(DomError::NoMatch)
    }

    /// First match no deeper than `max_depth`, without descending into matches.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NoMatch`] if nothing matches.
    pub fn search(
        &self,
        tree: &DomTree,
        predicate: Predicate,
        max_depth: usize,
    ) -> Result<Self, DomError> {
        let options = SearchOptions::new().nest(false).max_depth(max_depth);
        self.find_all(tree, predicate, options)
            .next()
            .ok_or(DomError::NoMatch)
    }

    /// Matching direct children.
    #[must_use]
    pub fn match_all<'a>(&self, tree: &'a DomTree, predicate: Predicate) -> Traversal<'a> {
        let options = SearchOptions::new().nest(false).max_depth(1);
        self.find_all(tree, predicate, options)
    }

    /// First matching direct child.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::NoMatch`] if no child matches.
    pub fn match_first(&self, tree: &DomTree, predicate: Predicate) -> Result<Self, DomError> {
        self.match_all(tree, predicate)
            .next()
            .ok_or(DomError::NoMatch)
    }
}

/// [`Cursor::find_all`] from a bare node id.
#[must_use]
pub fn find_all(
    tree: &DomTree,
    start: NodeId,
    predicate: Predicate,
    options: SearchOptions,
) -> Traversal<'_> {
    Cursor::root(start).find_all(tree, predicate, options)
}

/// [`Cursor::find_first`] from a bare node id.
///
/// # Errors
///
/// Returns [`DomError::NoMatch`] if nothing matches.
pub fn find_first(tree: &DomTree, start: NodeId, predicate: Predicate) -> Result<Cursor, DomError> {
    Cursor::root(start).find_first(tree, predicate)
}

/// [`Cursor::search`] from a bare node id.
///
/// # Errors
///
/// Returns [`DomError::NoMatch`] if nothing matches.
pub fn search(
    tree: &DomTree,
    start: NodeId,
    predicate: Predicate,
    max_depth: usize,
) -> Result<Cursor, DomError> {
    Cursor::root(start).search(tree, predicate, max_depth)
}

/// [`Cursor::match_all`] from a bare node id.
#[must_use]
pub fn match_all(tree: &DomTree, start: NodeId, predicate: Predicate) -> Traversal<'_> {
    Cursor::root(start).match_all(tree, predicate)
}

/// [`Cursor::match_first`] from a bare node id.
///
/// # Errors
///
/// Returns [`DomError::NoMatch`] if no child matches.
pub fn match_first(
    tree: &DomTree,
    start: NodeId,
    predicate: Predicate,
) -> Result<Cursor, DomError> {
    Cursor::root(start).match_first(tree, predicate)
}

/// Map each result to its parent cursor, skipping results at a root.
pub fn parents(results: impl IntoIterator<Item = Cursor>) -> impl Iterator<Item = Cursor> {
    results
        .into_iter()
        .filter_map(|cursor| cursor.parent().cloned())
}
