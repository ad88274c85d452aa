//! Structural search over tagsift trees.
//!
//! # Scope
//!
//! This crate implements:
//! - **Predicates**: pure, composable boolean tests over nodes
//!   ([`Predicate::by_tag`], [`Predicate::by_attribute`], [`Predicate::all_of`], ...)
//! - **Cursors**: position-aware views of a node that carry the ancestor
//!   chain they were reached through, giving parent and sibling navigation
//!   without back-links in the tree
//! - **Traversal**: a lazy search producing matching cursors, configured by
//!   [`SearchOptions`] (nesting, depth bounds, depth- or breadth-first order)
//!
//! # Example
//!
//! ```ignore
//! use tagsift_query::{Cursor, Predicate, SearchOptions};
//!
//! let start = Cursor::root(tree.root());
//! for link in start.find_all(&tree, Predicate::by_attribute("href"), SearchOptions::new()) {
//!     println!("{:?}", link.attribute(&tree, "href"));
//! }
//! ```
//!
//! Every operation takes the tree explicitly: `&DomTree` to read and
//! `&mut DomTree` to write. A cursor stores ids, never borrows.

/// Position-aware node views with ancestor chains.
pub mod cursor;
/// Composable node predicates.
pub mod predicate;
/// Lazy, configurable tree search.
pub mod traverse;

pub use cursor::Cursor;
pub use predicate::{AttributeMatch, CustomPredicate, Predicate};
pub use traverse::{
    SearchOptions, Traversal, find_all, find_first, match_all, match_first, parents, search,
};
