//! Error types for tree access, navigation and search.

use thiserror::Error;

use crate::{NodeId, NodeKind};

/// Failures surfaced by tree accessors, cursors and traversals.
///
/// None of these are fatal: each is reported to the immediate caller, which
/// decides whether to recover (for example by supplying a fallback value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// A tag, attribute or child was read or written on a node that has
    /// none (Text or Comment).
    #[error("{kind} node has no tag or children")]
    NotATagHolder {
        /// Kind of the offending node.
        kind: NodeKind,
    },

    /// A child index was outside the container's child sequence.
    #[error("child index {index} out of range for node with {len} children")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of children the container has.
        len: usize,
    },

    /// Sibling navigation left the parent's child sequence, or the cursor
    /// has no parent at all.
    #[error("no sibling at offset {offset} from position {position}")]
    NoSuchSibling {
        /// Position of the cursor among its siblings (0 at the root).
        position: usize,
        /// Requested relative offset.
        offset: isize,
    },

    /// A search was exhausted before producing a required match.
    #[error("no matching node")]
    NoMatch,

    /// The id does not refer to a node of this tree.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
}
