use std::fmt;
use std::rc::Rc;

use tagsift_dom::{DomTree, NodeKind};

use crate::Cursor;

/// How an attribute predicate compares the attribute's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatch {
    /// The attribute exists, with any value or none.
    Present,
    /// The attribute has exactly this value. A valueless attribute never matches.
    Equals(String),
}

/// A caller-supplied test, shared between clones of the predicate holding it.
///
/// The closure only gets shared access to the tree, so it cannot mutate it.
#[derive(Clone)]
pub struct CustomPredicate(Rc<dyn Fn(&DomTree, &Cursor) -> bool>);

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomPredicate(..)")
    }
}

/// A pure boolean test over a node reached through a cursor.
///
/// Predicates are plain values: build them once, clone them, combine them
/// with [`Predicate::all_of`] / [`Predicate::any_of`], and evaluate them as
/// often as needed. Evaluation takes `&DomTree`, so it can never change the
/// tree and the same node always gives the same answer.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Matches every node.
    Always,
    /// Element (or Document, tag `""`) with this exact tag.
    Tag(String),
    /// Node of this kind.
    Kind(NodeKind),
    /// Element carrying an attribute.
    Attribute {
        /// Attribute key, compared case-sensitively.
        name: String,
        /// Value requirement.
        value: AttributeMatch,
    },
    /// Text node whose payload contains this substring.
    Substring(String),
    /// Every member matches. An empty list matches everything.
    AllOf(Vec<Predicate>),
    /// At least one member matches. An empty list matches nothing.
    AnyOf(Vec<Predicate>),
    /// Caller-supplied test.
    Custom(CustomPredicate),
}

impl Predicate {
    /// Matches every node.
    #[must_use]
    pub const fn always() -> Self {
        Self::Always
    }

    /// Matches elements with the given tag.
    #[must_use]
    pub fn by_tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Matches nodes of the given kind.
    #[must_use]
    pub const fn by_kind(kind: NodeKind) -> Self {
        Self::Kind(kind)
    }

    /// Matches elements carrying `name` with any value.
    #[must_use]
    pub fn by_attribute(name: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            value: AttributeMatch::Present,
        }
    }

    /// Matches elements whose `name` attribute equals `value` exactly.
    #[must_use]
    pub fn by_attribute_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Attribute {
            name: name.into(),
            value: AttributeMatch::Equals(value.into()),
        }
    }

    /// Matches text nodes containing `text`.
    ///
    /// Only nodes that are themselves string-like match; an element whose
    /// descendants contain the text does not.
    #[must_use]
    pub fn by_substring(text: impl Into<String>) -> Self {
        Self::Substring(text.into())
    }

    /// Logical AND over all members.
    #[must_use]
    pub fn all_of(predicates: impl IntoIterator<Item = Self>) -> Self {
        Self::AllOf(predicates.into_iter().collect())
    }

    /// Logical OR over all members.
    #[must_use]
    pub fn any_of(predicates: impl IntoIterator<Item = Self>) -> Self {
        Self::AnyOf(predicates.into_iter().collect())
    }

    /// Wrap a closure as a predicate.
    #[must_use]
    pub fn custom(test: impl Fn(&DomTree, &Cursor) -> bool + 'static) -> Self {
        Self::Custom(CustomPredicate(Rc::new(test)))
    }

    /// Evaluate this predicate against the node under `cursor`.
    ///
    /// Combinators evaluate every member before reducing, so a custom
    /// member always runs even when an earlier one already decided the result.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, cursor: &Cursor) -> bool {
        let node = cursor.node();
        match self {
            Self::Always => true,
            Self::Tag(name) => tree.tag(node).is_ok_and(|tag| tag == name),
            Self::Kind(kind) => tree.kind(node) == Some(*kind),
            Self::Attribute { name, value } => match (tree.get_attribute(node, name), value) {
                (None, _) => false,
                (Some(_), AttributeMatch::Present) => true,
                (Some(actual), AttributeMatch::Equals(expected)) => {
                    actual == Some(expected.as_str())
                }
            },
            Self::Substring(text) => tree.as_text(node).is_some_and(|data| data.contains(text)),
            Self::AllOf(members) => evaluate_all(members, tree, cursor).iter().all(|&m| m),
            Self::AnyOf(members) => evaluate_all(members, tree, cursor).iter().any(|&m| m),
            Self::Custom(CustomPredicate(test)) => test(tree, cursor),
        }
    }
}

fn evaluate_all(members: &[Predicate], tree: &DomTree, cursor: &Cursor) -> Vec<bool> {
    members.iter().map(|p| p.matches(tree, cursor)).collect()
}

impl From<NodeKind> for Predicate {
    fn from(kind: NodeKind) -> Self {
        Self::Kind(kind)
    }
}
