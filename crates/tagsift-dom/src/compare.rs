//! Structural ordering between nodes.
//!
//! Two nodes compare by kind first, then (for elements) by tag, then by
//! their children pairwise, and only then by attributes. Mismatched tags
//! therefore never compare equal, whatever their content.

use std::cmp::Ordering;

use crate::{AttributesMap, DomTree, Node, NodeId, NodeType};

/// Children still to be compared under one pair of matching containers.
struct Level<'a> {
    left: &'a [NodeId],
    right: &'a [NodeId],
    next: usize,
    /// Compared once every child pair is equal; `None` for the Document.
    attrs: Option<(&'a AttributesMap, &'a AttributesMap)>,
}

/// Outcome of comparing two nodes without looking at their children.
enum Shallow<'a> {
    Differs(Ordering),
    Equal,
    Descend(Level<'a>),
}

impl DomTree {
    /// Compare node `a` of this tree with node `b` of `other` structurally.
    ///
    /// `other` may be this same tree. Unknown ids sort before known ones.
    /// Nesting depth is limited only by memory.
    #[must_use]
    pub fn compare(&self, a: NodeId, other: &Self, b: NodeId) -> Ordering {
        let mut levels: Vec<Level<'_>> = Vec::new();
        let mut pair = Some((a, b));
        loop {
            if let Some((a, b)) = pair.take() {
                match compare_shallow(self.get(a), other.get(b)) {
                    Shallow::Differs(ordering) => return ordering,
                    Shallow::Equal => {}
                    Shallow::Descend(level) => levels.push(level),
                }
            }

            let Some(level) = levels.last_mut() else {
                return Ordering::Equal;
            };
            if let (Some(&l), Some(&r)) = (level.left.get(level.next), level.right.get(level.next)) {
                level.next += 1;
                pair = Some((l, r));
                continue;
            }
            let ordering = level.left.len().cmp(&level.right.len()).then_with(|| {
                level
                    .attrs
                    .map_or(Ordering::Equal, |(l, r)| compare_attributes(l, r))
            });
            if ordering != Ordering::Equal {
                return ordering;
            }
            let _ = levels.pop();
        }
    }

    /// Whether two nodes compare equal under [`DomTree::compare`].
    #[must_use]
    pub fn structurally_eq(&self, a: NodeId, other: &Self, b: NodeId) -> bool {
        self.compare(a, other, b) == Ordering::Equal
    }
}

fn compare_shallow<'a>(left: Option<&'a Node>, right: Option<&'a Node>) -> Shallow<'a> {
    let (left, right) = match (left, right) {
        (None, None) => return Shallow::Equal,
        (None, Some(_)) => return Shallow::Differs(Ordering::Less),
        (Some(_), None) => return Shallow::Differs(Ordering::Greater),
        (Some(left), Some(right)) => (left, right),
    };

    let by_kind = left.node_type.kind().cmp(&right.node_type.kind());
    if by_kind != Ordering::Equal {
        return Shallow::Differs(by_kind);
    }

    match (&left.node_type, &right.node_type) {
        (NodeType::Element(l), NodeType::Element(r)) => match l.tag_name.cmp(&r.tag_name) {
            Ordering::Equal => descend(left, right, Some((&l.attrs, &r.attrs))),
            ordering => Shallow::Differs(ordering),
        },
        (NodeType::Document, NodeType::Document) => descend(left, right, None),
        (NodeType::Text(l), NodeType::Text(r))
        | (NodeType::Comment(l), NodeType::Comment(r)) => match l.cmp(r) {
            Ordering::Equal => Shallow::Equal,
            ordering => Shallow::Differs(ordering),
        },
        _ => Shallow::Equal,
    }
}

fn descend<'a>(
    left: &'a Node,
    right: &'a Node,
    attrs: Option<(&'a AttributesMap, &'a AttributesMap)>,
) -> Shallow<'a> {
    Shallow::Descend(Level {
        left: left.children.as_slice(),
        right: right.children.as_slice(),
        next: 0,
        attrs,
    })
}

fn compare_attributes(left: &AttributesMap, right: &AttributesMap) -> Ordering {
    let mut left: Vec<_> = left.iter().collect();
    let mut right: Vec<_> = right.iter().collect();
    left.sort_unstable();
    right.sort_unstable();
    left.cmp(&right)
}
