//! Tests for cursor navigation, indexing and write-through mutation.

use tagsift_dom::{DomError, DomTree, ElementBuilder, NodeId, NodeKind, TagTable};
use tagsift_html::parse;
use tagsift_query::Cursor;

/// `<ul><li>one</li><li>two</li><li>three</li></ul>` under the document.
fn list() -> (DomTree, Cursor) {
    let mut tree = DomTree::new();
    let _ = tree.append_built(
        NodeId::ROOT,
        ElementBuilder::new("ul")
            .child(ElementBuilder::new("li").text("one"))
            .child(ElementBuilder::new("li").text("two"))
            .child(ElementBuilder::new("li").text("three")),
    ).unwrap();
    let ul = Cursor::root(NodeId::ROOT).child(&tree, 0).unwrap();
    (tree, ul)
}

fn text_of(tree: &DomTree, cursor: &Cursor) -> String {
    cursor.text(tree, &TagTable::html())
}

// ========== indexing ==========

#[test]
fn test_child_extends_ancestor_chain() {
    let (tree, ul) = list();
    let second = ul.child(&tree, 1).unwrap();

    assert_eq!(second.position(), 1);
    assert_eq!(second.depth(), 2);
    assert_eq!(second.parent(), Some(&ul));
    assert_eq!(second.ancestors().len(), 2);
    assert_eq!(second.ancestors()[0].node(), NodeId::ROOT);
    assert_eq!(second.path(), vec![0, 1]);
}

#[test]
fn test_child_out_of_range() {
    let (tree, ul) = list();
    assert_eq!(
        ul.child(&tree, 3),
        Err(DomError::IndexOutOfRange { index: 3, len: 3 })
    );
}

#[test]
fn test_slice() {
    let (tree, ul) = list();
    let middle = ul.slice(&tree, 1..3).unwrap();

    assert_eq!(middle.len(), 2);
    assert_eq!(middle[0].position(), 1);
    assert_eq!(text_of(&tree, &middle[1]), "three");
    assert!(ul.slice(&tree, 2..4).is_err());
    assert!(ul.slice(&tree, 3..3).unwrap().is_empty());
}

#[test]
fn test_attribute_is_raw_value() {
    let tree = parse(r#"<a href="/x" download>go</a>"#, &TagTable::html());
    let a = Cursor::root(NodeId::ROOT).child(&tree, 0).unwrap();

    assert_eq!(a.attribute(&tree, "href"), Some(Some("/x")));
    assert_eq!(a.attribute(&tree, "download"), Some(None));
    assert_eq!(a.attribute(&tree, "title"), None);
}

#[test]
fn test_child_by_tag_and_descend() {
    let tags = TagTable::html();
    let tree = parse(
        "<html><head><title>Page</title></head><body><p>x</p></body></html>",
        &tags,
    );
    let root = Cursor::root(NodeId::ROOT);

    let title = root.descend(&tree, "html.head.title").unwrap();
    assert_eq!(title.text(&tree, &tags), "Page");
    assert_eq!(title.path(), vec![0, 0, 0]);

    let body = root.child_by_tag(&tree, "html").unwrap();
    let body = body.child_by_tag(&tree, "body").unwrap();
    assert_eq!(body.position(), 1);

    assert_eq!(root.descend(&tree, "html.nav.ul"), Err(DomError::NoMatch));
    assert_eq!(root.descend(&tree, ""), Ok(root.clone()));
}

// ========== siblings ==========

#[test]
fn test_next_and_previous() {
    let (tree, ul) = list();
    let first = ul.child(&tree, 0).unwrap();

    let second = first.next(&tree).unwrap();
    assert_eq!(text_of(&tree, &second), "two");
    assert_eq!(second.previous(&tree).unwrap().node(), first.node());
    assert_eq!(first.sibling(&tree, 2).unwrap().position(), 2);
}

#[test]
fn test_no_such_sibling() {
    let (tree, ul) = list();
    let first = ul.child(&tree, 0).unwrap();
    let last = ul.child(&tree, 2).unwrap();

    assert_eq!(
        first.previous(&tree),
        Err(DomError::NoSuchSibling {
            position: 0,
            offset: -1
        })
    );
    assert_eq!(
        last.next(&tree),
        Err(DomError::NoSuchSibling {
            position: 2,
            offset: 1
        })
    );
    assert!(Cursor::root(NodeId::ROOT).next(&tree).is_err());
}

// ========== mutation ==========

#[test]
fn test_delete_preserves_sibling_indices() {
    let (mut tree, ul) = list();
    let third = ul.child(&tree, 2).unwrap();

    let removed = ul.delete(&mut tree, 1).unwrap();

    assert_eq!(tree.child_count(ul.node()), 3);
    assert_eq!(text_of(&tree, &third), "three");
    assert_eq!(ul.child(&tree, 2).unwrap().node(), third.node());
    assert_eq!(tree.as_text(tree.child(ul.node(), 1).unwrap()), Some(""));
    assert_eq!(tree.tag(removed).unwrap(), "li");
}

#[test]
fn test_delete_out_of_range_allocates_nothing() {
    let (mut tree, ul) = list();
    let before = tree.len();

    assert!(ul.delete(&mut tree, 7).is_err());
    assert_eq!(tree.len(), before);
}

#[test]
fn test_set_replaces_child() {
    let (mut tree, ul) = list();
    let replacement = tree.build(ElementBuilder::new("li").text("TWO"));

    let _ = ul.set(&mut tree, 1, replacement).unwrap();

    let second = ul.child(&tree, 1).unwrap();
    assert_eq!(text_of(&tree, &second), "TWO");
}

#[test]
fn test_removed_node_observable_through_cursor() {
    let (mut tree, ul) = list();
    let second = ul.child(&tree, 1).unwrap();

    let _ = tree.remove_child(ul.node(), 1).unwrap();

    assert_eq!(text_of(&tree, &second), "two");
    assert_eq!(tree.child_count(ul.node()), 2);
}

#[test]
fn test_attribute_write_through() {
    let (mut tree, ul) = list();

    ul.set_attribute(&mut tree, "class", Some("menu".to_string()))
        .unwrap();
    assert_eq!(ul.attribute(&tree, "class"), Some(Some("menu")));

    assert_eq!(ul.remove_attribute(&mut tree, "class"), Ok(true));
    assert_eq!(ul.attribute(&tree, "class"), None);

    let text = ul.child(&tree, 0).unwrap().child(&tree, 0).unwrap();
    assert_eq!(
        text.set_attribute(&mut tree, "x", None),
        Err(DomError::NotATagHolder {
            kind: NodeKind::Text
        })
    );
}

// ========== string forms ==========

#[test]
fn test_render_text_cursor_is_its_payload() {
    let tags = TagTable::html();
    let tree = parse("<p>a &amp; b</p>", &tags);
    let p = Cursor::root(NodeId::ROOT).child(&tree, 0).unwrap();
    let text = p.child(&tree, 0).unwrap();

    assert_eq!(text.render(&tree, &tags), "a &amp; b");
    assert_eq!(p.render(&tree, &tags), "<p>a &amp; b</p>");
}

#[test]
fn test_contains_text_and_kind() {
    let tags = TagTable::html();
    let tree = parse("<div><!-- c --><b>bold</b> tail</div>", &tags);
    let div = Cursor::root(NodeId::ROOT).child(&tree, 0).unwrap();

    assert!(div.contains_text(&tree, &tags, "bold tail"));
    assert!(!div.contains_text(&tree, &tags, " c "));
    assert!(div.contains_kind(&tree, NodeKind::Comment));
    assert!(!div.contains_kind(&tree, NodeKind::Document));
    assert_eq!(div.tag(&tree).unwrap(), "div");
}

// ========== deep chains ==========

const DEEP: usize = 100_000;

fn walk_down(tree: &DomTree, depth: usize) -> Cursor {
    let mut cursor = Cursor::root(NodeId::ROOT);
    for _ in 0..depth {
        cursor = cursor.child(tree, 0).unwrap();
    }
    cursor
}

#[test]
fn test_deep_cursor_walks_and_drops() {
    let tags = TagTable::html();
    let tree = parse(&"<div>".repeat(DEEP), &tags);

    let deepest = walk_down(&tree, DEEP);
    assert_eq!(deepest.depth(), DEEP);
    assert_eq!(deepest.ancestors().len(), DEEP);
    drop(deepest);
}

#[test]
fn test_shared_chain_outlives_dropped_branch() {
    let tags = TagTable::html();
    let tree = parse(&"<div>".repeat(DEEP), &tags);

    let middle = walk_down(&tree, DEEP / 2);
    let mut below = middle.clone();
    for _ in 0..DEEP / 2 {
        below = below.child(&tree, 0).unwrap();
    }
    let again = walk_down(&tree, DEEP);

    assert_eq!(below, again);
    drop(below);
    drop(again);
    assert_eq!(middle.depth(), DEEP / 2);
    assert_eq!(middle.parent().map(Cursor::depth), Some(DEEP / 2 - 1));
}
