//! Integration tests for the HTML parser.

use quickcheck_macros::quickcheck;
use tagsift_dom::{AttributesMap, DomTree, NodeId, NodeKind, NodeType, TagKind, TagTable, to_html, to_text};
use tagsift_html::{HTMLParser, ParseError, first_entity, parse, parse_chunks};

/// Helper to parse HTML with the default tag table
fn parse_html(html: &str) -> DomTree {
    parse(html, &TagTable::html())
}

/// Helper to list a node's children as short labels: tag names, quoted
/// text, or `#comment`
fn labels(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .map(|&child| match tree.get(child).map(|node| &node.node_type) {
            Some(NodeType::Element(data)) => data.tag_name.clone(),
            Some(NodeType::Text(text)) => format!("{text:?}"),
            Some(NodeType::Comment(_)) => "#comment".to_string(),
            _ => "?".to_string(),
        })
        .collect()
}

/// Helper to collect element tags in document order
fn tag_sequence(tree: &DomTree, id: NodeId, out: &mut Vec<String>) {
    if let Some(data) = tree.as_element(id) {
        out.push(data.tag_name.clone());
    }
    for &child in tree.children(id) {
        tag_sequence(tree, child, out);
    }
}

fn nth_child(tree: &DomTree, id: NodeId, index: usize) -> NodeId {
    tree.child(id, index).unwrap()
}

// ========== recovery ==========

#[test]
fn test_implicit_close_of_list_items() {
    let tree = parse_html("<li>a<li>b</li></li>");

    assert_eq!(labels(&tree, NodeId::ROOT), vec!["li", "li"]);
    assert_eq!(labels(&tree, nth_child(&tree, NodeId::ROOT, 0)), vec!["\"a\""]);
    assert_eq!(labels(&tree, nth_child(&tree, NodeId::ROOT, 1)), vec!["\"b\""]);
}

#[test]
fn test_implicit_close_only_when_same_tag_is_current() {
    let tree = parse_html("<p>a<div>b<p>c");

    let p = nth_child(&tree, NodeId::ROOT, 0);
    assert_eq!(labels(&tree, NodeId::ROOT), vec!["p"]);
    assert_eq!(labels(&tree, p), vec!["\"a\"", "div"]);
    let div = nth_child(&tree, p, 1);
    assert_eq!(labels(&tree, div), vec!["\"b\"", "p"]);
}

#[test]
fn test_stray_end_tag_is_noop() {
    let tree = parse_html("<div>a</span>b</div>");

    assert_eq!(labels(&tree, NodeId::ROOT), vec!["div"]);
    assert_eq!(labels(&tree, nth_child(&tree, NodeId::ROOT, 0)), vec!["\"ab\""]);
}

#[test]
fn test_end_tag_closes_intervening_elements() {
    let tree = parse_html("<div><b>bold</div>after");

    assert_eq!(labels(&tree, NodeId::ROOT), vec!["div", "\"after\""]);
    let div = nth_child(&tree, NodeId::ROOT, 0);
    assert_eq!(labels(&tree, div), vec!["b"]);
}

#[test]
fn test_void_elements_never_nest() {
    let tree = parse_html("<br>x</br>y");

    assert_eq!(labels(&tree, NodeId::ROOT), vec!["br", "\"xy\""]);
    assert_eq!(tree.child_count(nth_child(&tree, NodeId::ROOT, 0)), 0);
}

#[test]
fn test_self_closing_tag_has_no_content() {
    let tree = parse_html("<div/><p>x</p>");

    assert_eq!(labels(&tree, NodeId::ROOT), vec!["div", "p"]);
    assert_eq!(tree.child_count(nth_child(&tree, NodeId::ROOT, 0)), 0);
}

#[test]
fn test_unclosed_document_still_produces_tree() {
    let tree = parse_html("<html><body><div><p>text");

    let mut tags = Vec::new();
    tag_sequence(&tree, NodeId::ROOT, &mut tags);
    assert_eq!(tags, vec!["html", "body", "div", "p"]);
}

// ========== content ==========

#[test]
fn test_references_are_preserved_and_coalesced() {
    let tree = parse_html("<p>&lt;tag&gt; &#169; ok</p>");

    let p = nth_child(&tree, NodeId::ROOT, 0);
    assert_eq!(tree.child_count(p), 1);
    assert_eq!(tree.as_text(nth_child(&tree, p, 0)), Some("&lt;tag&gt; &#169; ok"));
}

#[test]
fn test_comments_do_not_affect_stack() {
    let tree = parse_html("<div><!-- c --><p>x</p></div>");

    let div = nth_child(&tree, NodeId::ROOT, 0);
    assert_eq!(labels(&tree, div), vec!["#comment", "p"]);
    assert_eq!(tree.as_comment(nth_child(&tree, div, 0)), Some(" c "));
}

#[test]
fn test_doctype_and_dropped_markup_leave_no_nodes() {
    let tree = parse_html("<!DOCTYPE html><?xml version=\"1.0\"?><html></html>");

    assert_eq!(labels(&tree, NodeId::ROOT), vec!["html"]);
}

#[test]
fn test_script_is_a_single_text_child() {
    let tree = parse_html("<script>if (a < b && c) { x = '<p>'; }</script><p>x</p>");

    assert_eq!(labels(&tree, NodeId::ROOT), vec!["script", "p"]);
    let script = nth_child(&tree, NodeId::ROOT, 0);
    assert_eq!(
        tree.as_text(nth_child(&tree, script, 0)),
        Some("if (a < b && c) { x = '<p>'; }")
    );
}

#[test]
fn test_attributes_reach_the_element() {
    let tree = parse_html("<input type=checkbox checked>");

    let input = nth_child(&tree, NodeId::ROOT, 0);
    assert_eq!(tree.get_attribute(input, "type"), Some(Some("checkbox")));
    assert_eq!(tree.get_attribute(input, "checked"), Some(None));
    assert_eq!(tree.attribute_names(input), vec!["checked", "type"]);
}

// ========== tag table ==========

#[test]
fn test_custom_tag_table() {
    let tags = TagTable::html().with_kind("x-icon", TagKind::Void);
    let tree = parse("<x-icon>label", &tags);
    assert_eq!(labels(&tree, NodeId::ROOT), vec!["x-icon", "\"label\""]);

    let bare = parse("<br>x<li>a<li>b", &TagTable::empty());
    let br = nth_child(&bare, NodeId::ROOT, 0);
    assert_eq!(labels(&bare, NodeId::ROOT), vec!["br"]);
    assert_eq!(labels(&bare, br), vec!["\"x\"", "li"]);
    assert_eq!(labels(&bare, nth_child(&bare, br, 1)), vec!["\"a\"", "li"]);
}

// ========== entry points ==========

#[test]
fn test_first_entity() {
    let tree = parse_html("text <!-- c --><p>x</p><div></div>");
    let first = first_entity(&tree).unwrap();
    assert_eq!(tree.tag(first).unwrap(), "p");

    let empty = parse_html("just text <!-- and a comment -->");
    assert_eq!(first_entity(&empty), Err(ParseError::NoElement));
}

#[test]
fn test_issues_are_reported_with_token_index() {
    let tags = TagTable::html();
    let mut parser = HTMLParser::new(&tags);
    parser.feed("<p>a</span>");
    assert_eq!(parser.issues().len(), 1);
    assert_eq!(parser.issues()[0].message, "stray </span> ignored");
    assert_eq!(parser.issues()[0].token_index, 2);

    let (tree, issues) = parser.finish_with_issues();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[1].message, "<p> still open at end of input");
    assert_eq!(tree.kind(nth_child(&tree, NodeId::ROOT, 0)), Some(NodeKind::Element));
}

#[test]
fn test_tree_visible_while_feeding() {
    let tags = TagTable::html();
    let mut parser = HTMLParser::new(&tags);
    parser.feed("<ul><li>one");
    assert_eq!(parser.tree().len(), 4);
    parser.feed("<li>two</ul>");
    let tree = parser.finish();
    assert_eq!(tree.child_count(nth_child(&tree, NodeId::ROOT, 0)), 2);
}

#[test]
fn test_every_split_point_gives_same_tree() {
    let tags = TagTable::html();
    let html = "<!DOCTYPE html><div id=\"m\" hidden>a &amp; b<!-- c --><br/><script>x<y</script></div>";
    let whole = parse(html, &tags);

    for (split, _) in html.char_indices().skip(1) {
        let chunked = parse_chunks([&html[..split], &html[split..]], &tags);
        assert!(
            whole.structurally_eq(NodeId::ROOT, &chunked, NodeId::ROOT),
            "split at {split} changed the tree"
        );
    }
}

#[test]
fn test_deeply_nested_input_in_chunks() {
    let tags = TagTable::html();
    let html = format!("{}deep", "<div>".repeat(100_000));
    let whole = parse(&html, &tags);
    let chunks = html.as_bytes().chunks(4096).map(|chunk| std::str::from_utf8(chunk).unwrap());
    let chunked = parse_chunks(chunks, &tags);

    assert_eq!(whole.len(), 100_002);
    assert!(whole.structurally_eq(NodeId::ROOT, &chunked, NodeId::ROOT));
    assert_eq!(to_text(&whole, NodeId::ROOT, &tags), "deep");
}

/// Hand-built text is rendered as source, so markup characters in it are
/// read back as markup.
#[test]
fn test_hand_built_text_reparses_as_source() {
    let tags = TagTable::html();
    let mut tree = DomTree::new();
    let p = tree.create_element("p", AttributesMap::new());
    tree.append_child(NodeId::ROOT, p).unwrap();
    let text = tree.create_text("a <b>c &amp; d");
    tree.append_child(p, text).unwrap();

    let reparsed = parse(&to_html(&tree, NodeId::ROOT, &tags), &tags);
    let p = nth_child(&reparsed, NodeId::ROOT, 0);
    assert_eq!(labels(&reparsed, p), vec!["\"a \"", "b"]);
    assert_eq!(to_text(&reparsed, NodeId::ROOT, &tags), "a c &amp; d");
}

// ========== properties ==========

const SAMPLE: &str = "<html><head><title>T &amp; U</title></head>\
    <body bgcolor=black><ul><li>one<li>two</ul><p>para<br>graph</p>\
    <!-- note --><script>if (a<b) {}</script><p class='x'>tail &#169;</body></html>";

/// Any split of the input into chunks yields the same tree.
#[quickcheck]
fn prop_chunk_split_invariance(cuts: Vec<usize>) -> bool {
    let tags = TagTable::html();
    let len = SAMPLE.len();
    let mut cuts: Vec<usize> = cuts.into_iter().map(|cut| cut % (len + 1)).collect();
    cuts.push(0);
    cuts.push(len);
    cuts.sort_unstable();
    cuts.dedup();
    let chunks: Vec<&str> = cuts.windows(2).map(|w| &SAMPLE[w[0]..w[1]]).collect();

    let whole = parse(SAMPLE, &tags);
    let chunked = parse_chunks(chunks, &tags);
    whole.structurally_eq(NodeId::ROOT, &chunked, NodeId::ROOT)
}

const TAGS: &[&str] = &["div", "span", "b", "em", "section"];
/// Plain words only: text is rendered verbatim, so `<` or `&` here would
/// reparse as markup.
const WORDS: &[&str] = &["alpha", "beta ", " gamma", "delta"];

/// Build a tree directly from a list of (operation, argument) pairs.
fn build_tree(ops: &[(u8, u8)]) -> DomTree {
    let mut tree = DomTree::new();
    let mut stack = vec![NodeId::ROOT];
    for &(op, arg) in ops {
        let parent = *stack.last().unwrap();
        match op % 3 {
            0 => {
                let tag = TAGS[usize::from(arg) % TAGS.len()];
                let element = tree.create_element(tag, AttributesMap::new());
                tree.append_child(parent, element).unwrap();
                stack.push(element);
            }
            1 => {
                let word = WORDS[usize::from(arg) % WORDS.len()];
                let text = tree.create_text(word);
                tree.append_child(parent, text).unwrap();
            }
            _ => {
                if stack.len() > 1 {
                    let _ = stack.pop();
                }
            }
        }
    }
    tree
}

/// Rendering a directly built tree and parsing the result keeps the tag
/// sequence and the text.
#[quickcheck]
fn prop_render_reparse_round_trip(ops: Vec<(u8, u8)>) -> bool {
    let tags = TagTable::html();
    let built = build_tree(&ops);
    let reparsed = parse(&to_html(&built, NodeId::ROOT, &tags), &tags);

    let (mut expected, mut actual) = (Vec::new(), Vec::new());
    tag_sequence(&built, NodeId::ROOT, &mut expected);
    tag_sequence(&reparsed, NodeId::ROOT, &mut actual);

    expected == actual
        && to_text(&built, NodeId::ROOT, &tags) == to_text(&reparsed, NodeId::ROOT, &tags)
}
