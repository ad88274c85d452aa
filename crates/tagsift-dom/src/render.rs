//! Rendering a tree back to markup, to plain text, and to debug output.
//!
//! Every function here branches on the node variant in one place; the tag
//! table decides how void and suppressed elements are treated.

use std::fmt::Write;

use crate::{DomTree, ElementData, NodeId, NodeType, TagKind, TagTable};

/// Longest run of text shown by [`summary`].
const SUMMARY_TEXT_LEN: usize = 16;

/// Render the subtree at `id` as markup.
///
/// - elements render as `<tag k="v" flag>children</tag>`, attributes in
///   sorted key order with `&`, `<`, `>` and `"` escaped in values;
/// - void elements render only their start tag;
/// - suppressed elements render their start and end tags with nothing between;
/// - text renders verbatim. The parser keeps references in their escaped
///   form, so nothing is re-escaped; text built by hand is assumed to be in
///   that same source form, and a literal `<` or `&` in it is emitted as is
///   (and reparses as markup or a reference);
/// - comments render as `<!--data-->`;
/// - the document renders as the concatenation of its children.
///
/// Nesting depth is limited only by memory.
#[must_use]
pub fn to_html(tree: &DomTree, id: NodeId, tags: &TagTable) -> String {
    let mut out = String::new();
    write_html(tree, id, tags, &mut out);
    out
}

/// Pending work while rendering markup.
enum HtmlStep<'a> {
    Node(NodeId),
    EndTag(&'a ElementData),
}

fn write_html(tree: &DomTree, id: NodeId, tags: &TagTable, out: &mut String) {
    let mut pending = vec![HtmlStep::Node(id)];
    while let Some(step) = pending.pop() {
        let id = match step {
            HtmlStep::EndTag(data) => {
                write_end_tag(data, out);
                continue;
            }
            HtmlStep::Node(id) => id,
        };
        let Some(node) = tree.get(id) else {
            continue;
        };
        match &node.node_type {
            NodeType::Document => push_children(&mut pending, &node.children),
            NodeType::Element(data) => {
                write_start_tag(data, out);
                match tags.kind(&data.tag_name) {
                    TagKind::Void => {}
                    TagKind::Suppressed => write_end_tag(data, out),
                    TagKind::Element => {
                        pending.push(HtmlStep::EndTag(data));
                        push_children(&mut pending, &node.children);
                    }
                }
            }
            NodeType::Text(data) => out.push_str(data),
            NodeType::Comment(data) => {
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
            }
        }
    }
}

/// Queue children so that the first one is popped first.
fn push_children(pending: &mut Vec<HtmlStep<'_>>, children: &[NodeId]) {
    pending.extend(children.iter().rev().map(|&child| HtmlStep::Node(child)));
}

fn write_start_tag(data: &ElementData, out: &mut String) {
    out.push('<');
    out.push_str(&data.tag_name);
    let mut attrs: Vec<_> = data.attrs.iter().collect();
    attrs.sort_unstable_by(|a, b| a.0.cmp(b.0));
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        if let Some(value) = value {
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
    }
    out.push('>');
}

fn write_end_tag(data: &ElementData, out: &mut String) {
    out.push_str("</");
    out.push_str(&data.tag_name);
    out.push('>');
}

/// Escape an attribute value for use inside double quotes.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Concatenate all descendant text of `id` depth-first.
///
/// Comments and the content of suppressed elements are skipped entirely. A
/// text node's text is its own payload.
#[must_use]
pub fn to_text(tree: &DomTree, id: NodeId, tags: &TagTable) -> String {
    let mut out = String::new();
    write_text(tree, id, tags, &mut out);
    out
}

fn write_text(tree: &DomTree, id: NodeId, tags: &TagTable, out: &mut String) {
    let mut pending = vec![id];
    while let Some(id) = pending.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        match &node.node_type {
            NodeType::Text(data) => out.push_str(data),
            NodeType::Comment(_) => {}
            NodeType::Element(data) if tags.is_suppressed(&data.tag_name) => {}
            NodeType::Element(_) | NodeType::Document => {
                pending.extend(node.children.iter().rev());
            }
        }
    }
}

/// One-line description of a node, for listings and debugging.
///
/// Elements show their most identifying attribute (`id`, then `name`, then
/// `class`, then whichever comes first) and the start of their content:
/// `<a href='/x'...>Read more about...</a>`.
#[must_use]
pub fn summary(tree: &DomTree, id: NodeId) -> String {
    let Some(node) = tree.get(id) else {
        return String::new();
    };
    match &node.node_type {
        NodeType::Text(data) => format!("{:?}", truncate(data.trim(), SUMMARY_TEXT_LEN)),
        NodeType::Comment(data) => format!("<!--{}-->", truncate(data, SUMMARY_TEXT_LEN)),
        NodeType::Document => format!("#document{}", content_summary(tree, &node.children)),
        NodeType::Element(data) => {
            let attrs = attribute_summary(data);
            let content = content_summary(tree, &node.children);
            if content.is_empty() {
                format!("<{}{attrs}>", data.tag_name)
            } else {
                format!("<{}{attrs}>{content}</{}>", data.tag_name, data.tag_name)
            }
        }
    }
}

fn attribute_summary(data: &ElementData) -> String {
    let mut names: Vec<&str> = data.attrs.keys().map(String::as_str).collect();
    names.sort_unstable();
    let Some(name) = ["id", "name", "class"]
        .into_iter()
        .find(|preferred| data.attrs.contains_key(*preferred))
        .or_else(|| names.first().copied())
    else {
        return String::new();
    };

    let mut info = match data.attrs.get(name) {
        Some(Some(value)) => format!(" {name}='{value}'"),
        _ => format!(" {name}"),
    };
    if names.len() > 1 {
        info.push_str("...");
    }
    info
}

fn content_summary(tree: &DomTree, children: &[NodeId]) -> String {
    let Some(&first) = children.first() else {
        return String::new();
    };
    match tree.get(first).map(|n| &n.node_type) {
        Some(NodeType::Text(data)) => {
            let text = data.replace('\n', " ");
            let text = text.trim();
            if text.chars().count() > SUMMARY_TEXT_LEN || children.len() > 1 {
                format!("{}...", truncate(text, SUMMARY_TEXT_LEN))
            } else {
                text.to_string()
            }
        }
        Some(NodeType::Element(data)) => format!("<{}...>", data.tag_name),
        Some(NodeType::Comment(_)) => "<!--...-->".to_string(),
        Some(NodeType::Document) | None => String::new(),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Render an indented debug dump of the subtree at `id`.
#[must_use]
pub fn debug_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_debug_tree(tree, id, 0, &mut out);
    out
}

fn write_debug_tree(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let mut pending = vec![(id, indent)];
    while let Some((id, indent)) = pending.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let prefix = "  ".repeat(indent);
        let _ = match &node.node_type {
            NodeType::Document => writeln!(out, "{prefix}Document"),
            NodeType::Element(data) => {
                let mut attrs: Vec<String> = data
                    .attrs
                    .iter()
                    .map(|(k, v)| match v {
                        Some(v) => format!("{k}=\"{v}\""),
                        None => k.clone(),
                    })
                    .collect();
                attrs.sort_unstable();
                if attrs.is_empty() {
                    writeln!(out, "{prefix}<{}>", data.tag_name)
                } else {
                    writeln!(out, "{prefix}<{} {}>", data.tag_name, attrs.join(" "))
                }
            }
            NodeType::Text(data) => {
                let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
                writeln!(out, "{prefix}\"{display}\"")
            }
            NodeType::Comment(data) => writeln!(out, "{prefix}<!-- {data} -->"),
        };
        pending.extend(node.children.iter().rev().map(|&child| (child, indent + 1)));
    }
}

/// Print a tree for debugging.
pub fn print_tree(tree: &DomTree, id: NodeId) {
    print!("{}", debug_tree(tree, id));
}
