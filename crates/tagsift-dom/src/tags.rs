use std::collections::{HashMap, HashSet};

use strum_macros::{Display, EnumString};

/// How a tag behaves during parsing and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TagKind {
    /// Ordinary element: pushed on the open-element stack, renders its content.
    Element,
    /// Never has content or an end tag; never pushed on the open-element stack.
    Void,
    /// Content is parsed but excluded from text and markup output.
    Suppressed,
}

/// Ordinary elements known in advance.
const ELEMENT_TAGS: &[&str] = &[
    // document structure
    "html", "head", "title", "body",
    // text markup, font style
    "tt", "i", "b", "big", "small", "em", "strong", "u", "dfn", "code", "samp", "kbd", "var",
    "cite", "abbr", "acronym",
    // text markup, special
    "a", "map", "q", "sub", "sup", "span", "bdo",
    // block content
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ol", "ul", "li", "dt", "dd", "pre", "dl", "div",
    "noscript", "blockquote", "address",
    // forms
    "form", "select", "textarea", "label", "button", "fieldset", "legend", "optgroup", "option",
    // tables
    "table", "tr", "th", "td", "thead", "tbody", "tfoot", "colgroup", "caption",
    // legacy presentational
    "strike", "basefont", "layer", "ilayer", "font",
    // frames
    "frameset", "frame", "iframe", "noframes",
    // misc
    "del", "ins", "blink", "fontsize", "center", "nobr", "wbr", "noembed", "style", "script",
];

/// Elements whose content is parsed but never rendered or searched as text.
const SUPPRESSED_TAGS: &[&str] = &["applet", "embed", "object"];

/// Elements that never receive content or a matching end tag.
const VOID_TAGS: &[&str] = &[
    "br", "area", "link", "img", "param", "hr", "input", "col", "base", "meta", "!doctype", "ssi",
];

/// Elements where opening a new one while the same tag is the current node
/// implies the end of the previous one.
const IMPLICIT_CLOSE_TAGS: &[&str] = &["p", "li", "dt", "dd", "tr", "th", "td", "option"];

/// Immutable tag classification handed to the parser and the renderer.
///
/// Built once (normally with [`TagTable::html`]) and passed explicitly to
/// whatever needs it. Lookups are exact and case-sensitive; the parser
/// lowercases tag names before asking. Unknown tags are ordinary elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTable {
    kinds: HashMap<String, TagKind>,
    implicit_close: HashSet<String>,
}

impl TagTable {
    /// A table that knows no tags: everything is an ordinary element and
    /// nothing closes implicitly.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
            implicit_close: HashSet::new(),
        }
    }

    /// The default HTML classification.
    #[must_use]
    pub fn html() -> Self {
        let groups = [
            (ELEMENT_TAGS, TagKind::Element),
            (SUPPRESSED_TAGS, TagKind::Suppressed),
            (VOID_TAGS, TagKind::Void),
        ];
        let kinds = groups
            .iter()
            .flat_map(|(tags, kind)| tags.iter().map(|tag| ((*tag).to_string(), *kind)))
            .collect();
        let implicit_close = IMPLICIT_CLOSE_TAGS
            .iter()
            .map(|tag| (*tag).to_string())
            .collect();
        Self {
            kinds,
            implicit_close,
        }
    }

    /// Return a copy of this table with `tag` classified as `kind`.
    #[must_use]
    pub fn with_kind(mut self, tag: &str, kind: TagKind) -> Self {
        let _ = self.kinds.insert(tag.to_string(), kind);
        self
    }

    /// Return a copy of this table where re-opening `tag` closes the open one.
    #[must_use]
    pub fn with_implicit_close(mut self, tag: &str) -> Self {
        let _ = self.implicit_close.insert(tag.to_string());
        self
    }

    /// Classification of `tag`; unknown tags are [`TagKind::Element`].
    #[must_use]
    pub fn kind(&self, tag: &str) -> TagKind {
        self.kinds.get(tag).copied().unwrap_or(TagKind::Element)
    }

    /// Whether `tag` is listed in the table at all.
    #[must_use]
    pub fn is_known(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// Whether `tag` is a void element.
    #[must_use]
    pub fn is_void(&self, tag: &str) -> bool {
        self.kind(tag) == TagKind::Void
    }

    /// Whether `tag`'s content is suppressed from output.
    #[must_use]
    pub fn is_suppressed(&self, tag: &str) -> bool {
        self.kind(tag) == TagKind::Suppressed
    }

    /// Whether opening `tag` implicitly closes an open `tag` at the top of the stack.
    #[must_use]
    pub fn closes_implicitly(&self, tag: &str) -> bool {
        self.implicit_close.contains(tag)
    }

    /// All known tags of a given kind, sorted.
    #[must_use]
    pub fn tags_of_kind(&self, kind: TagKind) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .kinds
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(tag, _)| tag.as_str())
            .collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for TagTable {
    fn default() -> Self {
        Self::html()
    }
}
