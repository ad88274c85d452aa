use tagsift_dom::{AttributesMap, DomTree, NodeId, NodeType, TagTable};

use crate::error::ParseError;
use crate::tokenizer::{Attribute, HTMLTokenizer, Token};

/// A recovery the tree builder performed.
///
/// Issues are informational: the tree is always produced, and each issue
/// only says where the markup was not well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What was recovered from.
    pub message: String,
    /// Index of the token (counted from the start of input) that caused it.
    pub token_index: usize,
}

/// Chunk-fed tolerant tree builder.
///
/// The stack of open elements always has the Document at the bottom, and
/// the top of the stack receives every new node. Markup that does not nest
/// properly is repaired instead of rejected:
///
/// - opening a tag listed as implicit-close while the same tag is the
///   current node closes the open one first (`<li>a<li>b`);
/// - an end tag closes the nearest open element with that name and
///   everything opened after it;
/// - an end tag with no open element of that name is ignored;
/// - void elements are never pushed, and their end tags are ignored.
#[derive(Debug)]
pub struct HTMLParser<'t> {
    tags: &'t TagTable,

    tokenizer: HTMLTokenizer,

    /// Stores `NodeId`s into the arena. `NodeId::ROOT` is never popped.
    stack_of_open_elements: Vec<NodeId>,

    /// `NodeId::ROOT` (index 0) is the Document node.
    tree: DomTree,

    /// Number of tokens processed so far.
    token_index: usize,

    issues: Vec<ParseIssue>,
}

impl<'t> HTMLParser<'t> {
    /// Create a parser with an empty document, classifying tags with `tags`.
    #[must_use]
    pub fn new(tags: &'t TagTable) -> Self {
        Self {
            tags,
            tokenizer: HTMLTokenizer::new(),
            stack_of_open_elements: vec![NodeId::ROOT],
            tree: DomTree::new(),
            token_index: 0,
            issues: Vec::new(),
        }
    }

    /// Tokenize and build one chunk of input.
    ///
    /// Chunks may be split anywhere; a tag cut off at the end of a chunk is
    /// completed by the next one.
    pub fn feed(&mut self, chunk: &str) {
        self.tokenizer.feed(chunk);
        self.drain_tokens();
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Recoveries performed so far.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Signal the end of input and return the tree.
    ///
    /// Elements still open are simply left where they are.
    #[must_use]
    pub fn finish(self) -> DomTree {
        self.finish_with_issues().0
    }

    /// Signal the end of input and return both the tree and every
    /// recovery performed while building it.
    #[must_use]
    pub fn finish_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        self.tokenizer.finish();
        self.drain_tokens();
        (self.tree, self.issues)
    }

    fn drain_tokens(&mut self) {
        for token in self.tokenizer.take_tokens() {
            tracing::trace!(index = self.token_index, token = %token, "tree builder");
            self.process_token(token);
            self.token_index += 1;
        }
    }

    fn process_token(&mut self, token: Token) {
        match token {
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => self.handle_start_tag(&name, self_closing, attributes),
            Token::EndTag { name } => self.handle_end_tag(&name),
            Token::Text { data }
            | Token::CharacterReference { data }
            | Token::EntityReference { data } => self.insert_text(&data),
            Token::Comment { data } => {
                let comment = self.tree.create_comment(data);
                self.insert_node(comment);
            }
            Token::Doctype { .. } => {}
            Token::EndOfFile => self.handle_end_of_file(),
        }
    }

    fn handle_start_tag(&mut self, name: &str, self_closing: bool, attributes: Vec<Attribute>) {
        if self.tags.closes_implicitly(name) && self.current_tag_name() == Some(name) {
            tracing::debug!(tag = name, "implicit close of open element");
            let _ = self.stack_of_open_elements.pop();
        }

        let attrs: AttributesMap = attributes
            .into_iter()
            .map(|attribute| (attribute.name, attribute.value))
            .collect();
        let element = self.tree.create_element(name, attrs);
        self.insert_node(element);

        // `<x/>` is its own end tag.
        if !self.tags.is_void(name) && !self_closing {
            self.stack_of_open_elements.push(element);
        }
    }

    fn handle_end_tag(&mut self, name: &str) {
        if self.tags.is_void(name) {
            return;
        }
        let position = self
            .stack_of_open_elements
            .iter()
            .skip(1)
            .rposition(|&id| self.tag_name(id) == Some(name))
            .map(|index| index + 1);

        match position {
            Some(position) => {
                let unclosed = self.stack_of_open_elements.len() - position - 1;
                if unclosed > 0 {
                    self.parse_issue(format!(
                        "</{name}> closed {unclosed} element(s) that were still open"
                    ));
                }
                self.stack_of_open_elements.truncate(position);
            }
            None => self.parse_issue(format!("stray </{name}> ignored")),
        }
    }

    fn handle_end_of_file(&mut self) {
        let open: Vec<String> = self
            .stack_of_open_elements
            .iter()
            .skip(1)
            .filter_map(|&id| self.tag_name(id).map(str::to_string))
            .collect();
        for tag in open {
            self.parse_issue(format!("<{tag}> still open at end of input"));
        }
        self.stack_of_open_elements.truncate(1);
    }

    /// Append character data to the current node, extending its last child
    /// if that is already a Text node.
    fn insert_text(&mut self, data: &str) {
        let parent = self.current_node();
        if let Some(&last) = self.tree.children(parent).last()
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(ref mut text) = node.node_type
        {
            text.push_str(data);
            return;
        }
        let text = self.tree.create_text(data);
        self.insert_node(text);
    }

    /// Append a freshly created node to the current node.
    fn insert_node(&mut self, id: NodeId) {
        let parent = self.current_node();
        if let Err(err) = self.tree.append_child(parent, id) {
            tracing::error!(parent = parent.0, node = id.0, %err, "open element cannot hold children");
        }
    }

    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or(NodeId::ROOT)
    }

    fn current_tag_name(&self) -> Option<&str> {
        self.tag_name(self.current_node())
    }

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.as_element(id).map(|data| data.tag_name.as_str())
    }

    fn parse_issue(&mut self, message: String) {
        tracing::debug!(token_index = self.token_index, "{message}");
        self.issues.push(ParseIssue {
            message,
            token_index: self.token_index,
        });
    }
}

/// Parse a complete document.
#[must_use]
pub fn parse(html: &str, tags: &TagTable) -> DomTree {
    parse_chunks([html], tags)
}

/// Parse a document delivered as a sequence of chunks.
#[must_use]
pub fn parse_chunks<I>(chunks: I, tags: &TagTable) -> DomTree
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut parser = HTMLParser::new(tags);
    for chunk in chunks {
        parser.feed(chunk.as_ref());
    }
    parser.finish()
}

/// The first Element among the document's top-level children.
///
/// # Errors
///
/// Returns [`ParseError::NoElement`] if the document has no top-level element.
pub fn first_entity(tree: &DomTree) -> Result<NodeId, ParseError> {
    tree.document_element().ok_or(ParseError::NoElement)
}
