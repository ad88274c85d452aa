//! Tolerant, chunk-fed HTML parser for tagsift.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** - a resumable state machine over arbitrary input chunks
//!   - tags, attributes (quoted, unquoted, valueless), comments
//!   - `script` / `style` raw text
//!   - character and entity references, kept verbatim
//!   - DOCTYPE, CDATA and processing instructions, consumed and dropped
//!
//! - **Tree builder** - a single stack of open elements with three repairs:
//!   implicit close of same-named siblings, end tags that close intervening
//!   elements, and stray end tags ignored
//!
//! Malformed markup never fails a parse; a tree is always produced.
//!
//! ```ignore
//! let tags = TagTable::html();
//! let tree = parse("<ul><li>one<li>two</ul>", &tags);
//! let ul = first_entity(&tree)?;
//! assert_eq!(tree.child_count(ul), 2);
//! ```

/// Error types.
pub mod error;
/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use error::ParseError;
pub use parser::{HTMLParser, ParseIssue, first_entity, parse, parse_chunks};
pub use tokenizer::{Attribute, HTMLTokenizer, Token, TokenizerState};
