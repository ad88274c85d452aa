//! Error types for the parser's convenience accessors.

use thiserror::Error;

/// Failures reported after a successful parse.
///
/// Malformed markup is never an error; these only describe a tree that
/// lacks something the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The document has no Element among its top-level children.
    #[error("document has no top-level element")]
    NoElement,
}
