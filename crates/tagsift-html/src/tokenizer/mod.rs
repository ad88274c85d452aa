//! HTML tokenizer module.
//!
//! A character-level state machine that can be fed input in arbitrary
//! chunks. Character data is emitted in runs and references keep their
//! escaped source form.

/// Helper methods for tokenizer state transitions.
pub mod helpers;
/// Token types produced by the tokenizer.
pub mod token;
/// HTML tokenizer state machine implementation.
pub mod core;

pub use core::{HTMLTokenizer, TokenizerState};
pub use token::{Attribute, Token};
