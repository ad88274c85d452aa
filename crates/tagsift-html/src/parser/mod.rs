//! Tree construction from the token stream.

/// Tolerant tree builder and parse entry points.
pub mod core;

pub use core::{HTMLParser, ParseIssue, first_entity, parse, parse_chunks};
