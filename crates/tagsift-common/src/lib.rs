//! Common utilities for tagsift.
//!
//! This crate provides shared infrastructure used by the other crates:
//! - **Warning System** - colored, deduplicated terminal output for dropped markup
//! - **Retrieval** - loading raw documents from files, URLs and `data:` URLs

pub mod net;
pub mod warning;
