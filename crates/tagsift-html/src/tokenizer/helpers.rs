//! Helper functions for the HTML tokenizer.
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("switch to", "reconsume in")
//! - Token emission, including replaying abandoned markup as text
//! - Character classes and attribute value decoding

use tagsift_common::warning::warn_once;

use super::core::{HTMLTokenizer, RAW_TEXT_TAGS, TokenizerState};
use super::token::Token;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// Transitions to a new state. The next character is consumed by the new state.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// Start recording a markup construct that begins with `first`.
    pub(super) fn begin_markup(&mut self, first: char) {
        self.raw.clear();
        self.raw.push(first);
    }

    /// Give up on the current construct: everything recorded before the
    /// current character becomes character data, and the current character
    /// is processed again in `state`.
    pub(super) fn reconsume_as_text(&mut self, state: TokenizerState) {
        let _ = self.raw.pop();
        self.flush_raw_as_text();
        self.current_token = None;
        self.current_attribute = None;
        self.reconsume_in(state);
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// Emit any pending character data as a single text token.
    pub(super) fn flush_text(&mut self) {
        if !self.pending_text.is_empty() {
            let data = std::mem::take(&mut self.pending_text);
            self.token_stream.push(Token::Text { data });
        }
    }

    /// Move the recorded source of an abandoned construct into pending text.
    pub(super) fn flush_raw_as_text(&mut self) {
        self.pending_text.push_str(&self.raw);
        self.raw.clear();
    }

    /// Emit the current token and return to the appropriate content state.
    ///
    /// A non-self-closing `script` or `style` start tag switches to raw text.
    pub(super) fn emit_token(&mut self) {
        self.raw.clear();
        self.temporary_buffer.clear();
        let Some(token) = self.current_token.take() else {
            self.switch_to(TokenizerState::Data);
            return;
        };
        self.flush_text();
        match &token {
            Token::StartTag {
                name,
                self_closing: false,
                ..
            } if RAW_TEXT_TAGS.contains(&name.as_str()) => {
                self.last_start_tag_name = Some(name.clone());
                self.switch_to(TokenizerState::RawText);
            }
            Token::EndTag { .. } => {
                self.last_start_tag_name = None;
                self.switch_to(TokenizerState::Data);
            }
            _ => self.switch_to(TokenizerState::Data),
        }
        tracing::trace!(token = %token, "emit");
        self.token_stream.push(token);
    }

    /// Emit the recorded `&...;` as a reference token.
    pub(super) fn emit_reference(&mut self, numeric: bool) {
        let data = std::mem::take(&mut self.raw);
        self.current_token = Some(if numeric {
            Token::CharacterReference { data }
        } else {
            Token::EntityReference { data }
        });
        self.emit_token();
    }

    /// Close a `<!...>` declaration. Only DOCTYPE is reported.
    pub(super) fn finish_declaration(&mut self) {
        let data = std::mem::take(&mut self.temporary_buffer);
        let is_doctype = data
            .get(..7)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("doctype"));
        if is_doctype {
            self.current_token = Some(Token::Doctype { data });
        } else {
            tracing::debug!(declaration = %data, "declaration dropped");
        }
        self.emit_token();
    }

    /// Discard a construct that has no place in the tree.
    pub(super) fn drop_markup(&mut self, kind: &str) {
        warn_once("HTML Tokenizer", &format!("{kind} dropped"));
        self.current_token = None;
        self.emit_token();
    }
}

// =============================================================================
// Tag and Attribute Helpers
// =============================================================================

impl HTMLTokenizer {
    /// Whether the end tag being read in raw text closes the raw-text element.
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        if let (Some(last_start_tag), Some(Token::EndTag { name })) =
            (&self.last_start_tag_name, &self.current_token)
        {
            return name == last_start_tag;
        }
        false
    }

    /// Tab, line feed, form feed, carriage return, or space.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C' | '\r')
    }

    /// Characters allowed in an end tag name.
    pub(super) const fn is_tag_name_char(input_char: char) -> bool {
        input_char.is_ascii_alphanumeric() || matches!(input_char, '-' | '_' | '.' | ':')
    }

    /// Decode the references allowed in attribute values: `&amp;`, `&lt;`,
    /// `&gt;`, `&quot;`, `&apos;` and numeric references. Anything else,
    /// including a reference without `;`, is kept as written.
    #[must_use]
    pub fn decode_attribute_value(raw: &str) -> String {
        let mut decoded = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            decoded.push_str(&rest[..amp]);
            rest = &rest[amp..];
            let replacement = rest.find(';').and_then(|semi| {
                Self::decode_reference(&rest[1..semi]).map(|decoded| (semi, decoded))
            });
            if let Some((semi, c)) = replacement {
                decoded.push(c);
                rest = &rest[semi + 1..];
            } else {
                decoded.push('&');
                rest = &rest[1..];
            }
        }
        decoded.push_str(rest);
        decoded
    }

    fn decode_reference(name: &str) -> Option<char> {
        match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                let number = name.strip_prefix('#')?;
                let code = match number.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                    None => number.parse::<u32>().ok()?,
                };
                char::from_u32(code)
            }
        }
    }
}
