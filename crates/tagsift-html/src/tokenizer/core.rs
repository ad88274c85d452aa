use strum_macros::Display;

use super::token::{Attribute, Token};

/// The tokenizer state machine.
///
/// Every state consumes exactly one character, so the machine can stop
/// after any character and pick up again when the next chunk arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// Ordinary character data.
    Data,
    /// After `<`.
    TagOpen,
    /// After `</`.
    EndTagOpen,
    /// Inside a start tag name.
    TagName,
    /// Inside an end tag name.
    EndTagName,
    /// After an end tag name; everything up to `>` is discarded.
    AfterEndTagName,
    /// Between attributes of a start tag.
    BeforeAttributeName,
    /// Inside an attribute name.
    AttributeName,
    /// After an attribute name, before `=` or the next attribute.
    AfterAttributeName,
    /// After `=`.
    BeforeAttributeValue,
    /// Inside `"..."`.
    AttributeValueDoubleQuoted,
    /// Inside `'...'`.
    AttributeValueSingleQuoted,
    /// Inside an unquoted value.
    AttributeValueUnquoted,
    /// Right after a closing quote.
    AfterAttributeValueQuoted,
    /// After `/` inside a start tag.
    SelfClosingStartTag,
    /// After `<!`, deciding between a comment, CDATA and a declaration.
    MarkupDeclarationOpen,
    /// Inside `<!-- ... -->`.
    Comment,
    /// Inside `<![CDATA[ ... ]]>`.
    CdataSection,
    /// Inside `<! ... >` (including DOCTYPE).
    Declaration,
    /// Inside `<? ... >`.
    ProcessingInstruction,
    /// Content of `script` or `style`: character data up to the matching end tag.
    RawText,
    /// After `<` in raw text.
    RawTextLessThanSign,
    /// After `</` in raw text.
    RawTextEndTagOpen,
    /// Inside a candidate end tag name in raw text.
    RawTextEndTagName,
    /// After `&`.
    CharacterReference,
    /// Inside `&name`.
    NamedCharacterReference,
    /// After `&#`.
    NumericCharacterReference,
    /// After `&#x`.
    HexadecimalCharacterReferenceStart,
    /// Inside `&#x` digits.
    HexadecimalCharacterReference,
    /// Inside `&#` digits.
    DecimalCharacterReference,
}

impl TokenizerState {
    /// States in which characters belong to an unfinished markup construct
    /// and are recorded so they can be replayed as text.
    pub(super) const fn is_markup(self) -> bool {
        !matches!(self, Self::Data | Self::RawText)
    }
}

/// Tags whose content is raw text up to the matching end tag.
pub(super) const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Chunk-fed HTML tokenizer.
///
/// Input may be split anywhere, including inside a tag, a comment or a
/// reference: all progress lives in the state and the buffers below, so
/// feeding `"<di"` then `"v>"` produces the same tokens as feeding `"<div>"`.
#[derive(Debug)]
pub struct HTMLTokenizer {
    pub(super) state: TokenizerState,
    pub(super) current_input_character: char,
    pub(super) current_token: Option<Token>,
    pub(super) current_attribute: Option<(String, Option<String>)>,
    pub(super) token_stream: Vec<Token>,
    // "Reconsume in the X state" sets this flag.
    pub(super) reconsume: bool,

    /// Tag of the raw-text element being read, for spotting its end tag.
    pub(super) last_start_tag_name: Option<String>,

    /// Scratch space for comment, CDATA and declaration text.
    pub(super) temporary_buffer: String,

    /// Source text of the unfinished markup construct, replayed as
    /// character data when the construct turns out not to be markup.
    pub(super) raw: String,

    /// Character data not yet emitted as a token.
    pub(super) pending_text: String,
}

impl Default for HTMLTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HTMLTokenizer {
    /// Create a tokenizer in the data state with no input.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: TokenizerState::Data,
            current_input_character: '\0',
            current_token: None,
            current_attribute: None,
            token_stream: Vec::new(),
            reconsume: false,
            last_start_tag_name: None,
            temporary_buffer: String::new(),
            raw: String::new(),
            pending_text: String::new(),
        }
    }

    /// Tokenize a complete document in one go.
    #[must_use]
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut tokenizer = Self::new();
        tokenizer.feed(input);
        tokenizer.finish();
        tokenizer.into_tokens()
    }

    /// The current state, mostly useful for tests and tracing.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    /// Consume the tokenizer and return every token produced so far.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.token_stream
    }

    /// Remove and return the tokens produced so far.
    pub fn take_tokens(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.token_stream)
    }

    /// Process one chunk of input completely.
    ///
    /// Character data at the end of the chunk is emitted right away; a
    /// markup construct cut off by the end of the chunk waits for more input.
    pub fn feed(&mut self, chunk: &str) {
        for c in chunk.chars() {
            self.current_input_character = c;
            if self.state.is_markup() {
                self.raw.push(c);
            }
            self.step();
            while self.reconsume {
                self.reconsume = false;
                self.step();
            }
        }
        self.flush_text();
    }

    /// Signal the end of input.
    ///
    /// An unfinished construct is emitted as the character data it was
    /// written as, followed by an end-of-file token. The tokenizer returns
    /// to the data state and can be reused.
    pub fn finish(&mut self) {
        if self.state.is_markup() {
            tracing::debug!(state = %self.state, raw = %self.raw, "unterminated markup at end of input");
            self.flush_raw_as_text();
        }
        self.current_token = None;
        self.current_attribute = None;
        self.temporary_buffer.clear();
        self.last_start_tag_name = None;
        self.switch_to(TokenizerState::Data);
        self.flush_text();
        self.token_stream.push(Token::EndOfFile);
    }

    fn step(&mut self) {
        match self.state {
            TokenizerState::Data => self.handle_data_state(),
            TokenizerState::TagOpen => self.handle_tag_open_state(),
            TokenizerState::EndTagOpen => self.handle_end_tag_open_state(),
            TokenizerState::TagName => self.handle_tag_name_state(),
            TokenizerState::EndTagName => self.handle_end_tag_name_state(),
            TokenizerState::AfterEndTagName => self.handle_after_end_tag_name_state(),
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokenizerState::AttributeName => self.handle_attribute_name_state(),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokenizerState::AttributeValueDoubleQuoted => self.handle_attribute_value_quoted('"'),
            TokenizerState::AttributeValueSingleQuoted => {
                self.handle_attribute_value_quoted('\'');
            }
            TokenizerState::AttributeValueUnquoted => self.handle_attribute_value_unquoted_state(),
            TokenizerState::AfterAttributeValueQuoted => {
                self.handle_after_attribute_value_quoted_state();
            }
            TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
            TokenizerState::MarkupDeclarationOpen => self.handle_markup_declaration_open_state(),
            TokenizerState::Comment => self.handle_comment_state(),
            TokenizerState::CdataSection => self.handle_cdata_section_state(),
            TokenizerState::Declaration => self.handle_declaration_state(),
            TokenizerState::ProcessingInstruction => self.handle_processing_instruction_state(),
            TokenizerState::RawText => self.handle_raw_text_state(),
            TokenizerState::RawTextLessThanSign => self.handle_raw_text_less_than_sign_state(),
            TokenizerState::RawTextEndTagOpen => self.handle_raw_text_end_tag_open_state(),
            TokenizerState::RawTextEndTagName => self.handle_raw_text_end_tag_name_state(),
            TokenizerState::CharacterReference => self.handle_character_reference_state(),
            TokenizerState::NamedCharacterReference => {
                self.handle_named_character_reference_state();
            }
            TokenizerState::NumericCharacterReference => {
                self.handle_numeric_character_reference_state();
            }
            TokenizerState::HexadecimalCharacterReferenceStart => {
                self.handle_hexadecimal_character_reference_start_state();
            }
            TokenizerState::HexadecimalCharacterReference => {
                self.handle_hexadecimal_character_reference_state();
            }
            TokenizerState::DecimalCharacterReference => {
                self.handle_decimal_character_reference_state();
            }
        }
    }

    fn handle_data_state(&mut self) {
        match self.current_input_character {
            '<' => {
                self.begin_markup('<');
                self.switch_to(TokenizerState::TagOpen);
            }
            '&' => {
                self.begin_markup('&');
                self.switch_to(TokenizerState::CharacterReference);
            }
            c => self.pending_text.push(c),
        }
    }

    fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            '!' => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::MarkupDeclarationOpen);
            }
            '/' => self.switch_to(TokenizerState::EndTagOpen),
            '?' => self.switch_to(TokenizerState::ProcessingInstruction),
            c if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_start_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // A lone `<` is character data.
            _ => self.reconsume_as_text(TokenizerState::Data),
        }
    }

    fn handle_end_tag_open_state(&mut self) {
        match self.current_input_character {
            c if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::EndTagName);
            }
            // `</>` and `</ x>` are character data.
            _ => self.reconsume_as_text(TokenizerState::Data),
        }
    }

    fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            c if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            '/' => self.switch_to(TokenizerState::SelfClosingStartTag),
            '>' => self.emit_token(),
            c => self.append_to_tag_name(c),
        }
    }

    fn handle_end_tag_name_state(&mut self) {
        match self.current_input_character {
            '>' => self.emit_token(),
            c if Self::is_tag_name_char(c) => self.append_to_tag_name(c),
            _ => self.switch_to(TokenizerState::AfterEndTagName),
        }
    }

    fn handle_after_end_tag_name_state(&mut self) {
        if self.current_input_character == '>' {
            self.emit_token();
        }
    }

    fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            c if Self::is_whitespace_char(c) => {}
            '/' => self.switch_to(TokenizerState::SelfClosingStartTag),
            '>' => self.emit_token(),
            c => {
                self.start_attribute(c);
                self.switch_to(TokenizerState::AttributeName);
            }
        }
    }

    fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            c if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            '=' => self.switch_to(TokenizerState::BeforeAttributeValue),
            '/' => {
                self.finish_attribute();
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            '>' => {
                self.finish_attribute();
                self.emit_token();
            }
            c => {
                if let Some((name, _)) = self.current_attribute.as_mut() {
                    name.push(c.to_ascii_lowercase());
                }
            }
        }
    }

    fn handle_after_attribute_name_state(&mut self) {
        match self.current_input_character {
            c if Self::is_whitespace_char(c) => {}
            '=' => self.switch_to(TokenizerState::BeforeAttributeValue),
            '/' => {
                self.finish_attribute();
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            '>' => {
                self.finish_attribute();
                self.emit_token();
            }
            c => {
                self.finish_attribute();
                self.start_attribute(c);
                self.switch_to(TokenizerState::AttributeName);
            }
        }
    }

    fn handle_before_attribute_value_state(&mut self) {
        if let Some((_, value)) = self.current_attribute.as_mut() {
            let _ = value.get_or_insert_with(String::new);
        }
        match self.current_input_character {
            c if Self::is_whitespace_char(c) => {}
            '"' => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            '\'' => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            // `<a href=>`: an empty value.
            '>' => {
                self.finish_attribute();
                self.emit_token();
            }
            _ => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
        }
    }

    fn handle_attribute_value_quoted(&mut self, quote: char) {
        match self.current_input_character {
            c if c == quote => {
                self.finish_attribute();
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            c => self.append_to_attribute_value(c),
        }
    }

    fn handle_attribute_value_unquoted_state(&mut self) {
        match self.current_input_character {
            c if Self::is_whitespace_char(c) => {
                self.finish_attribute();
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            '>' => {
                self.finish_attribute();
                self.emit_token();
            }
            c => self.append_to_attribute_value(c),
        }
    }

    fn handle_after_attribute_value_quoted_state(&mut self) {
        match self.current_input_character {
            c if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            '/' => self.switch_to(TokenizerState::SelfClosingStartTag),
            '>' => self.emit_token(),
            _ => self.reconsume_in(TokenizerState::BeforeAttributeName),
        }
    }

    fn handle_self_closing_start_tag_state(&mut self) {
        match self.current_input_character {
            '>' => {
                if let Some(token) = self.current_token.as_mut() {
                    token.set_self_closing();
                }
                self.emit_token();
            }
            _ => self.reconsume_in(TokenizerState::BeforeAttributeName),
        }
    }

    fn handle_markup_declaration_open_state(&mut self) {
        let c = self.current_input_character;
        if c == '>' {
            self.finish_declaration();
            return;
        }
        self.temporary_buffer.push(c);
        if self.temporary_buffer == "--" {
            self.temporary_buffer.clear();
            self.switch_to(TokenizerState::Comment);
        } else if self.temporary_buffer == "[CDATA[" {
            self.switch_to(TokenizerState::CdataSection);
        } else if !"--".starts_with(self.temporary_buffer.as_str())
            && !"[CDATA[".starts_with(self.temporary_buffer.as_str())
        {
            self.switch_to(TokenizerState::Declaration);
        }
    }

    fn handle_comment_state(&mut self) {
        let c = self.current_input_character;
        if c == '>' && self.temporary_buffer.ends_with("--") {
            let mut data = std::mem::take(&mut self.temporary_buffer);
            data.truncate(data.len() - 2);
            self.current_token = Some(Token::Comment { data });
            self.emit_token();
        } else {
            self.temporary_buffer.push(c);
        }
    }

    fn handle_cdata_section_state(&mut self) {
        self.temporary_buffer.push(self.current_input_character);
        if self.temporary_buffer.ends_with("]]>") {
            self.drop_markup("CDATA section");
        }
    }

    fn handle_declaration_state(&mut self) {
        match self.current_input_character {
            '>' => self.finish_declaration(),
            c => self.temporary_buffer.push(c),
        }
    }

    fn handle_processing_instruction_state(&mut self) {
        if self.current_input_character == '>' {
            self.drop_markup("processing instruction");
        }
    }

    fn handle_raw_text_state(&mut self) {
        match self.current_input_character {
            '<' => {
                self.begin_markup('<');
                self.switch_to(TokenizerState::RawTextLessThanSign);
            }
            c => self.pending_text.push(c),
        }
    }

    fn handle_raw_text_less_than_sign_state(&mut self) {
        match self.current_input_character {
            '/' => self.switch_to(TokenizerState::RawTextEndTagOpen),
            _ => self.reconsume_as_text(TokenizerState::RawText),
        }
    }

    fn handle_raw_text_end_tag_open_state(&mut self) {
        match self.current_input_character {
            c if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::RawTextEndTagName);
            }
            _ => self.reconsume_as_text(TokenizerState::RawText),
        }
    }

    fn handle_raw_text_end_tag_name_state(&mut self) {
        match self.current_input_character {
            c if c.is_ascii_alphabetic() => self.append_to_tag_name(c),
            c if self.is_appropriate_end_tag_token() => {
                if c == '>' {
                    self.emit_token();
                } else {
                    self.switch_to(TokenizerState::AfterEndTagName);
                }
            }
            _ => {
                self.current_token = None;
                self.reconsume_as_text(TokenizerState::RawText);
            }
        }
    }

    fn handle_character_reference_state(&mut self) {
        match self.current_input_character {
            '#' => self.switch_to(TokenizerState::NumericCharacterReference),
            c if c.is_ascii_alphabetic() => {
                self.switch_to(TokenizerState::NamedCharacterReference);
            }
            _ => self.reconsume_as_text(TokenizerState::Data),
        }
    }

    fn handle_named_character_reference_state(&mut self) {
        match self.current_input_character {
            ';' => self.emit_reference(false),
            c if c.is_ascii_alphanumeric() => {}
            _ => self.reconsume_as_text(TokenizerState::Data),
        }
    }

    fn handle_numeric_character_reference_state(&mut self) {
        match self.current_input_character {
            'x' | 'X' => self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart),
            c if c.is_ascii_digit() => self.switch_to(TokenizerState::DecimalCharacterReference),
            _ => self.reconsume_as_text(TokenizerState::Data),
        }
    }

    fn handle_hexadecimal_character_reference_start_state(&mut self) {
        match self.current_input_character {
            c if c.is_ascii_hexdigit() => {
                self.switch_to(TokenizerState::HexadecimalCharacterReference);
            }
            _ => self.reconsume_as_text(TokenizerState::Data),
        }
    }

    fn handle_hexadecimal_character_reference_state(&mut self) {
        match self.current_input_character {
            ';' => self.emit_reference(true),
            c if c.is_ascii_hexdigit() => {}
            _ => self.reconsume_as_text(TokenizerState::Data),
        }
    }

    fn handle_decimal_character_reference_state(&mut self) {
        match self.current_input_character {
            ';' => self.emit_reference(true),
            c if c.is_ascii_digit() => {}
            _ => self.reconsume_as_text(TokenizerState::Data),
        }
    }

    fn start_attribute(&mut self, c: char) {
        self.current_attribute = Some((c.to_ascii_lowercase().to_string(), None));
    }

    fn append_to_attribute_value(&mut self, c: char) {
        if let Some((_, value)) = self.current_attribute.as_mut() {
            value.get_or_insert_with(String::new).push(c);
        }
    }

    fn append_to_tag_name(&mut self, c: char) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_tag_name(c);
        }
    }

    fn finish_attribute(&mut self) {
        let Some((name, value)) = self.current_attribute.take() else {
            return;
        };
        let value = value.map(|raw| Self::decode_attribute_value(&raw));
        let Some(token) = self.current_token.as_mut() else {
            return;
        };
        if !token.add_attribute(Attribute::new(name.clone(), value)) {
            tracing::debug!(attribute = %name, "duplicate attribute dropped");
        }
    }
}
