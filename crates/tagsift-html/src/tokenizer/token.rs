use std::fmt;

/// An attribute on a start tag token.
///
/// `value` is `None` for an attribute written without `=` (`<input disabled>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Decoded value, if one was written.
    pub value: Option<String>,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: Option<String>) -> Self {
        Self { name, value }
    }
}

/// The tokenizer emits tokens of these types to the tree builder.
///
/// Character data arrives in runs rather than one character at a time, and
/// references are kept in their escaped source form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<!DOCTYPE ...>`, with everything between `<!` and `>`.
    Doctype {
        /// Declaration text, e.g. `DOCTYPE html`.
        data: String,
    },

    /// A start tag. Attributes are in source order with duplicates removed
    /// (the first occurrence wins).
    StartTag {
        /// Lowercased tag name.
        name: String,
        /// Written as `<name/>`.
        self_closing: bool,
        /// The tag's attributes.
        attributes: Vec<Attribute>,
    },

    /// An end tag. Anything after the name is discarded.
    EndTag {
        /// Lowercased tag name.
        name: String,
    },

    /// A comment, without its `<!--` / `-->` delimiters.
    Comment {
        /// Comment text.
        data: String,
    },

    /// A run of character data.
    Text {
        /// The characters, verbatim.
        data: String,
    },

    /// A numeric reference such as `&#38;` or `&#x26;`, verbatim.
    CharacterReference {
        /// The reference including `&` and `;`.
        data: String,
    },

    /// A named reference such as `&amp;`, verbatim.
    EntityReference {
        /// The reference including `&` and `;`.
        data: String,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// A start tag with an empty name, no attributes and the self-closing flag unset.
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag {
            name: String::new(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// An end tag with an empty name.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag {
            name: String::new(),
        }
    }

    /// Append a character to the tag name of a start or end tag token.
    pub fn append_to_tag_name(&mut self, c: char) {
        if let Self::StartTag { name, .. } | Self::EndTag { name } = self {
            name.push(c.to_ascii_lowercase());
        }
    }

    /// Mark a start tag as self-closing.
    pub const fn set_self_closing(&mut self) {
        if let Self::StartTag { self_closing, .. } = self {
            *self_closing = true;
        }
    }

    /// Add an attribute to a start tag unless one with the same name is
    /// already present.
    ///
    /// Returns `false` if the attribute was a duplicate and was dropped.
    pub fn add_attribute(&mut self, attribute: Attribute) -> bool {
        if let Self::StartTag { attributes, .. } = self {
            if attributes.iter().any(|a| a.name == attribute.name) {
                return false;
            }
            attributes.push(attribute);
        }
        true
    }

    /// The tag name of a start or end tag token.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name),
            _ => None,
        }
    }

    /// The source-level text of character data and references.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { data }
            | Self::CharacterReference { data }
            | Self::EntityReference { data } => Some(data),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { data } => write!(f, "<!{data}>"),
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    match &attr.value {
                        Some(value) => write!(f, " {}=\"{value}\"", attr.name)?,
                        None => write!(f, " {}", attr.name)?,
                    }
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Text { data } => write!(f, "{data:?}"),
            Self::CharacterReference { data } | Self::EntityReference { data } => {
                write!(f, "{data}")
            }
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}
