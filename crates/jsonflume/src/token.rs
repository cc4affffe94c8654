//! The token vocabulary shared by every stage of the pipeline.
//!
//! A [`Token`] describes one lexical element of a JSON document's surface
//! form. Every token knows its raw text; concatenating [`Token::raw`] over a
//! token stream reproduces the document text exactly, which is what makes
//! lossless round-trips and the [`Stringifier`](crate::Stringifier) trivial.
//!
//! # Examples
//!
//! ```
//! use jsonflume::{ParserOptions, StreamingParser, Token};
//!
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! parser.feed("[1]");
//! let tokens: Vec<Token> = parser.finish().map(|t| t.unwrap()).collect();
//! let raw: String = tokens.iter().map(|t| t.raw()).collect();
//! assert_eq!(raw, "[1]");
//! ```

use std::borrow::Cow;

/// Whether a string token spells an object key or a value.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringRole {
    Key,
    Value,
}

/// One element of a JSON document's surface form.
///
/// Strings are always bracketed: exactly one `StringStart`, zero or more
/// `StringChunk`s and exactly one `StringEnd`, all sharing the same
/// [`StringRole`]. A `StringChunk` never ends inside a `\uXXXX` escape and
/// its decoded `fragment` is always well-formed Unicode.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[cfg_attr(any(test, feature = "serde"), serde(tag = "kind"))]
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A run of insignificant whitespace, including multi-document framing
    /// bytes such as the RFC 7464 record separator.
    Whitespace { raw: String },
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Comma,
    Colon,
    /// The opening quote of a string.
    StringStart { role: StringRole },
    /// A fragment of a string body: `fragment` is the decoded text (escapes
    /// resolved), `raw` the original escaped spelling.
    StringChunk {
        role: StringRole,
        fragment: String,
        raw: String,
    },
    /// The closing quote of a string.
    StringEnd { role: StringRole },
    /// A number with its parsed value and exact original spelling.
    Number { value: f64, raw: String },
    Boolean { value: bool },
    Null,
}

impl Token {
    /// The raw text of this token.
    ///
    /// Concatenated over a parser-produced stream this reproduces the input
    /// byte-for-byte; over a serializer-produced stream it *is* the produced
    /// document.
    #[must_use]
    pub fn raw(&self) -> Cow<'_, str> {
        match self {
            Token::Whitespace { raw } => Cow::Borrowed(raw),
            Token::ObjectStart => Cow::Borrowed("{"),
            Token::ObjectEnd => Cow::Borrowed("}"),
            Token::ArrayStart => Cow::Borrowed("["),
            Token::ArrayEnd => Cow::Borrowed("]"),
            Token::Comma => Cow::Borrowed(","),
            Token::Colon => Cow::Borrowed(":"),
            Token::StringStart { .. } | Token::StringEnd { .. } => Cow::Borrowed("\""),
            Token::StringChunk { raw, .. } => Cow::Borrowed(raw),
            Token::Number { raw, .. } => Cow::Borrowed(raw),
            Token::Boolean { value } => Cow::Borrowed(if *value { "true" } else { "false" }),
            Token::Null => Cow::Borrowed("null"),
        }
    }

    /// Returns `true` if the token is a [`Whitespace`] run.
    ///
    /// [`Whitespace`]: Token::Whitespace
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace { .. })
    }

    /// Returns the role if this token is part of a string, otherwise `None`.
    #[must_use]
    pub fn string_role(&self) -> Option<StringRole> {
        match self {
            Token::StringStart { role }
            | Token::StringChunk { role, .. }
            | Token::StringEnd { role } => Some(*role),
            _ => None,
        }
    }
}
