//! Token stream to text stream.
//!
//! The stringifier emits each token's raw text verbatim and performs no
//! validation, so a parse → stringify round-trip is byte-exact. It cannot
//! fail on its own; upstream errors are forwarded unchanged.

use crate::{StreamError, Token};

/// An iterator adapter turning tokens into text fragments, one fragment per
/// token.
///
/// # Examples
///
/// ```
/// use jsonflume::{ParserOptions, StreamingParser, Stringifier};
///
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// parser.feed("[1, true]");
/// let text: String = Stringifier::new(parser.finish())
///     .map(|f| f.unwrap())
///     .collect();
/// assert_eq!(text, "[1, true]");
/// ```
#[derive(Debug)]
pub struct Stringifier<I> {
    input: I,
}

impl<I> Stringifier<I>
where
    I: Iterator<Item = Result<Token, StreamError>>,
{
    pub fn new(input: impl IntoIterator<IntoIter = I, Item = Result<Token, StreamError>>) -> Self {
        Self {
            input: input.into_iter(),
        }
    }
}

impl<I> Iterator for Stringifier<I>
where
    I: Iterator<Item = Result<Token, StreamError>>,
{
    type Item = Result<String, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.input
            .next()
            .map(|result| result.map(|token| token.raw().into_owned()))
    }
}

/// Renders an infallible token sequence to a single string.
pub fn stringify_tokens<I>(tokens: I) -> String
where
    I: IntoIterator<Item = Token>,
{
    let mut out = String::new();
    for token in tokens {
        out.push_str(&token.raw());
    }
    out
}

/// Drains a fallible token stream to a single string, stopping at the first
/// error.
pub fn stringify_stream<I>(stream: I) -> Result<String, StreamError>
where
    I: IntoIterator<Item = Result<Token, StreamError>>,
{
    let mut out = String::new();
    for token in stream {
        out.push_str(&token?.raw());
    }
    Ok(out)
}
