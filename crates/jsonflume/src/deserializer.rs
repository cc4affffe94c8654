//! Token streams back to materialised values.
//!
//! The [`Deserializer`] rebuilds [`Value`]s from a token stream by keeping
//! one frame per open container. Streams holding several top-level values —
//! multi-document parses, selector output — yield one [`ValueAt`] per
//! completed root, tagged with the path the closing token carried.

use crate::{
    token::{StringRole, Token},
    Map, Path, PathedToken, StreamError, Value,
};

/// A materialised value and the path it was rooted at.
///
/// Plain parser output roots everything at the empty path; selector output
/// keeps the matched location.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAt {
    pub path: Path,
    pub value: Value,
}

enum Frame {
    Array(Vec<Value>),
    Object { map: Map, key: Option<String> },
}

/// Streaming deserializer over path-annotated tokens.
///
/// # Examples
///
/// ```
/// use jsonflume::{from_tokens, ParserOptions, StreamingParser, Value};
///
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// parser.feed(r#"{"a": [1, true]}"#);
/// let values: Vec<_> = from_tokens(parser.finish())
///     .map(|v| v.unwrap().value)
///     .collect();
/// assert_eq!(values.len(), 1);
/// assert!(values[0].is_object());
/// ```
pub struct Deserializer<I> {
    input: I,
    frames: Vec<Frame>,
    string_buf: String,
    key_buf: String,
    done: bool,
}

impl<I> Deserializer<I>
where
    I: Iterator<Item = Result<PathedToken, StreamError>>,
{
    pub fn new(
        input: impl IntoIterator<IntoIter = I, Item = Result<PathedToken, StreamError>>,
    ) -> Self {
        Self {
            input: input.into_iter(),
            frames: Vec::new(),
            string_buf: String::new(),
            key_buf: String::new(),
            done: false,
        }
    }

    /// Feeds one token into the frame stack; returns a finished root, if
    /// this token completed one.
    fn accept(&mut self, pathed: PathedToken) -> Option<ValueAt> {
        let PathedToken { path, token } = pathed;
        match token {
            Token::ObjectStart => {
                self.frames.push(Frame::Object {
                    map: Map::new(),
                    key: None,
                });
                None
            }
            Token::ArrayStart => {
                self.frames.push(Frame::Array(Vec::new()));
                None
            }
            Token::ObjectEnd => {
                let value = match self.frames.pop() {
                    Some(Frame::Object { map, .. }) => Value::Object(map),
                    // Tolerate malformed input; the parser never produces it.
                    _ => return None,
                };
                self.place(value, path)
            }
            Token::ArrayEnd => {
                let value = match self.frames.pop() {
                    Some(Frame::Array(items)) => Value::Array(items),
                    _ => return None,
                };
                self.place(value, path)
            }
            Token::StringStart { role: StringRole::Key } => {
                self.key_buf.clear();
                None
            }
            Token::StringChunk {
                role: StringRole::Key,
                fragment,
                ..
            } => {
                self.key_buf.push_str(&fragment);
                None
            }
            Token::StringEnd { role: StringRole::Key } => {
                if let Some(Frame::Object { key, .. }) = self.frames.last_mut() {
                    *key = Some(std::mem::take(&mut self.key_buf));
                }
                None
            }
            Token::StringStart {
                role: StringRole::Value,
            } => {
                self.string_buf.clear();
                None
            }
            Token::StringChunk {
                role: StringRole::Value,
                fragment,
                ..
            } => {
                self.string_buf.push_str(&fragment);
                None
            }
            Token::StringEnd {
                role: StringRole::Value,
            } => {
                let value = Value::String(std::mem::take(&mut self.string_buf));
                self.place(value, path)
            }
            Token::Number { value, .. } => self.place(Value::Number(value), path),
            Token::Boolean { value } => self.place(Value::Boolean(value), path),
            Token::Null => self.place(Value::Null, path),
            Token::Whitespace { .. } | Token::Comma | Token::Colon => None,
        }
    }

    /// Writes a completed value into the parent container, or emits it as a
    /// root when no container is open.
    fn place(&mut self, value: Value, path: Path) -> Option<ValueAt> {
        match self.frames.last_mut() {
            None => Some(ValueAt { path, value }),
            Some(Frame::Array(items)) => {
                items.push(value);
                None
            }
            Some(Frame::Object { map, key }) => {
                // Duplicate keys collapse to the last writer.
                map.insert(key.take().unwrap_or_default(), value);
                None
            }
        }
    }
}

impl<I> Iterator for Deserializer<I>
where
    I: Iterator<Item = Result<PathedToken, StreamError>>,
{
    type Item = Result<ValueAt, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.input.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err));
                }
                Some(Ok(pathed)) => {
                    if let Some(root) = self.accept(pathed) {
                        return Some(Ok(root));
                    }
                }
            }
        }
    }
}

/// Deserializes a stream of plain tokens, rooting every document at the
/// empty path.
pub fn from_tokens<T>(
    tokens: T,
) -> Deserializer<impl Iterator<Item = Result<PathedToken, StreamError>>>
where
    T: IntoIterator<Item = Result<Token, StreamError>>,
{
    Deserializer::new(tokens.into_iter().map(|result| {
        result.map(|token| PathedToken {
            path: Path::new(),
            token,
        })
    }))
}
