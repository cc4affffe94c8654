//! Source values to token streams.
//!
//! The [`Serializer`] walks a [`SourceValue`] with an explicit frame stack,
//! resolving lazy layers and draining stream tags only when their tokens are
//! demanded. Output honours the same token-stream invariants the parser
//! guarantees, so serializer output can be stringified, path-annotated,
//! selected and deserialized like parsed input.
//!
//! # Examples
//!
//! ```
//! use jsonflume::{stringify_stream, Serializer, SourceKey, SourceValue};
//!
//! let source = SourceValue::Object(vec![(
//!     SourceKey::from("test"),
//!     SourceValue::string_stream(["chunk1".to_string(), "chunk2".to_string()]),
//! )]);
//! let text = stringify_stream(Serializer::new(source)).unwrap();
//! assert_eq!(text, r#"{"test":"chunk1chunk2"}"#);
//! ```

use std::collections::VecDeque;

use crate::{
    parser::{ClosedStreamingParser, ParserOptions, StreamingParser},
    source::{ArrayStream, ObjectStream, SourceKey, SourceValue, StringStream},
    token::{StringRole, Token},
    value::escape_string,
    StreamError,
};

/// Pretty-printing indentation.
///
/// One level of indentation is either a fixed number of spaces or an
/// arbitrary string; zero spaces or an empty string disable pretty-printing
/// entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Indent {
    #[default]
    None,
    Spaces(usize),
    Text(String),
}

impl Indent {
    fn unit(&self) -> Option<String> {
        match self {
            Indent::None | Indent::Spaces(0) => None,
            Indent::Spaces(n) => Some(" ".repeat(*n)),
            Indent::Text(s) if s.is_empty() => None,
            Indent::Text(s) => Some(s.clone()),
        }
    }
}

/// Configuration options for the serializer.
#[derive(Debug, Clone, Default)]
pub struct SerializerOptions {
    pub indent: Indent,
}

enum Frame {
    /// A value waiting to be serialized. `key` is the hint passed to render
    /// hooks; `absent_as_null` marks array-element position.
    Value {
        value: SourceValue,
        key: String,
        absent_as_null: bool,
    },
    ArrayItems {
        items: ArrayStream,
        first: bool,
        index: usize,
    },
    ObjectEntries {
        entries: ObjectStream,
        first: bool,
    },
    StringBody {
        fragments: StringStream,
        role: StringRole,
    },
    /// Emits the colon (and its pretty-print space) between a streamed key
    /// and its value.
    Colon,
    /// Forwards the tokens of a re-parsed raw JSON fragment.
    Splice { parser: ClosedStreamingParser },
}

/// Streaming serializer for one source value.
///
/// Yields one token per `next()` call; producer failures terminate the
/// stream with [`StreamError::Producer`].
pub struct Serializer {
    frames: Vec<Frame>,
    queued: VecDeque<Token>,
    indent: Option<String>,
    depth: usize,
    failed: bool,
}

impl Serializer {
    #[must_use]
    pub fn new(source: SourceValue) -> Self {
        Self::with_options(source, SerializerOptions::default())
    }

    #[must_use]
    pub fn with_options(source: SourceValue, options: SerializerOptions) -> Self {
        Self {
            frames: vec![Frame::Value {
                value: source,
                key: String::new(),
                absent_as_null: false,
            }],
            queued: VecDeque::new(),
            indent: options.indent.unit(),
            depth: 0,
            failed: false,
        }
    }

    /// Peels lazy layers until a token-producing shape remains.
    fn resolve(mut value: SourceValue, key: &str) -> Result<SourceValue, StreamError> {
        loop {
            value = match value {
                SourceValue::Lazy(thunk) => thunk()?,
                SourceValue::Rendered(hook) => hook.render_json(key),
                concrete => return Ok(concrete),
            };
        }
    }

    fn process(&mut self, frame: Frame) -> Result<(), StreamError> {
        match frame {
            Frame::Value {
                value,
                key,
                absent_as_null,
            } => {
                let resolved = Self::resolve(value, &key)?;
                self.emit_value(resolved, absent_as_null);
            }
            Frame::ArrayItems {
                mut items,
                first,
                index,
            } => match items.next() {
                None => self.close_container(Token::ArrayEnd, first),
                Some(Err(err)) => return Err(err.into()),
                Some(Ok(value)) => {
                    if !first {
                        self.queued.push_back(Token::Comma);
                    }
                    self.queue_item_whitespace();
                    self.frames.push(Frame::ArrayItems {
                        items,
                        first: false,
                        index: index + 1,
                    });
                    self.frames.push(Frame::Value {
                        value,
                        key: index.to_string(),
                        absent_as_null: true,
                    });
                }
            },
            Frame::ObjectEntries { mut entries, first } => match entries.next() {
                None => self.close_container(Token::ObjectEnd, first),
                Some(Err(err)) => return Err(err.into()),
                Some(Ok((key, value))) => {
                    let key_hint = match &key {
                        SourceKey::Text(k) => k.clone(),
                        SourceKey::Stream(_) => String::new(),
                    };
                    // Resolve before emitting the key so absent entries
                    // leave no trace, including their comma.
                    let resolved = Self::resolve(value, &key_hint)?;
                    if matches!(resolved, SourceValue::Absent) {
                        self.frames.push(Frame::ObjectEntries { entries, first });
                        return Ok(());
                    }
                    if !first {
                        self.queued.push_back(Token::Comma);
                    }
                    self.queue_item_whitespace();
                    self.frames.push(Frame::ObjectEntries {
                        entries,
                        first: false,
                    });
                    self.frames.push(Frame::Value {
                        value: resolved,
                        key: key_hint,
                        absent_as_null: false,
                    });
                    self.frames.push(Frame::Colon);
                    match key {
                        SourceKey::Text(k) => {
                            self.queue_string(StringRole::Key, &k);
                        }
                        SourceKey::Stream(fragments) => {
                            self.queued.push_back(Token::StringStart {
                                role: StringRole::Key,
                            });
                            self.frames.push(Frame::StringBody {
                                fragments,
                                role: StringRole::Key,
                            });
                        }
                    }
                }
            },
            Frame::StringBody {
                mut fragments,
                role,
            } => match fragments.next() {
                None => self.queued.push_back(Token::StringEnd { role }),
                Some(Err(err)) => return Err(err.into()),
                Some(Ok(fragment)) => {
                    self.queued.push_back(Token::StringChunk {
                        role,
                        raw: escape_string(&fragment),
                        fragment,
                    });
                    self.frames.push(Frame::StringBody { fragments, role });
                }
            },
            Frame::Colon => {
                self.queued.push_back(Token::Colon);
                if self.indent.is_some() {
                    self.queued.push_back(Token::Whitespace {
                        raw: " ".to_string(),
                    });
                }
            }
            Frame::Splice { mut parser } => match parser.next() {
                None => {}
                Some(Err(err)) => return Err(err),
                Some(Ok(token)) => {
                    self.queued.push_back(token);
                    self.frames.push(Frame::Splice { parser });
                }
            },
        }
        Ok(())
    }

    fn emit_value(&mut self, value: SourceValue, absent_as_null: bool) {
        match value {
            SourceValue::Null => self.queued.push_back(Token::Null),
            SourceValue::Boolean(b) => self.queued.push_back(Token::Boolean { value: b }),
            SourceValue::Number(n) if n.is_finite() => self.queued.push_back(Token::Number {
                value: n,
                raw: n.to_string(),
            }),
            // Non-finite numbers have no JSON spelling; `null` is the
            // textual convention.
            SourceValue::Number(_) => self.queued.push_back(Token::Null),
            SourceValue::BigInt(i) => {
                #[allow(clippy::cast_precision_loss)]
                self.queued.push_back(Token::Number {
                    value: i as f64,
                    raw: i.to_string(),
                });
            }
            SourceValue::String(s) => self.queue_string(StringRole::Value, &s),
            SourceValue::StringStream(fragments) => {
                self.queued.push_back(Token::StringStart {
                    role: StringRole::Value,
                });
                self.frames.push(Frame::StringBody {
                    fragments,
                    role: StringRole::Value,
                });
            }
            SourceValue::Array(items) => {
                self.open_array(Box::new(items.into_iter().map(Ok)));
            }
            SourceValue::ArrayStream(items) => self.open_array(items),
            SourceValue::Object(entries) => {
                self.open_object(Box::new(entries.into_iter().map(Ok)));
            }
            SourceValue::ObjectStream(entries) => self.open_object(entries),
            SourceValue::RawJson(text) => {
                let mut parser = StreamingParser::new(ParserOptions::default());
                parser.feed(&text);
                self.frames.push(Frame::Splice {
                    parser: parser.finish(),
                });
            }
            SourceValue::Absent => {
                if absent_as_null {
                    self.queued.push_back(Token::Null);
                }
            }
            SourceValue::Lazy(_) | SourceValue::Rendered(_) => {
                unreachable!("lazy layers are resolved before emission")
            }
        }
    }

    fn open_array(&mut self, items: ArrayStream) {
        self.queued.push_back(Token::ArrayStart);
        self.depth += 1;
        self.frames.push(Frame::ArrayItems {
            items,
            first: true,
            index: 0,
        });
    }

    fn open_object(&mut self, entries: ObjectStream) {
        self.queued.push_back(Token::ObjectStart);
        self.depth += 1;
        self.frames.push(Frame::ObjectEntries {
            entries,
            first: true,
        });
    }

    fn close_container(&mut self, end_token: Token, was_empty: bool) {
        if !was_empty {
            self.queue_close_whitespace();
        }
        self.queued.push_back(end_token);
        self.depth -= 1;
    }

    fn queue_string(&mut self, role: StringRole, text: &str) {
        self.queued.push_back(Token::StringStart { role });
        if !text.is_empty() {
            self.queued.push_back(Token::StringChunk {
                role,
                fragment: text.to_string(),
                raw: escape_string(text),
            });
        }
        self.queued.push_back(Token::StringEnd { role });
    }

    /// Newline plus indentation before an item at the current depth.
    fn queue_item_whitespace(&mut self) {
        self.queue_indent(self.depth);
    }

    /// Newline plus indentation before a closing bracket.
    fn queue_close_whitespace(&mut self) {
        self.queue_indent(self.depth.saturating_sub(1));
    }

    fn queue_indent(&mut self, levels: usize) {
        if let Some(unit) = &self.indent {
            let mut raw = String::with_capacity(1 + unit.len() * levels);
            raw.push('\n');
            for _ in 0..levels {
                raw.push_str(unit);
            }
            self.queued.push_back(Token::Whitespace { raw });
        }
    }
}

impl Iterator for Serializer {
    type Item = Result<Token, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.queued.pop_front() {
                return Some(Ok(token));
            }
            if self.failed {
                return None;
            }
            let frame = self.frames.pop()?;
            if let Err(err) = self.process(frame) {
                self.failed = true;
                return Some(Err(err));
            }
        }
    }
}

/// Whitespace emitted around the documents of a multi-document stream.
///
/// The default frames documents as JSON Lines: no prefix, `"\n"` between
/// documents, no suffix.
#[derive(Debug, Clone)]
pub struct FramingOptions {
    /// Emitted before the first document.
    pub before_first: Option<String>,
    /// Emitted between adjacent documents.
    pub delimiter: String,
    /// Emitted after the last document.
    pub after_last: Option<String>,
}

impl Default for FramingOptions {
    fn default() -> Self {
        Self {
            before_first: None,
            delimiter: "\n".to_string(),
            after_last: None,
        }
    }
}

impl FramingOptions {
    /// JSON Lines framing (the default).
    #[must_use]
    pub fn jsonl() -> Self {
        Self::default()
    }

    /// RFC 7464 JSON text sequence framing: a record separator before each
    /// document, a newline after each.
    #[must_use]
    pub fn json_seq() -> Self {
        Self {
            before_first: Some("\u{1E}".to_string()),
            delimiter: "\n\u{1E}".to_string(),
            after_last: Some("\n".to_string()),
        }
    }
}

/// Serializes a sequence of source values as one multi-document token
/// stream with configurable framing.
///
/// Documents that produce no tokens (absent roots) are skipped and claim no
/// framing slot.
pub fn serialize_documents<I>(
    sources: I,
    options: SerializerOptions,
    framing: FramingOptions,
) -> DocumentSerializer<I::IntoIter>
where
    I: IntoIterator<Item = SourceValue>,
{
    DocumentSerializer {
        sources: sources.into_iter(),
        options,
        framing,
        current: None,
        pending: VecDeque::new(),
        emitted_any: false,
        done: false,
        failed: false,
    }
}

/// Multi-document serializer returned by [`serialize_documents`].
pub struct DocumentSerializer<I> {
    sources: I,
    options: SerializerOptions,
    framing: FramingOptions,
    current: Option<Serializer>,
    pending: VecDeque<Token>,
    emitted_any: bool,
    done: bool,
    failed: bool,
}

impl<I> Iterator for DocumentSerializer<I>
where
    I: Iterator<Item = SourceValue>,
{
    type Item = Result<Token, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.failed || self.done {
                return None;
            }
            if let Some(serializer) = &mut self.current {
                match serializer.next() {
                    Some(Ok(token)) => return Some(Ok(token)),
                    Some(Err(err)) => {
                        self.failed = true;
                        return Some(Err(err));
                    }
                    None => self.current = None,
                }
                continue;
            }
            match self.sources.next() {
                None => {
                    self.done = true;
                    if self.emitted_any {
                        if let Some(suffix) = &self.framing.after_last {
                            if !suffix.is_empty() {
                                self.pending.push_back(Token::Whitespace {
                                    raw: suffix.clone(),
                                });
                            }
                        }
                    }
                }
                Some(source) => {
                    let mut serializer = Serializer::with_options(source, self.options.clone());
                    match serializer.next() {
                        // An absent document: no tokens, no framing slot.
                        None => {}
                        Some(Err(err)) => {
                            self.failed = true;
                            return Some(Err(err));
                        }
                        Some(Ok(first_token)) => {
                            if self.emitted_any {
                                if !self.framing.delimiter.is_empty() {
                                    self.pending.push_back(Token::Whitespace {
                                        raw: self.framing.delimiter.clone(),
                                    });
                                }
                            } else if let Some(prefix) = &self.framing.before_first {
                                if !prefix.is_empty() {
                                    self.pending.push_back(Token::Whitespace {
                                        raw: prefix.clone(),
                                    });
                                }
                            }
                            self.emitted_any = true;
                            self.pending.push_back(first_token);
                            self.current = Some(serializer);
                        }
                    }
                }
            }
        }
    }
}
