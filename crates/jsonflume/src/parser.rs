//! The streaming JSON parser.
//!
//! [`StreamingParser`] consumes text in chunks of arbitrary size (chunk
//! boundaries need not align with token boundaries) and emits [`Token`]s as
//! soon as they are recognised. Buffered string fragments and whitespace are
//! flushed at every chunk boundary so consumers see data with minimal
//! latency; partial numbers are held back because only their terminating
//! character disambiguates them.
//!
//! # Examples
//!
//! ```rust
//! use jsonflume::{ParserOptions, StreamingParser, Token};
//!
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! parser.feed(r#"{"key": [null, true, 3.14]}"#);
//! for token in parser.finish() {
//!     let token = token.unwrap();
//!     println!("{token:?}");
//! }
//! ```

use std::collections::VecDeque;

use crate::{
    buffer::Buffer,
    escape_buffer::UnicodeEscapeBuffer,
    literal_buffer::{self, ExpectedLiteralBuffer},
    token::{StringRole, Token},
    StreamError,
};

/// RFC 7464 record separator, accepted as top-level framing in
/// multi-document mode.
const RECORD_SEPARATOR: char = '\u{1E}';

#[inline]
fn is_json_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Configuration options for the streaming parser.
///
/// # Examples
///
/// ```rust
/// use jsonflume::{ParserOptions, StreamingParser};
///
/// let parser = StreamingParser::new(ParserOptions {
///     allow_multiple_json_values: true,
/// });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Whether to parse multiple whitespace-delimited JSON values from a
    /// single input stream.
    ///
    /// When `true` the parser does not stop after the first top-level value
    /// but keeps accepting further values, supporting JSON Lines and
    /// RFC 7464 JSON text sequences (the record separator byte `0x1E` is
    /// accepted wherever top-level whitespace is accepted). Zero documents
    /// are permitted.
    ///
    /// # Default
    ///
    /// `false` — exactly one top-level value, anything else is an error.
    pub allow_multiple_json_values: bool,
}

/// Grammatical position within the document.
///
/// The after-`{`/`[` and after-comma positions are distinct states because
/// only the former accept an immediate closing bracket; RFC 8259 has no
/// trailing commas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Start,
    BeforeFirstPropertyName,
    BeforePropertyName,
    AfterPropertyName,
    BeforePropertyValue,
    BeforeFirstArrayValue,
    BeforeArrayValue,
    AfterPropertyValue,
    AfterArrayValue,
    End,
}

/// Position within the token currently being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Default,
    Whitespace,
    ValueLiteral,
    Sign,
    Zero,
    DecimalInteger,
    DecimalPoint,
    DecimalFraction,
    DecimalExponent,
    DecimalExponentSign,
    DecimalExponentInteger,
    InString,
    StringEscape,
    StringEscapeUnicode,
}

/// One entry per open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeekedChar {
    /// The buffer is empty but the stream is still open.
    Empty,
    Char(char),
    /// The input stream is closed.
    EndOfInput,
}

enum Progress {
    Continue,
    NeedMoreInput,
    Finished,
}

/// The streaming JSON parser.
///
/// Feed it text with [`feed`](StreamingParser::feed) and drain tokens
/// through its `Iterator` implementation; the iterator returns `None` when
/// the buffered input is exhausted and can be resumed after the next
/// `feed`. Call [`finish`](StreamingParser::finish) to close the input and
/// drain the remaining tokens.
#[derive(Debug)]
pub struct StreamingParser {
    source: Buffer,
    end_of_input: bool,

    /// Character offset since the start of the stream, for error context.
    pos: usize,

    parse_state: ParseState,
    lex_state: LexState,
    frames: Vec<Frame>,
    events: VecDeque<Token>,
    errored: bool,

    multiple_values: bool,

    // Token accumulation.
    ws_buf: String,
    num_buf: String,
    str_fragment: String,
    str_raw: String,
    /// Raw text of an escape sequence in flight. Held out of `str_raw` so a
    /// chunk flush can never split a `\uXXXX` escape.
    pending_escape_raw: String,
    unicode_escape: UnicodeEscapeBuffer,
    high_surrogate: Option<u16>,
    expected_literal: ExpectedLiteralBuffer,
    string_role: StringRole,
}

impl Default for StreamingParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl Iterator for StreamingParser {
    type Item = Result<Token, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// A [`StreamingParser`] that has been closed to further input.
///
/// Returned by [`StreamingParser::finish`]; iterating it yields the
/// remaining tokens and then ends.
#[derive(Debug)]
pub struct ClosedStreamingParser {
    parser: StreamingParser,
}

impl Iterator for ClosedStreamingParser {
    type Item = Result<Token, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parser.next_token()
    }
}

impl StreamingParser {
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self {
            source: Buffer::new(),
            end_of_input: false,
            pos: 0,
            parse_state: ParseState::Start,
            lex_state: LexState::Default,
            frames: Vec::with_capacity(16),
            events: VecDeque::new(),
            errored: false,
            multiple_values: options.allow_multiple_json_values,
            ws_buf: String::new(),
            num_buf: String::new(),
            str_fragment: String::new(),
            str_raw: String::new(),
            pending_escape_raw: String::new(),
            unicode_escape: UnicodeEscapeBuffer::new(),
            high_surrogate: None,
            expected_literal: ExpectedLiteralBuffer::none(),
            string_role: StringRole::Value,
        }
    }

    /// Feeds a chunk of JSON text into the parser.
    ///
    /// The chunk may end anywhere, including inside a string, a number or an
    /// escape sequence. Tokens become available through the iterator.
    pub fn feed(&mut self, text: &str) {
        self.source.push(text);
    }

    /// Marks the end of input and returns a closed parser that drains the
    /// pending tokens.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonflume::{ParserOptions, StreamingParser, Token};
    ///
    /// let mut parser = StreamingParser::new(ParserOptions::default());
    /// parser.feed("true");
    /// let mut closed = parser.finish();
    /// assert_eq!(
    ///     closed.next().unwrap().unwrap(),
    ///     Token::Boolean { value: true }
    /// );
    /// ```
    #[must_use]
    pub fn finish(mut self) -> ClosedStreamingParser {
        self.end_of_input = true;
        ClosedStreamingParser { parser: self }
    }

    /// Drives the parser until it either produces one token, needs more
    /// input, finishes, or fails.
    fn next_token(&mut self) -> Option<Result<Token, StreamError>> {
        if self.errored {
            return None;
        }
        loop {
            if let Some(token) = self.events.pop_front() {
                return Some(Ok(token));
            }
            match self.step() {
                Ok(Progress::Continue) => {}
                Ok(Progress::NeedMoreInput) => {
                    // Chunk-boundary flush: emit buffered string fragments
                    // and whitespace, never partial numbers or escapes.
                    self.flush_partial();
                    return self.events.pop_front().map(Ok);
                }
                Ok(Progress::Finished) => {
                    return self.events.pop_front().map(Ok);
                }
                Err(err) => {
                    self.errored = true;
                    return Some(Err(err));
                }
            }
        }
    }

    /// Processes one input character (or the end-of-input condition).
    fn step(&mut self) -> Result<Progress, StreamError> {
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            self.pending_escape_raw.is_empty()
                || matches!(
                    self.lex_state,
                    LexState::InString | LexState::StringEscape | LexState::StringEscapeUnicode
                ),
            "escape text leaked outside string states"
        );

        // Between documents a multi-value parser simply starts over.
        if self.multiple_values && self.parse_state == ParseState::End {
            self.parse_state = ParseState::Start;
        }

        let next_char = match self.source.peek() {
            Some(ch) => PeekedChar::Char(ch),
            None if self.end_of_input => PeekedChar::EndOfInput,
            None => return Ok(Progress::NeedMoreInput),
        };

        match self.lex_state {
            LexState::Default => self.lex_default(next_char),
            LexState::Whitespace => self.lex_whitespace(),
            LexState::ValueLiteral => self.lex_literal(next_char),
            LexState::Sign
            | LexState::Zero
            | LexState::DecimalInteger
            | LexState::DecimalPoint
            | LexState::DecimalFraction
            | LexState::DecimalExponent
            | LexState::DecimalExponentSign
            | LexState::DecimalExponentInteger => self.lex_number(next_char),
            LexState::InString => self.lex_string(next_char),
            LexState::StringEscape => self.lex_string_escape(next_char),
            LexState::StringEscapeUnicode => self.lex_string_escape_unicode(next_char),
        }
    }

    // --------------------------------------------------------------------
    // Default state: whitespace entry and structural dispatch
    // --------------------------------------------------------------------

    fn lex_default(&mut self, next_char: PeekedChar) -> Result<Progress, StreamError> {
        match next_char {
            PeekedChar::Empty => Ok(Progress::NeedMoreInput),
            PeekedChar::EndOfInput => match self.parse_state {
                ParseState::End => Ok(Progress::Finished),
                ParseState::Start if self.multiple_values => Ok(Progress::Finished),
                _ => Err(StreamError::PrematureEnd),
            },
            PeekedChar::Char(c) if is_json_whitespace(c) => {
                self.lex_state = LexState::Whitespace;
                Ok(Progress::Continue)
            }
            PeekedChar::Char(RECORD_SEPARATOR) if self.record_separator_allowed() => {
                self.lex_state = LexState::Whitespace;
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c) => self.dispatch(c),
        }
    }

    /// The RFC 7464 record separator counts as whitespace only at the top
    /// level of a multi-document stream.
    fn record_separator_allowed(&self) -> bool {
        self.multiple_values && self.frames.is_empty() && self.parse_state == ParseState::Start
    }

    fn lex_whitespace(&mut self) -> Result<Progress, StreamError> {
        let rs_allowed = self.record_separator_allowed();
        let run = self.source.take_run(|c| {
            is_json_whitespace(c) || (rs_allowed && c == RECORD_SEPARATOR)
        });
        self.pos += run.len();
        self.ws_buf.extend(run);

        if self.source.peek().is_none() && !self.end_of_input {
            return Ok(Progress::NeedMoreInput);
        }
        self.flush_whitespace();
        self.lex_state = LexState::Default;
        Ok(Progress::Continue)
    }

    fn dispatch(&mut self, c: char) -> Result<Progress, StreamError> {
        match self.parse_state {
            ParseState::Start | ParseState::BeforePropertyValue | ParseState::BeforeArrayValue => {
                self.begin_value(c)
            }
            ParseState::BeforeFirstArrayValue => {
                if c == ']' {
                    self.advance_char();
                    self.close_container(Token::ArrayEnd);
                    Ok(Progress::Continue)
                } else {
                    self.begin_value(c)
                }
            }
            ParseState::BeforeFirstPropertyName => match c {
                '}' => {
                    self.advance_char();
                    self.close_container(Token::ObjectEnd);
                    Ok(Progress::Continue)
                }
                '"' => {
                    self.advance_char();
                    self.begin_string(StringRole::Key);
                    Ok(Progress::Continue)
                }
                _ => Err(self.unexpected(c)),
            },
            ParseState::BeforePropertyName => match c {
                '"' => {
                    self.advance_char();
                    self.begin_string(StringRole::Key);
                    Ok(Progress::Continue)
                }
                _ => Err(self.unexpected(c)),
            },
            ParseState::AfterPropertyName => match c {
                ':' => {
                    self.advance_char();
                    self.events.push_back(Token::Colon);
                    self.parse_state = ParseState::BeforePropertyValue;
                    Ok(Progress::Continue)
                }
                _ => Err(self.unexpected(c)),
            },
            ParseState::AfterPropertyValue => match c {
                ',' => {
                    self.advance_char();
                    self.events.push_back(Token::Comma);
                    self.parse_state = ParseState::BeforePropertyName;
                    Ok(Progress::Continue)
                }
                '}' => {
                    self.advance_char();
                    self.close_container(Token::ObjectEnd);
                    Ok(Progress::Continue)
                }
                _ => Err(self.unexpected(c)),
            },
            ParseState::AfterArrayValue => match c {
                ',' => {
                    self.advance_char();
                    self.events.push_back(Token::Comma);
                    self.parse_state = ParseState::BeforeArrayValue;
                    Ok(Progress::Continue)
                }
                ']' => {
                    self.advance_char();
                    self.close_container(Token::ArrayEnd);
                    Ok(Progress::Continue)
                }
                _ => Err(self.unexpected(c)),
            },
            // Anything after the single document is an error; multi-value
            // parsers never reach here in the End state.
            ParseState::End => Err(self.unexpected(c)),
        }
    }

    fn begin_value(&mut self, c: char) -> Result<Progress, StreamError> {
        match c {
            '{' => {
                self.advance_char();
                self.events.push_back(Token::ObjectStart);
                self.frames.push(Frame::Object);
                self.parse_state = ParseState::BeforeFirstPropertyName;
            }
            '[' => {
                self.advance_char();
                self.events.push_back(Token::ArrayStart);
                self.frames.push(Frame::Array);
                self.parse_state = ParseState::BeforeFirstArrayValue;
            }
            '"' => {
                self.advance_char();
                self.begin_string(StringRole::Value);
            }
            'n' | 't' | 'f' => {
                self.advance_char();
                self.expected_literal = ExpectedLiteralBuffer::new(c);
                self.lex_state = LexState::ValueLiteral;
            }
            '-' => {
                self.advance_char();
                self.num_buf.push('-');
                self.lex_state = LexState::Sign;
            }
            '0' => {
                self.advance_char();
                self.num_buf.push('0');
                self.lex_state = LexState::Zero;
            }
            '1'..='9' => {
                self.advance_char();
                self.num_buf.push(c);
                self.lex_state = LexState::DecimalInteger;
            }
            _ => return Err(self.unexpected(c)),
        }
        Ok(Progress::Continue)
    }

    fn begin_string(&mut self, role: StringRole) {
        self.string_role = role;
        self.str_fragment.clear();
        self.str_raw.clear();
        self.events.push_back(Token::StringStart { role });
        self.lex_state = LexState::InString;
    }

    fn close_container(&mut self, end_token: Token) {
        self.events.push_back(end_token);
        self.frames.pop();
        self.parse_state = self.after_value_state();
    }

    fn after_value_state(&self) -> ParseState {
        match self.frames.last() {
            None => ParseState::End,
            Some(Frame::Array) => ParseState::AfterArrayValue,
            Some(Frame::Object) => ParseState::AfterPropertyValue,
        }
    }

    // --------------------------------------------------------------------
    // Literals
    // --------------------------------------------------------------------

    fn lex_literal(&mut self, next_char: PeekedChar) -> Result<Progress, StreamError> {
        match next_char {
            PeekedChar::Empty => Ok(Progress::NeedMoreInput),
            PeekedChar::EndOfInput => Err(StreamError::PrematureEnd),
            PeekedChar::Char(c) => match self.expected_literal.step(c) {
                literal_buffer::Step::NeedMore => {
                    self.advance_char();
                    Ok(Progress::Continue)
                }
                literal_buffer::Step::Done(token) => {
                    self.advance_char();
                    self.events.push_back(token);
                    self.lex_state = LexState::Default;
                    self.parse_state = self.after_value_state();
                    Ok(Progress::Continue)
                }
                literal_buffer::Step::Reject => Err(self.unexpected(c)),
            },
        }
    }

    // --------------------------------------------------------------------
    // Numbers
    // --------------------------------------------------------------------

    fn lex_number(&mut self, next_char: PeekedChar) -> Result<Progress, StreamError> {
        let c = match next_char {
            PeekedChar::Empty => return Ok(Progress::NeedMoreInput),
            PeekedChar::EndOfInput => {
                return if self.number_may_terminate() {
                    self.emit_number();
                    Ok(Progress::Continue)
                } else {
                    Err(StreamError::PrematureEnd)
                };
            }
            PeekedChar::Char(c) => c,
        };

        match self.lex_state {
            LexState::Sign => match c {
                '0' => self.consume_number_char(c, LexState::Zero),
                '1'..='9' => self.consume_number_char(c, LexState::DecimalInteger),
                _ => return Err(self.unexpected(c)),
            },
            LexState::Zero => match c {
                '.' => self.consume_number_char(c, LexState::DecimalPoint),
                'e' | 'E' => self.consume_number_char(c, LexState::DecimalExponent),
                _ => self.emit_number(),
            },
            LexState::DecimalInteger => match c {
                '.' => self.consume_number_char(c, LexState::DecimalPoint),
                'e' | 'E' => self.consume_number_char(c, LexState::DecimalExponent),
                '0'..='9' => {
                    self.consume_number_char(c, LexState::DecimalInteger);
                    self.copy_digits();
                }
                _ => self.emit_number(),
            },
            LexState::DecimalPoint => match c {
                '0'..='9' => {
                    self.consume_number_char(c, LexState::DecimalFraction);
                    self.copy_digits();
                }
                _ => return Err(self.unexpected(c)),
            },
            LexState::DecimalFraction => match c {
                'e' | 'E' => self.consume_number_char(c, LexState::DecimalExponent),
                '0'..='9' => {
                    self.consume_number_char(c, LexState::DecimalFraction);
                    self.copy_digits();
                }
                _ => self.emit_number(),
            },
            LexState::DecimalExponent => match c {
                '+' | '-' => self.consume_number_char(c, LexState::DecimalExponentSign),
                '0'..='9' => {
                    self.consume_number_char(c, LexState::DecimalExponentInteger);
                    self.copy_digits();
                }
                _ => return Err(self.unexpected(c)),
            },
            LexState::DecimalExponentSign => match c {
                '0'..='9' => {
                    self.consume_number_char(c, LexState::DecimalExponentInteger);
                    self.copy_digits();
                }
                _ => return Err(self.unexpected(c)),
            },
            LexState::DecimalExponentInteger => match c {
                '0'..='9' => {
                    self.consume_number_char(c, LexState::DecimalExponentInteger);
                    self.copy_digits();
                }
                _ => self.emit_number(),
            },
            _ => unreachable!("lex_number called outside number states"),
        }
        Ok(Progress::Continue)
    }

    fn number_may_terminate(&self) -> bool {
        matches!(
            self.lex_state,
            LexState::Zero
                | LexState::DecimalInteger
                | LexState::DecimalFraction
                | LexState::DecimalExponentInteger
        )
    }

    fn consume_number_char(&mut self, c: char, next: LexState) {
        self.advance_char();
        self.num_buf.push(c);
        self.lex_state = next;
    }

    fn copy_digits(&mut self) {
        let run = self.source.take_run(|d| d.is_ascii_digit());
        self.pos += run.len();
        self.num_buf.extend(run);
    }

    fn emit_number(&mut self) {
        let raw = std::mem::take(&mut self.num_buf);
        let value = raw
            .parse::<f64>()
            .expect("lexer only accumulates valid JSON numbers");
        self.events.push_back(Token::Number { value, raw });
        self.lex_state = LexState::Default;
        self.parse_state = self.after_value_state();
    }

    // --------------------------------------------------------------------
    // Strings
    // --------------------------------------------------------------------

    fn lex_string(&mut self, next_char: PeekedChar) -> Result<Progress, StreamError> {
        match next_char {
            PeekedChar::Empty => Ok(Progress::NeedMoreInput),
            PeekedChar::EndOfInput => Err(StreamError::PrematureEnd),
            PeekedChar::Char('\\') => {
                self.advance_char();
                self.pending_escape_raw.push('\\');
                self.lex_state = LexState::StringEscape;
                Ok(Progress::Continue)
            }
            // A high surrogate must be immediately followed by its low
            // partner's escape.
            PeekedChar::Char(c) if self.high_surrogate.is_some() => Err(self.unexpected(c)),
            PeekedChar::Char('"') => {
                self.advance_char();
                self.flush_string_chunk();
                self.events.push_back(Token::StringEnd {
                    role: self.string_role,
                });
                self.lex_state = LexState::Default;
                self.parse_state = if self.string_role == StringRole::Key {
                    ParseState::AfterPropertyName
                } else {
                    self.after_value_state()
                };
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c) if (c as u32) < 0x20 => Err(self.unexpected(c)),
            PeekedChar::Char(_) => {
                // Claim the longest run of plain characters in one pass; the
                // raw text of an unescaped run equals its decoded text, so
                // the same run feeds both accumulators.
                let run = self
                    .source
                    .take_run(|ch| ch != '"' && ch != '\\' && ch >= '\u{20}');
                self.pos += run.len();
                self.str_fragment.extend(run);
                self.str_raw.extend(run);
                Ok(Progress::Continue)
            }
        }
    }

    fn lex_string_escape(&mut self, next_char: PeekedChar) -> Result<Progress, StreamError> {
        match next_char {
            PeekedChar::Empty => Ok(Progress::NeedMoreInput),
            PeekedChar::EndOfInput => Err(StreamError::PrematureEnd),
            PeekedChar::Char('u') => {
                self.advance_char();
                self.pending_escape_raw.push('u');
                self.unicode_escape.reset();
                self.lex_state = LexState::StringEscapeUnicode;
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c) if self.high_surrogate.is_some() => Err(self.unexpected(c)),
            PeekedChar::Char(c @ ('"' | '\\' | '/')) => {
                self.simple_escape(c, c);
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c @ 'b') => {
                self.simple_escape(c, '\u{0008}');
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c @ 'f') => {
                self.simple_escape(c, '\u{000C}');
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c @ 'n') => {
                self.simple_escape(c, '\n');
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c @ 'r') => {
                self.simple_escape(c, '\r');
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c @ 't') => {
                self.simple_escape(c, '\t');
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c) => Err(self.unexpected(c)),
        }
    }

    fn simple_escape(&mut self, raw_char: char, decoded: char) {
        self.advance_char();
        self.pending_escape_raw.push(raw_char);
        self.commit_escape(decoded);
        self.lex_state = LexState::InString;
    }

    /// Moves a completed escape into the chunk buffers: the raw spelling and
    /// its decoded character land together, so a flush can never split them.
    fn commit_escape(&mut self, decoded: char) {
        self.str_raw.push_str(&self.pending_escape_raw);
        self.pending_escape_raw.clear();
        self.str_fragment.push(decoded);
    }

    fn lex_string_escape_unicode(&mut self, next_char: PeekedChar) -> Result<Progress, StreamError> {
        match next_char {
            PeekedChar::Empty => Ok(Progress::NeedMoreInput),
            PeekedChar::EndOfInput => Err(StreamError::PrematureEnd),
            PeekedChar::Char(c) if c.is_ascii_hexdigit() => {
                self.advance_char();
                self.pending_escape_raw.push(c);
                if let Some(code) = self.unicode_escape.feed(c) {
                    self.complete_unicode_escape(code, c)?;
                }
                Ok(Progress::Continue)
            }
            PeekedChar::Char(c) => Err(self.unexpected(c)),
        }
    }

    fn complete_unicode_escape(&mut self, code: u32, last_digit: char) -> Result<(), StreamError> {
        // The digit was already consumed; report it at its own offset.
        let reject = StreamError::UnexpectedCharacter {
            ch: last_digit,
            offset: self.pos - 1,
        };
        match (code, self.high_surrogate) {
            // High surrogate: wait for the low half before committing, so
            // the pair is absorbed atomically.
            (0xD800..=0xDBFF, None) => {
                #[allow(clippy::cast_possible_truncation)]
                {
                    self.high_surrogate = Some(code as u16);
                }
                self.lex_state = LexState::InString;
                Ok(())
            }
            (0xDC00..=0xDFFF, Some(high)) => {
                let combined = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (code - 0xDC00);
                let decoded = char::from_u32(combined).ok_or(reject)?;
                self.high_surrogate = None;
                self.commit_escape(decoded);
                self.lex_state = LexState::InString;
                Ok(())
            }
            // Unpaired surrogates cannot form a scalar value.
            (0xD800..=0xDFFF, _) => Err(reject),
            (_, Some(_)) => Err(reject),
            (code, None) => {
                let decoded = char::from_u32(code).ok_or(reject)?;
                self.commit_escape(decoded);
                self.lex_state = LexState::InString;
                Ok(())
            }
        }
    }

    // --------------------------------------------------------------------
    // Flushing and bookkeeping
    // --------------------------------------------------------------------

    fn flush_partial(&mut self) {
        match self.lex_state {
            LexState::Whitespace => self.flush_whitespace(),
            LexState::InString | LexState::StringEscape | LexState::StringEscapeUnicode => {
                self.flush_string_chunk();
            }
            _ => {}
        }
    }

    fn flush_whitespace(&mut self) {
        if !self.ws_buf.is_empty() {
            self.events.push_back(Token::Whitespace {
                raw: std::mem::take(&mut self.ws_buf),
            });
        }
    }

    fn flush_string_chunk(&mut self) {
        if !self.str_raw.is_empty() {
            self.events.push_back(Token::StringChunk {
                role: self.string_role,
                fragment: std::mem::take(&mut self.str_fragment),
                raw: std::mem::take(&mut self.str_raw),
            });
        }
    }

    #[inline]
    fn advance_char(&mut self) {
        if self.source.next().is_some() {
            self.pos += 1;
        }
    }

    fn unexpected(&self, ch: char) -> StreamError {
        StreamError::UnexpectedCharacter {
            ch,
            offset: self.pos,
        }
    }
}
