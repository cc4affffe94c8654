//! Path annotation for token streams.
//!
//! [`PathDetector`] tracks the nesting structure of a token stream and tags
//! every token with a snapshot of the path to its location: tokens between a
//! colon and the following comma carry the member key, tokens between array
//! element boundaries carry the element index, and structural tokens carry
//! their container's own path.
//!
//! Re-running the detector on its own output (with paths stripped) yields
//! the same annotations — the transform is idempotent.

use crate::{
    token::{StringRole, Token},
    PathComponent, Path, PathedToken, StreamError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectState {
    /// Waiting for (or inside) a member key.
    PendingKey,
    /// Key seen and colon passed; the next token activates the member.
    NextValue,
    /// The member's segment is on the path.
    ActiveValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    NextValue,
    ActiveValue,
}

#[derive(Debug)]
enum Frame {
    Object { state: ObjectState, key: String },
    Array { state: ArrayState, index: usize },
}

/// Iterator adapter annotating each token with its path.
///
/// # Examples
///
/// ```
/// use jsonflume::{path, ParserOptions, PathDetector, StreamingParser, Token};
///
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// parser.feed(r#"{"a":[10]}"#);
/// let number = PathDetector::new(parser.finish())
///     .map(|t| t.unwrap())
///     .find(|t| matches!(t.token, Token::Number { .. }))
///     .unwrap();
/// assert_eq!(number.path, path!["a", 0]);
/// ```
pub struct PathDetector<I> {
    input: I,
    frames: Vec<Frame>,
    path: Path,
    done: bool,
}

impl<I> PathDetector<I>
where
    I: Iterator<Item = Result<Token, StreamError>>,
{
    pub fn new(input: impl IntoIterator<IntoIter = I, Item = Result<Token, StreamError>>) -> Self {
        Self {
            input: input.into_iter(),
            frames: Vec::new(),
            path: Path::new(),
            done: false,
        }
    }

    /// Pushes the pending key/index segment when the top frame is waiting
    /// for its next value.
    fn promote(&mut self) {
        match self.frames.last_mut() {
            Some(Frame::Object { state, key }) if *state == ObjectState::NextValue => {
                self.path.push(PathComponent::Key(key.clone()));
                *state = ObjectState::ActiveValue;
            }
            Some(Frame::Array { state, index }) if *state == ArrayState::NextValue => {
                self.path.push(PathComponent::Index(*index));
                *state = ArrayState::ActiveValue;
            }
            _ => {}
        }
    }

    fn annotate(&mut self, token: Token) -> PathedToken {
        self.promote();
        match &token {
            Token::ObjectStart => {
                let snapshot = self.path.clone();
                self.frames.push(Frame::Object {
                    state: ObjectState::PendingKey,
                    key: String::new(),
                });
                return PathedToken::new(snapshot, token);
            }
            Token::ArrayStart => {
                let snapshot = self.path.clone();
                self.frames.push(Frame::Array {
                    state: ArrayState::NextValue,
                    index: 0,
                });
                return PathedToken::new(snapshot, token);
            }
            Token::ObjectEnd | Token::ArrayEnd => {
                // The closed container's trailing active segment goes with
                // its frame.
                let active = match self.frames.pop() {
                    Some(Frame::Object { state, .. }) => state == ObjectState::ActiveValue,
                    Some(Frame::Array { state, .. }) => state == ArrayState::ActiveValue,
                    None => false,
                };
                if active {
                    self.path.pop();
                }
            }
            Token::Comma => match self.frames.last_mut() {
                Some(Frame::Object { state, key }) => {
                    if *state == ObjectState::ActiveValue {
                        self.path.pop();
                    }
                    *state = ObjectState::PendingKey;
                    key.clear();
                }
                Some(Frame::Array { state, index }) => {
                    if *state == ArrayState::ActiveValue {
                        self.path.pop();
                    }
                    *state = ArrayState::NextValue;
                    *index += 1;
                }
                None => {}
            },
            Token::Colon => {
                if let Some(Frame::Object { state, .. }) = self.frames.last_mut() {
                    if *state == ObjectState::PendingKey {
                        *state = ObjectState::NextValue;
                    }
                }
            }
            Token::StringChunk {
                role: StringRole::Key,
                fragment,
                ..
            } => {
                // Keys may span several chunks.
                if let Some(Frame::Object { key, .. }) = self.frames.last_mut() {
                    key.push_str(fragment);
                }
            }
            _ => {}
        }
        PathedToken::new(self.path.clone(), token)
    }
}

impl<I> Iterator for PathDetector<I>
where
    I: Iterator<Item = Result<Token, StreamError>>,
{
    type Item = Result<PathedToken, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.input.next() {
            None => {
                self.done = true;
                None
            }
            Some(Err(err)) => {
                self.done = true;
                Some(Err(err))
            }
            Some(Ok(token)) => Some(Ok(self.annotate(token))),
        }
    }
}
