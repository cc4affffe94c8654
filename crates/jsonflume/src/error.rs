use thiserror::Error;

/// Errors carried through every stage of a streaming pipeline.
///
/// One error type is threaded through the parser and all downstream
/// transforms so that adapters can forward failures without remapping them.
/// An error terminates the stream that produced it; partial output emitted
/// before the failure is not rewound.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// The parser met a character that cannot extend its current state.
    ///
    /// `offset` is the character offset since the start of the stream.
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },
    /// The input ended in the middle of a document.
    #[error("unexpected end of input")]
    PrematureEnd,
    /// A lazy value or stream tag failed while the serializer drained it.
    #[error("source value failed: {0}")]
    Producer(String),
    /// The consumer cancelled the pipeline.
    #[error("stream cancelled")]
    Cancelled,
}

/// A producer-side failure raised by lazy values and stream tags.
///
/// Converted into [`StreamError::Producer`] when it surfaces on a token
/// stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<SourceError> for StreamError {
    fn from(err: SourceError) -> Self {
        StreamError::Producer(err.0)
    }
}

/// Errors raised when constructing a selector from its textual form.
///
/// These are synchronous construction-time errors; a successfully built
/// selector never fails while matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty path segment")]
    EmptySegment,
    #[error("negative array index {0:?}")]
    NegativeIndex(String),
    #[error("invalid array index {0:?}")]
    InvalidIndex(String),
    #[error("unclosed alternative list {0:?}")]
    UnclosedBrace(String),
    #[error("empty alternative in {0:?}")]
    EmptyAlternative(String),
}
