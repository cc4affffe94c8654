//! Incremental streaming of JSON documents.
//!
//! jsonflume converts between three representations — JSON text chunks, a
//! stream of semantically-typed [`Token`]s, and in-memory [`Value`]s —
//! without ever materialising a whole document. Around the token stream sit
//! three path-aware transforms: [`PathDetector`] annotates tokens with their
//! location, [`PathSelector`] filters subtrees by path pattern, and
//! [`PathStreamSplitter`] slices a selection into independent sub-streams.
//!
//! Every token carries its raw text, so a parse → stringify round-trip is
//! byte-exact; every transform is an iterator adapter driven one token at a
//! time, so pipelines process documents as the text arrives.
//!
//! # Examples
//!
//! Pick the `results` arrays out of a response while it streams in:
//!
//! ```
//! use jsonflume::{
//!     Deserializer, ParserOptions, PathDetector, PathPattern, PathSelector, StreamingParser,
//! };
//!
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! parser.feed(r#"{"apples":{"results":["a1","a2"]},"#);
//! parser.feed(r#""cherries":{"results":["c1","c2"]}}"#);
//!
//! let pattern: PathPattern = "*.results".parse().unwrap();
//! let selected = PathSelector::new(PathDetector::new(parser.finish()), pattern);
//! for found in Deserializer::new(selected) {
//!     let found = found.unwrap();
//!     println!("{:?} -> {}", found.path, found.value);
//! }
//! ```

mod buffer;
mod deserializer;
mod detector;
mod error;
mod escape_buffer;
mod literal_buffer;
mod parser;
mod path;
mod selector;
mod serializer;
mod source;
mod splitter;
mod stringifier;
mod token;
mod value;

pub use deserializer::{from_tokens, Deserializer, ValueAt};
pub use detector::PathDetector;
pub use error::{SelectorError, SourceError, StreamError};
pub use parser::{ClosedStreamingParser, ParserOptions, StreamingParser};
pub use path::{Path, PathComponent, PathedToken};
pub use selector::{PathPattern, PathSelector, SegmentPattern, Selector};
pub use serializer::{
    serialize_documents, DocumentSerializer, FramingOptions, Indent, Serializer,
    SerializerOptions,
};
pub use source::{
    ArrayStream, LazyValue, ObjectStream, RenderJson, SourceKey, SourceResult, SourceValue,
    StringStream,
};
pub use splitter::{PathStreamSplitter, SubStream};
pub use stringifier::{stringify_stream, stringify_tokens, Stringifier};
pub use token::{StringRole, Token};
pub use value::{Array, Map, Value};

#[cfg(test)]
mod tests;
