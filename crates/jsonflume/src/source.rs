//! Lazy source values accepted by the [`Serializer`](crate::Serializer).
//!
//! [`SourceValue`] unifies eager values, deferred computations and lazy
//! streams in one recursive tagged enum. The serializer peels one layer at a
//! time — invoking thunks, applying render hooks, draining stream tags —
//! until a token-producing shape is reached, so no part of the tree is
//! resolved before its tokens are actually demanded.

use std::fmt;

use crate::{SourceError, Value};

/// Result of resolving one lazy layer of a source value.
pub type SourceResult<T> = Result<T, SourceError>;

/// A deferred computation producing a source value.
pub type LazyValue = Box<dyn FnOnce() -> SourceResult<SourceValue>>;

/// A lazy sequence of string fragments forming one string value.
pub type StringStream = Box<dyn Iterator<Item = SourceResult<String>>>;

/// A lazy sequence of array elements.
pub type ArrayStream = Box<dyn Iterator<Item = SourceResult<SourceValue>>>;

/// A lazy sequence of object entries.
pub type ObjectStream = Box<dyn Iterator<Item = SourceResult<(SourceKey, SourceValue)>>>;

/// A user-supplied transform applied to a value before serialization.
///
/// The serializer calls [`render_json`](RenderJson::render_json) with the
/// current object key, the decimal string of the current array index, `""`
/// at the root, and `""` when the entry key is itself a stream. The result
/// replaces the value.
pub trait RenderJson {
    fn render_json(&self, key: &str) -> SourceValue;
}

/// An object entry key: plain text or a lazy stream of fragments.
pub enum SourceKey {
    Text(String),
    Stream(StringStream),
}

impl From<&str> for SourceKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SourceKey {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl fmt::Debug for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A value accepted by the serializer: eager, deferred, or streaming.
pub enum SourceValue {
    Null,
    Boolean(bool),
    /// A 64-bit float; non-finite values serialize as `null`.
    Number(f64),
    /// An integer whose raw text preserves every digit even when the decoded
    /// float cannot.
    BigInt(i64),
    String(String),
    Array(Vec<SourceValue>),
    Object(Vec<(SourceKey, SourceValue)>),
    /// Resolved lazily during emission; failures surface on the token
    /// stream.
    Lazy(LazyValue),
    StringStream(StringStream),
    ArrayStream(ArrayStream),
    ObjectStream(ObjectStream),
    /// A value with a render hook; the hook's result replaces it.
    Rendered(Box<dyn RenderJson>),
    /// A pre-computed JSON fragment, re-parsed and spliced into the output.
    RawJson(String),
    /// The absent value: object entries are skipped, array elements render
    /// as `null`, an absent root produces no tokens.
    Absent,
}

impl SourceValue {
    /// Wraps a deferred computation.
    pub fn lazy<F>(f: F) -> Self
    where
        F: FnOnce() -> SourceResult<SourceValue> + 'static,
    {
        Self::Lazy(Box::new(f))
    }

    /// A string assembled from a sequence of fragments.
    pub fn string_stream<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'static,
    {
        Self::StringStream(Box::new(fragments.into_iter().map(Ok)))
    }

    /// An array whose elements are produced on demand.
    pub fn array_stream<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = SourceValue>,
        I::IntoIter: 'static,
    {
        Self::ArrayStream(Box::new(elements.into_iter().map(Ok)))
    }

    /// An object whose entries are produced on demand.
    pub fn object_stream<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (SourceKey, SourceValue)>,
        I::IntoIter: 'static,
    {
        Self::ObjectStream(Box::new(entries.into_iter().map(Ok)))
    }

    /// A string stream whose fragments may fail.
    pub fn try_string_stream<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = SourceResult<String>>,
        I::IntoIter: 'static,
    {
        Self::StringStream(Box::new(fragments.into_iter()))
    }

    /// An array stream whose elements may fail.
    pub fn try_array_stream<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = SourceResult<SourceValue>>,
        I::IntoIter: 'static,
    {
        Self::ArrayStream(Box::new(elements.into_iter()))
    }

    /// An object stream whose entries may fail.
    pub fn try_object_stream<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = SourceResult<(SourceKey, SourceValue)>>,
        I::IntoIter: 'static,
    {
        Self::ObjectStream(Box::new(entries.into_iter()))
    }

    /// Wraps a value carrying a render hook.
    pub fn rendered<R>(value: R) -> Self
    where
        R: RenderJson + 'static,
    {
        Self::Rendered(Box::new(value))
    }
}

impl fmt::Debug for SourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::BigInt(i) => f.debug_tuple("BigInt").field(i).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Self::Object(entries) => f.debug_tuple("Object").field(entries).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
            Self::StringStream(_) => f.write_str("StringStream(..)"),
            Self::ArrayStream(_) => f.write_str("ArrayStream(..)"),
            Self::ObjectStream(_) => f.write_str("ObjectStream(..)"),
            Self::Rendered(_) => f.write_str("Rendered(..)"),
            Self::RawJson(s) => f.debug_tuple("RawJson").field(s).finish(),
            Self::Absent => f.write_str("Absent"),
        }
    }
}

impl From<bool> for SourceValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for SourceValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for SourceValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<&str> for SourceValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for SourceValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<SourceValue>> for SourceValue {
    fn from(v: Vec<SourceValue>) -> Self {
        Self::Array(v)
    }
}

impl From<Value> for SourceValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Boolean(b) => Self::Boolean(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (SourceKey::Text(k), v.into()))
                    .collect(),
            ),
        }
    }
}
