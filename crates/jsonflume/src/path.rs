//! Paths locating tokens and values within a document tree.
//!
//! A [`Path`] is a sequence of [`PathComponent`]s starting at the root: keys
//! for object members, indices for array elements. The empty path denotes
//! the root. [`PathedToken`] pairs a token with a snapshot of its path, the
//! currency of the [`PathDetector`](crate::PathDetector),
//! [`PathSelector`](crate::PathSelector) and
//! [`PathStreamSplitter`](crate::PathStreamSplitter) transforms.

use crate::Token;

/// A component in the path to a JSON value.
///
/// # Examples
///
/// ```
/// use jsonflume::PathComponent;
///
/// let key = PathComponent::Key("foo".to_string());
/// assert_eq!(key.as_key(), Some("foo"));
///
/// let idx = PathComponent::Index(3);
/// assert_eq!(idx.as_index(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathComponent {
    Key(String),
    Index(usize),
}

/// A path from the document root; empty means the root itself.
pub type Path = Vec<PathComponent>;

impl PathComponent {
    /// Returns the index if this component is an index, otherwise `None`.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        if let Self::Index(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Returns the key if this component is a key, otherwise `None`.
    #[must_use]
    pub fn as_key(&self) -> Option<&str> {
        if let Self::Key(k) = self {
            Some(k)
        } else {
            None
        }
    }
}

impl From<&str> for PathComponent {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathComponent {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<usize> for PathComponent {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<i32> for PathComponent {
    fn from(i: i32) -> Self {
        #[allow(clippy::cast_sign_loss)]
        Self::Index(i as usize)
    }
}

/// Builds a [`Path`] from key and index literals.
///
/// ```
/// use jsonflume::{path, PathComponent};
///
/// let p = path!["users", 0, "name"];
/// assert_eq!(p[1], PathComponent::Index(0));
/// ```
#[macro_export]
macro_rules! path {
    () => { $crate::Path::new() };
    ($($component:expr),+ $(,)?) => {
        vec![$($crate::PathComponent::from($component)),+]
    };
}

/// A token annotated with the path to its location.
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, PartialEq)]
pub struct PathedToken {
    pub path: Path,
    pub token: Token,
}

impl PathedToken {
    #[must_use]
    pub fn new(path: Path, token: Token) -> Self {
        Self { path, token }
    }
}

// Paths serialize as plain JSON arrays of strings and integers
// (`["foo", 0, "bar"]`) rather than the default tagged representation.
#[cfg(any(test, feature = "serde"))]
mod serde_impls {
    use std::fmt;

    use serde::{
        de::{Error, Unexpected, Visitor},
        Deserialize, Deserializer, Serialize, Serializer,
    };

    use super::PathComponent;

    impl Serialize for PathComponent {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match self {
                PathComponent::Key(k) => serializer.serialize_str(k),
                PathComponent::Index(i) => serializer.serialize_u64(*i as u64),
            }
        }
    }

    struct PathComponentVisitor;

    impl Visitor<'_> for PathComponentVisitor {
        type Value = PathComponent;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or unsigned integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(PathComponent::Key(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(PathComponent::Key(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            #[allow(clippy::cast_possible_truncation)]
            Ok(PathComponent::Index(value as usize))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            if value < 0 {
                return Err(Error::invalid_value(
                    Unexpected::Signed(value),
                    &"non-negative index",
                ));
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(PathComponent::Index(value as usize))
        }
    }

    impl<'de> Deserialize<'de> for PathComponent {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(PathComponentVisitor)
        }
    }
}
