//! In-memory JSON values.
//!
//! [`Value`] is the fully materialised form produced by the
//! [`Deserializer`](crate::Deserializer). Objects preserve insertion order
//! and collapse duplicate keys to the last writer.

use indexmap::IndexMap;

/// An insertion-ordered JSON object.
///
/// Inserting an existing key replaces its value but keeps its original
/// position, so duplicate keys collapse to the last writer.
pub type Map = IndexMap<String, Value>;

pub type Array = Vec<Value>;

/// A JSON value as defined by [RFC 8259].
///
/// # Examples
///
/// ```
/// use jsonflume::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("key".to_string(), Value::String("value".into()));
/// let v = Value::Object(map);
/// assert_eq!(v.to_string(), r#"{"key":"value"}"#);
/// ```
///
/// [RFC 8259]: https://datatracker.ietf.org/doc/html/rfc8259
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Array),
    Object(Map),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Boolean(..))
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(..))
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(..))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(..))
    }
}

/// Escapes a string for inclusion in a JSON string literal.
///
/// Writes to the provided formatter, replacing quotes, backslashes, control
/// characters and the Unicode line separators with their JSON escape
/// sequences.
pub(crate) fn write_escaped_string<W: std::fmt::Write>(src: &str, f: &mut W) -> std::fmt::Result {
    for c in src.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\u{0008}' => f.write_str("\\b")?,
            '\u{000C}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            // Escape Unicode line separators which pre-2019 JSON parsers may
            // not handle correctly.
            '\u{2028}' | '\u{2029}' => write!(f, "\\u{:04X}", c as u32)?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04X}", c as u32)?,
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Convenience wrapper around [`write_escaped_string`] returning a `String`.
pub(crate) fn escape_string(src: &str) -> String {
    let mut result = String::with_capacity(src.len());
    write_escaped_string(src, &mut result).expect("writing to a String cannot fail");
    result
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Value::Number(n) => f.write_str(&n.to_string()),
            Value::String(s) => {
                f.write_str("\"")?;
                write_escaped_string(s, f)?;
                f.write_str("\"")
            }
            Value::Array(arr) => {
                f.write_str("[")?;
                let mut first = true;
                for v in arr {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                let mut first = true;
                for (k, v) in map {
                    if !first {
                        f.write_str(",")?;
                    }
                    first = false;
                    f.write_str("\"")?;
                    write_escaped_string(k, f)?;
                    f.write_str("\":")?;
                    write!(f, "{v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_compact_json() {
        let mut map = Map::new();
        map.insert("b".to_string(), Value::from(1.0));
        map.insert("a".to_string(), Value::Array(vec![Value::Null]));
        let v = Value::Object(map);
        // Insertion order, not key order.
        assert_eq!(v.to_string(), r#"{"b":1,"a":[null]}"#);
    }

    #[test]
    fn duplicate_keys_collapse_to_last_writer() {
        let mut map = Map::new();
        map.insert("k".to_string(), Value::from(1.0));
        map.insert("x".to_string(), Value::Null);
        map.insert("k".to_string(), Value::from(2.0));
        // Value replaced, original position kept.
        assert_eq!(Value::Object(map).to_string(), r#"{"k":2,"x":null}"#);
    }

    #[test]
    fn display_escapes_strings() {
        let v = Value::String("a\"b\\c\n\u{1}".to_string());
        assert_eq!(v.to_string(), "\"a\\\"b\\\\c\\n\\u0001\"");
    }
}
