//! Path selectors and the selection transform.
//!
//! A [`Selector`] decides which paths of an annotated token stream to keep:
//! either a structural [`PathPattern`] — one [`SegmentPattern`] per path
//! segment, with alternatives and wildcards — or an opaque predicate.
//! [`PathSelector`] applies a selector to a token stream, forwarding every
//! matching token together with the entire subtree below it.
//!
//! The textual pattern form is dot-separated: a literal key, a non-negative
//! integer index, a `{a,b,c}` list of alternatives, or `*` for any segment.
//!
//! ```
//! use jsonflume::PathPattern;
//!
//! let pattern: PathPattern = "*.results".parse().unwrap();
//! ```

use std::fmt;
use std::str::FromStr;

use crate::{PathComponent, Path, PathedToken, SelectorError, StreamError};

/// Constraint on one path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentPattern {
    Key(String),
    Index(usize),
    /// Matches when any alternative matches.
    AnyOf(Vec<SegmentPattern>),
    Wildcard,
}

impl SegmentPattern {
    #[must_use]
    pub fn matches(&self, component: &PathComponent) -> bool {
        match self {
            SegmentPattern::Key(k) => component.as_key() == Some(k.as_str()),
            SegmentPattern::Index(i) => component.as_index() == Some(*i),
            SegmentPattern::AnyOf(alternatives) => {
                alternatives.iter().any(|alt| alt.matches(component))
            }
            SegmentPattern::Wildcard => true,
        }
    }
}

/// A structural path pattern: the *i*-th entry constrains the *i*-th path
/// segment, and the path length must equal the pattern length.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathPattern {
    segments: Vec<SegmentPattern>,
}

impl PathPattern {
    #[must_use]
    pub fn new(segments: Vec<SegmentPattern>) -> Self {
        Self { segments }
    }

    /// The empty pattern, matching only the document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn matches(&self, path: &[PathComponent]) -> bool {
        self.segments.len() == path.len()
            && self
                .segments
                .iter()
                .zip(path)
                .all(|(pattern, component)| pattern.matches(component))
    }
}

impl FromStr for PathPattern {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for raw in split_segments(s)? {
            segments.push(parse_segment(&raw)?);
        }
        Ok(Self::new(segments))
    }
}

/// Splits on dots, keeping `{...}` lists intact.
fn split_segments(s: &str) -> Result<Vec<String>, SelectorError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_braces = false;
    for c in s.chars() {
        match c {
            '{' if !in_braces => {
                in_braces = true;
                current.push(c);
            }
            '}' if in_braces => {
                in_braces = false;
                current.push(c);
            }
            '.' if !in_braces => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if in_braces {
        return Err(SelectorError::UnclosedBrace(s.to_string()));
    }
    segments.push(current);
    Ok(segments)
}

fn parse_segment(raw: &str) -> Result<SegmentPattern, SelectorError> {
    if raw.is_empty() {
        return Err(SelectorError::EmptySegment);
    }
    if raw == "*" {
        return Ok(SegmentPattern::Wildcard);
    }
    if let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        let mut alternatives = Vec::new();
        for alt in inner.split(',') {
            if alt.is_empty() {
                return Err(SelectorError::EmptyAlternative(raw.to_string()));
            }
            alternatives.push(parse_literal(alt)?);
        }
        return Ok(SegmentPattern::AnyOf(alternatives));
    }
    parse_literal(raw)
}

fn parse_literal(raw: &str) -> Result<SegmentPattern, SelectorError> {
    if raw.chars().all(|c| c.is_ascii_digit()) {
        // `all` is true for "", but empties are rejected by the callers.
        return Ok(SegmentPattern::Index(
            raw.parse()
                .map_err(|_| SelectorError::InvalidIndex(raw.to_string()))?,
        ));
    }
    if let Some(rest) = raw.strip_prefix('-') {
        if rest.chars().all(|c| c.is_ascii_digit()) && !rest.is_empty() {
            return Err(SelectorError::NegativeIndex(raw.to_string()));
        }
    }
    Ok(SegmentPattern::Key(raw.to_string()))
}

/// A predicate on paths: structural pattern or opaque function.
pub enum Selector {
    Pattern(PathPattern),
    Predicate(Box<dyn Fn(&[PathComponent]) -> bool>),
}

impl Selector {
    /// Wraps an opaque path predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&[PathComponent]) -> bool + 'static,
    {
        Self::Predicate(Box::new(f))
    }

    #[must_use]
    pub fn matches(&self, path: &[PathComponent]) -> bool {
        match self {
            Selector::Pattern(pattern) => pattern.matches(path),
            Selector::Predicate(f) => f(path),
        }
    }
}

impl From<PathPattern> for Selector {
    fn from(pattern: PathPattern) -> Self {
        Self::Pattern(pattern)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Iterator adapter forwarding the tokens of every selected subtree.
///
/// A token passes when its path matches the selector, or when its path
/// extends the most recent match — so selecting a container keeps its whole
/// subtree. The output may contain several top-level values and need not be
/// a single valid document.
pub struct PathSelector<I> {
    input: I,
    selector: Selector,
    matched_prefix: Option<Path>,
    done: bool,
}

impl<I> PathSelector<I>
where
    I: Iterator<Item = Result<PathedToken, StreamError>>,
{
    pub fn new(
        input: impl IntoIterator<IntoIter = I, Item = Result<PathedToken, StreamError>>,
        selector: impl Into<Selector>,
    ) -> Self {
        Self {
            input: input.into_iter(),
            selector: selector.into(),
            matched_prefix: None,
            done: false,
        }
    }
}

impl<I> Iterator for PathSelector<I>
where
    I: Iterator<Item = Result<PathedToken, StreamError>>,
{
    type Item = Result<PathedToken, StreamError>;

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
                    if let Some(prefix) = &self.matched_prefix {
                        if pathed.path.starts_with(prefix) {
                            return Some(Ok(pathed));
                        }
                        self.matched_prefix = None;
                    }
                    if self.selector.matches(&pathed.path) {
                        self.matched_prefix = Some(pathed.path.clone());
                        return Some(Ok(pathed));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn parses_wildcards_and_alternatives() {
        let pattern: PathPattern = "*.results".parse().unwrap();
        assert!(pattern.matches(&path!["apples", "results"]));
        assert!(pattern.matches(&path![0, "results"]));
        assert!(!pattern.matches(&path!["apples"]));
        assert!(!pattern.matches(&path!["apples", "results", 0]));

        let pattern: PathPattern = "{apples,cherries}.results.1".parse().unwrap();
        assert!(pattern.matches(&path!["cherries", "results", 1]));
        assert!(!pattern.matches(&path!["pears", "results", 1]));
        assert!(!pattern.matches(&path!["apples", "results", 2]));
    }

    #[test]
    fn numeric_segments_are_indices() {
        let pattern: PathPattern = "items.0".parse().unwrap();
        assert!(pattern.matches(&path!["items", 0]));
        // A key spelled "0" is not an index.
        assert!(!pattern.matches(&path!["items", "0"]));
    }

    #[test]
    fn empty_expression_selects_the_root() {
        let pattern: PathPattern = "".parse().unwrap();
        assert!(pattern.matches(&path![]));
        assert!(!pattern.matches(&path!["a"]));
    }

    #[test]
    fn construction_errors_are_synchronous() {
        assert_eq!(
            "a..b".parse::<PathPattern>().unwrap_err(),
            SelectorError::EmptySegment
        );
        assert_eq!(
            "-1".parse::<PathPattern>().unwrap_err(),
            SelectorError::NegativeIndex("-1".to_string())
        );
        assert_eq!(
            "{a,b".parse::<PathPattern>().unwrap_err(),
            SelectorError::UnclosedBrace("{a,b".to_string())
        );
        assert_eq!(
            "{a,}".parse::<PathPattern>().unwrap_err(),
            SelectorError::EmptyAlternative("{a,}".to_string())
        );
    }

    #[test]
    fn predicate_selectors_match_arbitrarily() {
        let selector = Selector::predicate(|path| path.len() == 2);
        assert!(selector.matches(&path!["a", 1]));
        assert!(!selector.matches(&path!["a"]));
    }
}
