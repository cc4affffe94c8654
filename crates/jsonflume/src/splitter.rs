//! Splitting selector output into one re-rooted stream per subtree.
//!
//! [`PathStreamSplitter`] groups consecutive tokens that share a matched
//! root path and hands out one [`SubStream`] per group. Each sub-stream
//! carries its root path side-band and strips that prefix from every token
//! it yields, so downstream consumers see an independent document rooted at
//! the matched value.
//!
//! The outer stream and the sub-streams progress independently: pulling the
//! outer stream buffers tokens into not-yet-drained sub-streams, and pulling
//! a sub-stream drives the shared input past other groups' announcements.
//! The per-stream queues are unbounded, so memory grows with how far one
//! consumer lags behind the other. Dropping a sub-stream discards any
//! further tokens for it without cancelling the parent stream.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::{Path, PathedToken, StreamError};

#[derive(Debug, Default)]
struct Group {
    buf: VecDeque<Result<PathedToken, StreamError>>,
    closed: bool,
    cancelled: bool,
}

struct Shared<I> {
    /// `None` once the upstream is exhausted or failed.
    input: Option<I>,
    groups: BTreeMap<usize, Group>,
    /// Id and root path of the group currently receiving writes.
    current: Option<(usize, Path)>,
    /// Sub-streams discovered but not yet handed to the outer consumer.
    announce: VecDeque<(usize, Path)>,
    /// An upstream error that arrived outside any open group.
    outer_error: Option<StreamError>,
    next_id: usize,
}

impl<I> Shared<I>
where
    I: Iterator<Item = Result<PathedToken, StreamError>>,
{
    fn done(&self) -> bool {
        self.input.is_none()
    }

    fn finish_current(&mut self) {
        if let Some((id, _)) = self.current.take() {
            if let Some(group) = self.groups.get_mut(&id) {
                group.closed = true;
            }
        }
    }

    /// Pulls one upstream token and routes it into the right group,
    /// opening a new group at each boundary.
    fn advance(&mut self) {
        let Some(input) = self.input.as_mut() else {
            return;
        };
        match input.next() {
            None => {
                self.finish_current();
                self.input = None;
            }
            Some(Err(err)) => {
                // The failure belongs to the group it interrupted; outside
                // any group it surfaces on the outer stream.
                if let Some((id, _)) = self.current.take() {
                    if let Some(group) = self.groups.get_mut(&id) {
                        if !group.cancelled {
                            group.buf.push_back(Err(err));
                        }
                        group.closed = true;
                    }
                } else {
                    self.outer_error = Some(err);
                }
                self.input = None;
            }
            Some(Ok(pathed)) => {
                let belongs = self
                    .current
                    .as_ref()
                    .is_some_and(|(_, root)| pathed.path.starts_with(root));
                if !belongs {
                    self.finish_current();
                    let id = self.next_id;
                    self.next_id += 1;
                    let root = pathed.path.clone();
                    self.groups.insert(id, Group::default());
                    self.announce.push_back((id, root.clone()));
                    self.current = Some((id, root));
                }
                if let Some((id, root)) = &self.current {
                    let stripped = pathed.path[root.len()..].to_vec();
                    if let Some(group) = self.groups.get_mut(id) {
                        if !group.cancelled {
                            group
                                .buf
                                .push_back(Ok(PathedToken::new(stripped, pathed.token)));
                        }
                    }
                }
            }
        }
    }
}

/// Splits a stream of path-annotated tokens into one sub-stream per
/// contiguous subtree.
///
/// # Examples
///
/// ```
/// use jsonflume::{
///     stringify_tokens, ParserOptions, PathDetector, PathPattern, PathSelector,
///     PathStreamSplitter, StreamingParser,
/// };
///
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// parser.feed(r#"{"a":{"results":[1]},"b":{"results":[2]}}"#);
/// let pattern: PathPattern = "*.results".parse().unwrap();
/// let selected = PathSelector::new(PathDetector::new(parser.finish()), pattern);
///
/// for sub in PathStreamSplitter::new(selected) {
///     let sub = sub.unwrap();
///     let root = sub.path().clone();
///     let text = stringify_tokens(sub.map(|t| t.unwrap().token));
///     println!("{root:?}: {text}");
/// }
/// ```
pub struct PathStreamSplitter<I> {
    shared: Rc<RefCell<Shared<I>>>,
}

impl<I> PathStreamSplitter<I>
where
    I: Iterator<Item = Result<PathedToken, StreamError>>,
{
    pub fn new(
        input: impl IntoIterator<IntoIter = I, Item = Result<PathedToken, StreamError>>,
    ) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                input: Some(input.into_iter()),
                groups: BTreeMap::new(),
                current: None,
                announce: VecDeque::new(),
                outer_error: None,
                next_id: 0,
            })),
        }
    }
}

impl<I> Iterator for PathStreamSplitter<I>
where
    I: Iterator<Item = Result<PathedToken, StreamError>>,
{
    type Item = Result<SubStream<I>, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut shared = self.shared.borrow_mut();
            if let Some((id, root)) = shared.announce.pop_front() {
                drop(shared);
                return Some(Ok(SubStream {
                    id,
                    root,
                    shared: Rc::clone(&self.shared),
                }));
            }
            if let Some(err) = shared.outer_error.take() {
                return Some(Err(err));
            }
            if shared.done() {
                return None;
            }
            shared.advance();
        }
    }
}

/// One matched subtree's token stream, re-rooted at the match.
///
/// The stream stays valid independently of the outer splitter: tokens are
/// buffered until read, and dropping the sub-stream only discards its own
/// remaining tokens.
pub struct SubStream<I> {
    id: usize,
    root: Path,
    shared: Rc<RefCell<Shared<I>>>,
}

impl<I> SubStream<I> {
    /// The root path of the matched subtree, as the selector saw it.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl<I> Iterator for SubStream<I>
where
    I: Iterator<Item = Result<PathedToken, StreamError>>,
{
    type Item = Result<PathedToken, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut shared = self.shared.borrow_mut();
            let (item, closed) = match shared.groups.get_mut(&self.id) {
                None => return None,
                Some(group) => (group.buf.pop_front(), group.closed),
            };
            if let Some(item) = item {
                return Some(item);
            }
            if closed {
                shared.groups.remove(&self.id);
                return None;
            }
            if shared.done() {
                return None;
            }
            shared.advance();
        }
    }
}

impl<I> Drop for SubStream<I> {
    fn drop(&mut self) {
        if let Ok(mut shared) = self.shared.try_borrow_mut() {
            if let Some(group) = shared.groups.get_mut(&self.id) {
                group.cancelled = true;
                group.buf.clear();
            }
        }
    }
}
