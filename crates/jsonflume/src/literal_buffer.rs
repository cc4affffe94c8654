use crate::Token;

/// What happened after feeding one more character into the literal matcher.
pub(crate) enum Step {
    /// Character matched, but the literal is not finished yet.
    NeedMore,
    /// Character matched *and* consumed the last byte of the literal.
    Done(Token),
    /// Character did **not** match the expected byte.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    Null,
    True,
    False,
}

/// Cumulative prefix matcher for the `true` / `false` / `null` keywords.
///
/// `None` means no literal is in flight; `Some` carries the remaining bytes
/// and the token to emit on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer(Option<(&'static [u8], LiteralKind)>);

impl ExpectedLiteralBuffer {
    pub(crate) fn none() -> Self {
        ExpectedLiteralBuffer(None)
    }

    /// Starts matching after the *first* character (`n`, `t` or `f`).
    pub(crate) fn new(first: char) -> Self {
        match first {
            'n' => ExpectedLiteralBuffer(Some((b"ull", LiteralKind::Null))),
            't' => ExpectedLiteralBuffer(Some((b"rue", LiteralKind::True))),
            'f' => ExpectedLiteralBuffer(Some((b"alse", LiteralKind::False))),
            _ => ExpectedLiteralBuffer::none(),
        }
    }

    /// Feeds the next input character and reports what to do.
    pub(crate) fn step(&mut self, c: char) -> Step {
        let Some((bytes, kind)) = self.0.take() else {
            return Step::Reject;
        };

        if bytes.first().is_some_and(|b| *b as char == c) {
            let rest = &bytes[1..];
            if rest.is_empty() {
                Step::Done(match kind {
                    LiteralKind::Null => Token::Null,
                    LiteralKind::True => Token::Boolean { value: true },
                    LiteralKind::False => Token::Boolean { value: false },
                })
            } else {
                self.0 = Some((rest, kind));
                Step::NeedMore
            }
        } else {
            self.0 = Some((bytes, kind));
            Step::Reject
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_true_to_completion() {
        let mut m = ExpectedLiteralBuffer::new('t');
        assert!(matches!(m.step('r'), Step::NeedMore));
        assert!(matches!(m.step('u'), Step::NeedMore));
        match m.step('e') {
            Step::Done(Token::Boolean { value: true }) => {}
            _ => panic!("expected completed `true`"),
        }
    }

    #[test]
    fn rejects_on_first_bad_character() {
        let mut m = ExpectedLiteralBuffer::new('n');
        assert!(matches!(m.step('u'), Step::NeedMore));
        assert!(matches!(m.step('i'), Step::Reject));
    }
}
