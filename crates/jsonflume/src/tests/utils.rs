use crate::{ParserOptions, StreamError, StreamingParser, Token};

/// Parses a complete document, panicking on errors.
pub fn parse_tokens(text: &str) -> Vec<Token> {
    try_parse_tokens(text).expect("input should parse")
}

/// Parses a complete document, returning the first error if any.
pub fn try_parse_tokens(text: &str) -> Result<Vec<Token>, StreamError> {
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed(text);
    parser.finish().collect()
}

/// Parses a multi-document stream, panicking on errors.
pub fn parse_tokens_multi(text: &str) -> Vec<Token> {
    let mut parser = StreamingParser::new(ParserOptions {
        allow_multiple_json_values: true,
    });
    parser.feed(text);
    parser
        .finish()
        .collect::<Result<Vec<_>, _>>()
        .expect("input should parse")
}

/// Feeds the input chunk by chunk, draining between feeds.
pub fn parse_chunked(chunks: &[&str]) -> Vec<Token> {
    let mut parser = StreamingParser::new(ParserOptions::default());
    let mut tokens = Vec::new();
    for chunk in chunks {
        parser.feed(chunk);
        for token in parser.by_ref() {
            tokens.push(token.expect("input should parse"));
        }
    }
    for token in parser.finish() {
        tokens.push(token.expect("input should parse"));
    }
    tokens
}

/// Concatenates the raw text of a token slice.
pub fn raw_concat(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.raw()).collect()
}

/// Cuts `text` at every `per_chunk`-th character, so chunk boundaries land
/// on arbitrary token seams but never inside a code point.
pub fn split_every(text: &str, per_chunk: usize) -> Vec<&str> {
    assert!(per_chunk > 0);
    let mut cuts: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .step_by(per_chunk)
        .skip(1)
        .collect();
    cuts.push(text.len());

    let mut chunks = Vec::with_capacity(cuts.len());
    let mut start = 0;
    for cut in cuts {
        if cut > start {
            chunks.push(&text[start..cut]);
        }
        start = cut;
    }
    chunks
}

/// Wraps tokens as the infallible stream adapters expect.
pub fn ok_stream(tokens: Vec<Token>) -> impl Iterator<Item = Result<Token, StreamError>> {
    tokens.into_iter().map(Ok)
}

/// Merges adjacent whitespace runs and same-role string chunks.
///
/// Chunk-boundary flushing may split these tokens without changing their
/// concatenated content, so comparisons across different chunkings normalise
/// first.
pub fn normalize(tokens: &[Token]) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::new();
    for token in tokens {
        match (out.last_mut(), token) {
            (Some(Token::Whitespace { raw }), Token::Whitespace { raw: next }) => {
                raw.push_str(next);
            }
            (
                Some(Token::StringChunk {
                    role,
                    fragment,
                    raw,
                }),
                Token::StringChunk {
                    role: next_role,
                    fragment: next_fragment,
                    raw: next_raw,
                },
            ) if role == next_role => {
                fragment.push_str(next_fragment);
                raw.push_str(next_raw);
            }
            _ => out.push(token.clone()),
        }
    }
    out
}
