#![no_main]

use arbitrary::Arbitrary;
use jsonflume::{ParserOptions, StreamingParser, Token};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    splits: Vec<u8>,
    multiple_values: bool,
}

// Feed arbitrary text in arbitrary chunk sizes. The parser must never
// panic, and on success the concatenated raw text must reproduce the input.
fuzz_target!(|input: Input| {
    let Input {
        text,
        splits,
        multiple_values,
    } = input;

    let mut parser = StreamingParser::new(ParserOptions {
        allow_multiple_json_values: multiple_values,
    });

    let mut tokens: Vec<Token> = Vec::new();
    let mut errored = false;

    let chars: Vec<char> = text.chars().collect();
    let mut idx = 0;
    'feed: for s in splits {
        if idx >= chars.len() {
            break;
        }
        let remaining = chars.len() - idx;
        let size = 1 + (s as usize % remaining);
        let chunk: String = chars[idx..idx + size].iter().collect();
        parser.feed(&chunk);
        for token in parser.by_ref() {
            match token {
                Ok(t) => tokens.push(t),
                Err(_) => {
                    errored = true;
                    break 'feed;
                }
            }
        }
        idx += size;
    }
    if !errored {
        if idx < chars.len() {
            let chunk: String = chars[idx..].iter().collect();
            parser.feed(&chunk);
        }
        for token in parser.finish() {
            match token {
                Ok(t) => tokens.push(t),
                Err(_) => {
                    errored = true;
                    break;
                }
            }
        }
    }

    if !errored {
        let raw: String = tokens.iter().map(|t| t.raw()).collect();
        assert_eq!(raw, text, "raw text must reproduce the input");
    }
});
