use super::utils::{ok_stream, parse_tokens};
use crate::{path, Path, PathDetector, PathedToken, StringRole, Token};

fn annotate(text: &str) -> Vec<PathedToken> {
    PathDetector::new(ok_stream(parse_tokens(text)))
        .map(|t| t.unwrap())
        .collect()
}

fn path_of<F>(annotated: &[PathedToken], pred: F) -> Path
where
    F: Fn(&Token) -> bool,
{
    annotated
        .iter()
        .find(|t| pred(&t.token))
        .expect("token not found")
        .path
        .clone()
}

#[test]
fn nested_paths_reach_each_value() {
    let annotated = annotate(r#"{"object":{"array":["item1",2,{"key":"item3"}]}}"#);

    let number = path_of(&annotated, |t| matches!(t, Token::Number { .. }));
    assert_eq!(number, path!["object", "array", 1]);

    let item3 = path_of(&annotated, |t| {
        matches!(t, Token::StringChunk { fragment, .. } if fragment == "item3")
    });
    assert_eq!(item3, path!["object", "array", 2, "key"]);

    // The root object opens and closes at the root path.
    assert_eq!(annotated.first().unwrap().path, path![]);
    assert_eq!(annotated.last().unwrap().path, path![]);

    let item1 = path_of(&annotated, |t| {
        matches!(t, Token::StringChunk { fragment, .. } if fragment == "item1")
    });
    assert_eq!(item1, path!["object", "array", 0]);
}

#[test]
fn container_tokens_carry_their_own_location() {
    let annotated = annotate(r#"{"a":[[10]]}"#);

    let starts: Vec<_> = annotated
        .iter()
        .filter(|t| matches!(t.token, Token::ArrayStart))
        .map(|t| t.path.clone())
        .collect();
    assert_eq!(starts, vec![path!["a"], path!["a", 0]]);

    let ends: Vec<_> = annotated
        .iter()
        .filter(|t| matches!(t.token, Token::ArrayEnd))
        .map(|t| t.path.clone())
        .collect();
    assert_eq!(ends, vec![path!["a", 0], path!["a"]]);
}

#[test]
fn key_tokens_carry_the_object_path() {
    let annotated = annotate(r#"{"outer":{"inner":1}}"#);
    let inner_key = annotated
        .iter()
        .find(|t| {
            matches!(
                &t.token,
                Token::StringChunk { role: StringRole::Key, fragment, .. } if fragment == "inner"
            )
        })
        .unwrap();
    assert_eq!(inner_key.path, path!["outer"]);

    let colons: Vec<_> = annotated
        .iter()
        .filter(|t| matches!(t.token, Token::Colon))
        .map(|t| t.path.clone())
        .collect();
    assert_eq!(colons, vec![path![], path!["outer"]]);
}

#[test]
fn whitespace_between_colon_and_value_carries_the_key() {
    let annotated = annotate(r#"{"a": 1}"#);
    let ws = annotated
        .iter()
        .find(|t| t.token.is_whitespace())
        .unwrap();
    assert_eq!(ws.path, path!["a"]);
}

#[test]
fn multi_document_paths_restart_at_the_root() {
    let tokens = super::utils::parse_tokens_multi("[1]\n[2]");
    let annotated: Vec<_> = PathDetector::new(ok_stream(tokens))
        .map(|t| t.unwrap())
        .collect();
    let numbers: Vec<_> = annotated
        .iter()
        .filter(|t| matches!(t.token, Token::Number { .. }))
        .map(|t| t.path.clone())
        .collect();
    assert_eq!(numbers, vec![path![0], path![0]]);
}

#[test]
fn detector_is_idempotent_on_stripped_output() {
    let text = r#"{"object":{"array":["item1",2,{"key":"item3"}]},"more":[true,null]}"#;
    let first: Vec<_> = annotate(text);
    let stripped = first.iter().map(|t| Ok(t.token.clone()));
    let second: Vec<_> = PathDetector::new(stripped).map(|t| t.unwrap()).collect();
    assert_eq!(first, second);
}
