use super::utils::{ok_stream, parse_tokens};
use crate::{
    path, Deserializer, PathDetector, PathPattern, PathSelector, Selector, Value, ValueAt,
};

const ORCHARD: &str =
    r#"{"apples":{"results":["a1","a2"]},"cherries":{"results":["c1","c2"]}}"#;

fn select_values(text: &str, selector: impl Into<Selector>) -> Vec<ValueAt> {
    let selected = PathSelector::new(
        PathDetector::new(ok_stream(parse_tokens(text))),
        selector,
    );
    Deserializer::new(selected).map(|v| v.unwrap()).collect()
}

#[test]
fn wildcard_pattern_selects_each_subtree() {
    let pattern: PathPattern = "*.results".parse().unwrap();
    let found = select_values(ORCHARD, pattern);
    assert_eq!(
        found,
        vec![
            ValueAt {
                path: path!["apples", "results"],
                value: Value::Array(vec![Value::from("a1"), Value::from("a2")]),
            },
            ValueAt {
                path: path!["cherries", "results"],
                value: Value::Array(vec![Value::from("c1"), Value::from("c2")]),
            },
        ]
    );
}

#[test]
fn alternative_pattern_narrows_the_match() {
    let pattern: PathPattern = "{cherries}.results".parse().unwrap();
    let found = select_values(ORCHARD, pattern);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path, path!["cherries", "results"]);
}

#[test]
fn predicate_selectors_work_like_patterns() {
    let selector = Selector::predicate(|path| {
        path.len() == 2 && path[1].as_key() == Some("results")
    });
    let found = select_values(ORCHARD, selector);
    assert_eq!(found.len(), 2);
}

#[test]
fn leaf_selection_yields_scalars() {
    let pattern: PathPattern = "*.results.0".parse().unwrap();
    let found = select_values(ORCHARD, pattern);
    assert_eq!(
        found,
        vec![
            ValueAt {
                path: path!["apples", "results", 0],
                value: Value::from("a1"),
            },
            ValueAt {
                path: path!["cherries", "results", 0],
                value: Value::from("c1"),
            },
        ]
    );
}

#[test]
fn root_selector_passes_every_token_unchanged() {
    let annotated: Vec<_> = PathDetector::new(ok_stream(parse_tokens(ORCHARD)))
        .map(|t| t.unwrap())
        .collect();
    let selected: Vec<_> = PathSelector::new(
        annotated.clone().into_iter().map(Ok),
        PathPattern::root(),
    )
    .map(|t| t.unwrap())
    .collect();
    assert_eq!(selected, annotated);
}

#[test]
fn non_matching_selector_yields_nothing() {
    let pattern: PathPattern = "pears.results".parse().unwrap();
    assert!(select_values(ORCHARD, pattern).is_empty());
}
