#![allow(dead_code)]

pub const ORIGINAL: &str = r#"
{
    "moderation": {
        "decision": "allow",
        "reason": null
    },
    "batches": [
        {
            "id": 1,
            "results": [
                "r1",
                "r2"
            ]
        },
        {
            "id": 2,
            "results": [
                "r3"
            ]
        }
    ],
    "totals": {
        "count": 3,
        "ratio": -1.2345e2
    },
    "note": "streaming \u2665"
}"#;

// This stream simulates a chunked network response. The cuts intentionally
// land on awkward seams: inside strings, inside a \u escape, between a
// closing brace and the following comma, and inside a number.
#[rustfmt::skip]
pub const STREAM: [&str; 12] = [
    "\n{\n    \"moderation\": {\n        \"decision\": \"al",
    "low\",\n        \"reason\": null\n    },\n    \"batches\": [\n        {\n            \"id\": 1,",
    "\n            \"results\": [\n                \"r1\",",
    "\n                \"r2\"\n            ]\n        }",
    ",\n        {\n            \"id\": 2,\n            \"results\": [\n                \"r3\"\n",
    "            ]\n        }\n    ],\n    \"totals\": {\n        \"count\": 3,\n        \"ratio\": -1.23",
    "45e2\n    },\n    \"note\": \"streaming \\u26",
    "65\"\n}",
    "", "", "", "",
];

#[test]
fn stream_chunks_reassemble_the_original() {
    assert_eq!(STREAM.join(""), ORIGINAL);
}
