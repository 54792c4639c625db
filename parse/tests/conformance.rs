//! Drives the fixture corpus in `tests/fixtures/testcases.docopt`.
//!
//! The fixture format is the classic docopt one: a usage text wrapped in
//! `r""" ... """`, followed by `$ prog ...` invocations each expecting
//! either a JSON result map or the string `"user-error"`.

use std::fs;

use usagedoc_parse::{parse, ParseConfig, ParseError};

struct Case {
    doc: String,
    argv: Vec<String>,
    expected: serde_json::Value,
}

fn load_cases() -> Vec<Case> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/testcases.docopt");
    let raw = fs::read_to_string(path).expect("fixture corpus should be readable");
    let raw: String = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    let mut cases = Vec::new();
    for fragment in raw.split("r\"\"\"").skip(1) {
        let Some((doc, body)) = fragment.split_once("\"\"\"") else {
            panic!("unterminated doc block in fixture corpus");
        };
        for chunk in body.split("\n$ ").skip(1) {
            let (invocation, rest) = chunk.split_once('\n').unwrap_or((chunk, ""));
            let argv: Vec<String> = invocation
                .split_whitespace()
                .skip(1) // program name
                .map(str::to_string)
                .collect();
            let json_text = rest
                .split("\n\n")
                .next()
                .unwrap_or("")
                .trim();
            let expected: serde_json::Value = serde_json::from_str(json_text)
                .unwrap_or_else(|err| panic!("bad expected JSON {json_text:?}: {err}"));
            cases.push(Case {
                doc: doc.to_string(),
                argv,
                expected,
            });
        }
    }
    cases
}

#[test]
fn test_conformance_corpus() {
    let cases = load_cases();
    assert!(cases.len() > 50, "corpus unexpectedly small: {}", cases.len());

    // Early-exit interception stays off so help/version flags read as plain
    // map entries, the way the corpus states them.
    let config = ParseConfig {
        help: false,
        version: None,
        options_first: false,
    };

    for case in cases {
        let context = format!("doc:\n{}\nargv: {:?}", case.doc, case.argv);
        let result = parse(&case.doc, &case.argv, &config);

        if case.expected == serde_json::Value::String("user-error".to_string()) {
            match result {
                Err(ParseError::Argument(_)) => {}
                other => panic!("expected a user error, got {other:?}\n{context}"),
            }
            continue;
        }

        let args = match result {
            Ok(args) => args,
            Err(err) => panic!("expected a result map, got {err:?}\n{context}"),
        };
        let actual = serde_json::to_value(&args).expect("result map should serialize");
        assert_eq!(actual, case.expected, "{context}");
    }
}
