//! Property-based laws of the parser.
//!
//! Invariants that should hold for all inputs:
//! - Parsing is deterministic: equal inputs give equal outcomes.
//! - A successful parse covers every declared name.
//! - `options_first` demotes every token after the first positional.

use proptest::prelude::*;

use usagedoc_parse::{parse, ParseConfig, Value};

const DOC: &str = "\
Usage: prog [-v]... [--out=<f>] [cmd] [<x>]

Options:
  -v         Verbose.
  --out=<f>  Output file.
";

fn plain_config() -> ParseConfig {
    ParseConfig {
        help: false,
        version: None,
        options_first: false,
    }
}

fn token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("-v".to_string()),
        Just("--out".to_string()),
        Just("--o".to_string()),
        Just("cmd".to_string()),
        Just("data".to_string()),
        Just("out.txt".to_string()),
        Just("--".to_string()),
    ]
}

proptest! {
    #[test]
    fn parse_is_deterministic(argv in proptest::collection::vec(token_strategy(), 0..6)) {
        let first = parse(DOC, &argv, &plain_config());
        let second = parse(DOC, &argv, &plain_config());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn successful_parse_covers_all_declared_names(
        argv in proptest::collection::vec(token_strategy(), 0..6)
    ) {
        if let Ok(args) = parse(DOC, &argv, &plain_config()) {
            for name in ["-v", "--out", "cmd", "<x>"] {
                prop_assert!(args.contains(name), "missing key {}", name);
            }
            // the counted flag always reads as an integer
            prop_assert!(matches!(args.get("-v"), Some(Value::Int(_))));
        }
    }
}

#[test]
fn test_options_first_demotes_later_options() {
    let argv: Vec<String> = ["cmd", "-v"].iter().map(ToString::to_string).collect();

    let mixed = parse(DOC, &argv, &plain_config()).unwrap();
    assert_eq!(mixed.get_count("-v"), 1);
    assert!(mixed.get_bool("cmd"));
    assert_eq!(mixed.get("<x>"), Some(&Value::Empty));

    let config = ParseConfig {
        options_first: true,
        ..plain_config()
    };
    let positional = parse(DOC, &argv, &config).unwrap();
    assert_eq!(positional.get_count("-v"), 0);
    assert!(positional.get_bool("cmd"));
    assert_eq!(positional.get_str("<x>"), Some("-v"));
}
