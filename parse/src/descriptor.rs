//! Parsing of single option-description lines.
//!
//! An option block looks like `-o FILE, --output=FILE  Write output to FILE
//! [default: out.txt]`. Everything before the first run of two spaces is the
//! options part; the rest is informal description, searched for a default
//! only when the option takes an argument.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::pattern::OptionSpec;
use usagedoc_core::Value;

static DEFAULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"\[default: (.*)\]")
        .case_insensitive(true)
        .build()
        .expect("static regex must compile")
});

/// Parses one option block into a descriptor.
///
/// Within the options part, commas and `=` count as plain separators, so
/// `-o FILE`, `-o=FILE`, and `-o, --output FILE` all read the same way. A
/// token starting with `--` sets the long synonym, any other token starting
/// with `-` (except `-` itself) sets the short one, and every remaining
/// token marks the option as argument-taking without being retained.
pub(crate) fn parse_descriptor(block: &str) -> OptionSpec {
    let (options_part, description) = match block.find("  ") {
        Some(split) => (&block[..split], &block[split..]),
        None => (block, ""),
    };

    let mut short = None;
    let mut long = None;
    let mut argcount = 0u8;

    let separators_removed = options_part.replace([',', '='], " ");
    for token in separators_removed.split_whitespace() {
        if token.starts_with("--") {
            long = Some(token.to_string());
        } else if token.starts_with('-') && token != "-" {
            short = Some(token.to_string());
        } else {
            argcount = 1;
        }
    }

    let mut value = Value::Bool(false);
    if argcount == 1 {
        if let Some(caps) = DEFAULT_RE.captures(description) {
            if let Some(default) = caps.get(1) {
                value = Value::Str(default.as_str().to_string());
            }
        }
    }

    OptionSpec::new(short, long, argcount, value)
}
