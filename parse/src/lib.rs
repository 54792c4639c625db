//! Help-text driven argument parsing.
//!
//! The grammar of the command line is the help text itself: a `usage:`
//! section declaring the accepted patterns and an `options:` section
//! describing the options, following the widely adopted docopt convention.
//! [`parse`] compiles the text into a pattern tree, matches the argument
//! vector against it with backtracking, and returns an [`Args`] map from
//! every declared name to its value.
//!
//! # Example
//!
//! ```
//! use usagedoc_parse::{parse, ParseConfig};
//!
//! let doc = "\
//! Usage:
//!   ship move <x> <y> [--speed=<kn>]
//!
//! Options:
//!   --speed=<kn>  Speed in knots [default: 10].
//! ";
//!
//! let argv: Vec<String> = ["move", "10", "20", "--speed=7"]
//!     .iter().map(ToString::to_string).collect();
//! let args = parse(doc, &argv, &ParseConfig::default()).unwrap();
//!
//! assert!(args.get_bool("move"));
//! assert_eq!(args.get_str("<x>"), Some("10"));
//! assert_eq!(args.get_str("--speed"), Some("7"));
//! ```
//!
//! [`run_with`] adds the conventional termination behavior on top: `--help`
//! and `--version` print and succeed, errors print and carry a nonzero exit
//! code; [`run`] applies it to the real process streams.

mod compile;
mod descriptor;
mod fix;
mod matcher;
mod pattern;
mod token;

use std::io::{self, Write};
use std::process;

use tracing::debug;

use crate::matcher::ArgvLeaf;
use crate::token::Tokens;

pub use usagedoc_core::{Args, Kind, ParseError, Result, Value, ValueError};

/// Knobs for a parse run.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Intercept `-h`/`--help` and signal [`ParseError::Help`].
    pub help: bool,
    /// When set, intercept `--version` and signal [`ParseError::Version`];
    /// [`run_with`] prints this string.
    pub version: Option<String>,
    /// Stop option recognition at the first positional token, like POSIX
    /// utilities do.
    pub options_first: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            help: true,
            version: None,
            options_first: false,
        }
    }
}

/// Parses `argv` against the usage text in `doc`.
///
/// On success, the returned map has one entry per name declared anywhere in
/// the usage patterns or the option descriptions reachable through
/// `[options]`: commands and flags map to `Bool` (or an `Int` counter when
/// repeatable), argument-taking options to their `Str` default or last-seen
/// value (`Empty` when neither exists, a `List` when repeatable), and
/// positionals to `Str` or `List`.
///
/// # Errors
///
/// [`ParseError::Language`] when the help text is malformed,
/// [`ParseError::Argument`] when argv does not fit the patterns, and
/// [`ParseError::Help`]/[`ParseError::Version`] as early-exit signals when
/// the corresponding flags are enabled in `config` and present in argv.
pub fn parse(doc: &str, argv: &[String], config: &ParseConfig) -> Result<Args> {
    let (pattern, mut options) = compile::create_pattern_tree(doc)?;

    let argv_leaves = compile::parse_argv(Tokens::from_argv(argv), &mut options, config.options_first)
        .map_err(|e| ParseError::Argument(e.0))?;
    check_early_exits(&argv_leaves, config)?;

    let pattern = fix::fix(pattern);
    let mut left = argv_leaves;
    let mut collected = Vec::new();
    let matched = pattern.match_tokens(&mut left, &mut collected);
    debug!(matched, residual = left.len(), "matched argument vector");

    if matched && left.is_empty() {
        let mut args = Args::default();
        for leaf in pattern.leaves() {
            if let (Some(name), Some(value)) = (leaf.leaf_name(), leaf.leaf_value()) {
                args.insert(name, value.clone());
            }
        }
        for entry in collected {
            args.insert(&entry.name, entry.value);
        }
        return Ok(args);
    }

    if matched {
        let leftover: Vec<&str> = left.iter().map(ArgvLeaf::display_token).collect();
        return Err(ParseError::Argument(format!(
            "Unexpected argument: {}",
            leftover.join(", ")
        )));
    }
    Err(ParseError::Argument(
        "Arguments did not match expected patterns".to_string(),
    ))
}

/// The help check runs before the version check, so `-h --version` prints
/// help. Only leaves with a set value count; a token demoted to a positional
/// (after `--` or under `options_first`) never triggers either exit.
fn check_early_exits(leaves: &[ArgvLeaf], config: &ParseConfig) -> Result<()> {
    let is_set = |names: &[&str]| {
        leaves
            .iter()
            .any(|leaf| names.contains(&leaf.name.as_str()) && leaf.value.is_present())
    };

    if config.help && is_set(&["-h", "--help"]) {
        return Err(ParseError::Help);
    }
    if config.version.is_some() && is_set(&["--version"]) {
        return Err(ParseError::Version);
    }
    Ok(())
}

/// Like [`parse`], but translates every non-success outcome into writes on
/// the given sinks plus an exit code.
///
/// `Help` writes `doc` to `out` and yields code 0; `Version` writes the
/// configured version string and yields 0; `Language` writes the message to
/// `err` and yields 2; `Argument` writes the message followed by `doc` to
/// `err` and yields 1.
pub fn run_with(
    doc: &str,
    argv: &[String],
    config: &ParseConfig,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> std::result::Result<Args, i32> {
    match parse(doc, argv, config) {
        Ok(args) => Ok(args),
        Err(ParseError::Help) => {
            let _ = writeln!(out, "{}", doc.trim_end());
            Err(0)
        }
        Err(ParseError::Version) => {
            let _ = writeln!(out, "{}", config.version.as_deref().unwrap_or(""));
            Err(0)
        }
        Err(ParseError::Language(message)) => {
            let _ = writeln!(err, "{message}");
            Err(2)
        }
        Err(ParseError::Argument(message)) => {
            let _ = writeln!(err, "{message}");
            let _ = writeln!(err, "{}", doc.trim_end());
            Err(1)
        }
    }
}

/// [`run_with`] over the real stdout/stderr, terminating the process on any
/// non-success outcome.
pub fn run(doc: &str, argv: &[String], config: &ParseConfig) -> Args {
    let stdout = io::stdout();
    let stderr = io::stderr();
    match run_with(doc, argv, config, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(args) => args,
        Err(code) => process::exit(code),
    }
}
