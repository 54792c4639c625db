//! Compilation of a help text into a pattern tree and option catalogue.
//!
//! The pipeline: extract the `usage:` and `options:` sections, harvest one
//! [`OptionSpec`] per option block, rewrite the usage body into a formal
//! parenthesized expression, and run a recursive-descent parse over its
//! tokens. Option tokens are resolved against the catalogue by the same code
//! that later parses the argument vector; the `is_argv` flag on the token
//! stream decides whether unique-prefix matching applies and whether parsed
//! values are attached.

use std::collections::HashSet;

use regex::RegexBuilder;
use tracing::debug;

use usagedoc_core::{ParseError, Value};

use crate::descriptor::parse_descriptor;
use crate::matcher::ArgvLeaf;
use crate::pattern::{OptionSpec, Pattern};
use crate::token::Tokens;

/// An option-resolution failure, blamed by the caller: a `Language` error
/// when it happens while compiling the usage text, an `Argument` error when
/// it happens while parsing argv.
#[derive(Debug)]
pub(crate) struct OptionError(pub(crate) String);

/// Extracts every section with the given name (case-insensitive): a line
/// containing the name plus any directly following indented lines.
pub(crate) fn parse_section(name: &str, source: &str) -> Vec<String> {
    let pattern = format!(
        r"(?:^|\n)([^\n]*{}[^\n]*(?:\n[ \t][^\n]*)*)",
        regex::escape(name)
    );
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("section regex must compile");

    re.captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Rewrites a usage section into a single formal expression.
///
/// The text after the first `:` is whitespace-split; the first token is the
/// program name, and each re-occurrence of it starts a new alternative:
/// `prog a b\n  prog c` becomes `( a b ) | ( c )`.
pub(crate) fn formal_usage(section: &str) -> String {
    let body = section.splitn(2, ':').nth(1).unwrap_or("");
    let mut parts = body.split_whitespace();
    let Some(program) = parts.next() else {
        return "( )".to_string();
    };

    let mut out = String::from("(");
    for part in parts {
        if part == program {
            out.push_str(" ) | (");
        } else {
            out.push(' ');
            out.push_str(part);
        }
    }
    out.push_str(" )");
    out
}

/// Harvests the option catalogue from every `options:` section.
pub(crate) fn parse_defaults(doc: &str) -> Vec<OptionSpec> {
    let mut defaults = Vec::new();
    for section in parse_section("options:", doc) {
        let body = section.splitn(2, ':').nth(1).unwrap_or("");
        for block in split_option_blocks(body) {
            if block.starts_with('-') {
                defaults.push(parse_descriptor(&block));
            }
        }
    }
    defaults
}

/// Splits an options-section body into blocks, one per option. A block
/// starts at a line whose first non-blank character is a dash; lines that
/// don't are continuations of the previous block.
fn split_option_blocks(body: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('-') {
            blocks.push(trimmed.to_string());
        } else if let Some(last) = blocks.last_mut() {
            last.push('\n');
            last.push_str(line);
        }
    }
    blocks
}

/// Resolves one `--long[=value]` token against the catalogue.
///
/// Exact long match first; in argv mode an unambiguous prefix also matches.
/// An unknown long is synthesized into the catalogue with its arity inferred
/// from the presence of `=`. In argv mode the returned spec carries the
/// parsed value (`Bool(true)` for flags).
pub(crate) fn parse_long(
    tokens: &mut Tokens,
    options: &mut Vec<OptionSpec>,
) -> Result<OptionSpec, OptionError> {
    let Some(token) = tokens.pop() else {
        return Err(OptionError("expected a long option".to_string()));
    };
    let (long, mut value) = match token.split_once('=') {
        Some((name, given)) => (name.to_string(), Some(given.to_string())),
        None => (token, None),
    };
    let had_equal = value.is_some();

    let mut similar: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, o)| o.long.as_deref() == Some(long.as_str()))
        .map(|(i, _)| i)
        .collect();

    if tokens.is_parsing_argv() && similar.is_empty() {
        similar = options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.long.as_deref().is_some_and(|l| l.starts_with(&long)))
            .map(|(i, _)| i)
            .collect();
    }

    if similar.len() > 1 {
        let candidates: Vec<&str> = similar
            .iter()
            .filter_map(|&i| options[i].long.as_deref())
            .collect();
        return Err(OptionError(format!(
            "'{long}' is not a unique prefix: {}",
            candidates.join(", ")
        )));
    }

    if similar.is_empty() {
        let argcount = u8::from(had_equal);
        let spec = OptionSpec::new(None, Some(long), argcount, Value::Bool(false));
        options.push(spec.clone());
        let mut leaf = spec;
        if tokens.is_parsing_argv() {
            leaf.value = match value {
                Some(given) => Value::Str(given),
                None => Value::Bool(true),
            };
        }
        return Ok(leaf);
    }

    let mut leaf = options[similar[0]].clone();
    let known_long = leaf.long.clone().unwrap_or(long);
    if leaf.argcount == 0 {
        if had_equal {
            return Err(OptionError(format!(
                "{known_long} must not have an argument"
            )));
        }
    } else if value.is_none() {
        match tokens.current() {
            None | Some("--") => {
                return Err(OptionError(format!("{known_long} requires an argument")));
            }
            Some(_) => value = tokens.pop(),
        }
    }

    if tokens.is_parsing_argv() {
        leaf.value = match value {
            Some(given) => Value::Str(given),
            None => Value::Bool(true),
        };
    }
    Ok(leaf)
}

/// Resolves one `-abc` token against the catalogue, character by character.
///
/// Shorts match exactly; an unknown char is synthesized as a flag. When a
/// matched option takes an argument, the rest of the token is the value if
/// anything remains, otherwise the next argv token is consumed.
pub(crate) fn parse_short(
    tokens: &mut Tokens,
    options: &mut Vec<OptionSpec>,
) -> Result<Vec<OptionSpec>, OptionError> {
    let Some(token) = tokens.pop() else {
        return Err(OptionError("expected a short option".to_string()));
    };

    let mut leaves = Vec::new();
    let mut rest = token.strip_prefix('-').unwrap_or(&token);
    while let Some(ch) = rest.chars().next() {
        rest = &rest[ch.len_utf8()..];
        let short = format!("-{ch}");

        let similar: Vec<usize> = options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.short.as_deref() == Some(short.as_str()))
            .map(|(i, _)| i)
            .collect();

        if similar.len() > 1 {
            return Err(OptionError(format!(
                "{short} is specified ambiguously {} times",
                similar.len()
            )));
        }

        if similar.is_empty() {
            let spec = OptionSpec::new(Some(short), None, 0, Value::Bool(false));
            options.push(spec.clone());
            let mut leaf = spec;
            if tokens.is_parsing_argv() {
                leaf.value = Value::Bool(true);
            }
            leaves.push(leaf);
            continue;
        }

        let mut leaf = options[similar[0]].clone();
        let mut value = None;
        if leaf.argcount == 1 {
            if rest.is_empty() {
                match tokens.current() {
                    None | Some("--") => {
                        return Err(OptionError(format!("{short} requires an argument")));
                    }
                    Some(_) => value = tokens.pop(),
                }
            } else {
                value = Some(rest.to_string());
                rest = "";
            }
        }

        if tokens.is_parsing_argv() {
            leaf.value = match value {
                Some(given) => Value::Str(given),
                None => Value::Bool(true),
            };
        }
        leaves.push(leaf);
    }

    Ok(leaves)
}

fn is_argument_spec(token: &str) -> bool {
    (token.starts_with('<') && token.ends_with('>') && token.len() > 1)
        || (!token.is_empty() && token.chars().all(char::is_uppercase))
}

fn parse_atom(
    tokens: &mut Tokens,
    options: &mut Vec<OptionSpec>,
) -> Result<Vec<Pattern>, ParseError> {
    let Some(token) = tokens.current().map(str::to_string) else {
        return Ok(Vec::new());
    };

    if token == "[" || token == "(" {
        let (closing, label) = if token == "[" { ("]", "'['") } else { (")", "'('") };
        tokens.pop();
        let expr = parse_expr(tokens, options)?;
        if tokens.pop().as_deref() != Some(closing) {
            return Err(ParseError::Language(format!("Mismatched {label}")));
        }
        let group = if token == "[" {
            Pattern::Optional(expr)
        } else {
            Pattern::Required(expr)
        };
        return Ok(vec![group]);
    }

    if token == "options" {
        tokens.pop();
        return Ok(vec![Pattern::OptionsShortcut(Vec::new())]);
    }

    if token.starts_with("--") && token != "--" {
        let spec = parse_long(tokens, options).map_err(|e| ParseError::Language(e.0))?;
        return Ok(vec![Pattern::Option(spec)]);
    }

    if token.starts_with('-') && token != "-" && token != "--" {
        let specs = parse_short(tokens, options).map_err(|e| ParseError::Language(e.0))?;
        return Ok(specs.into_iter().map(Pattern::Option).collect());
    }

    tokens.pop();
    if is_argument_spec(&token) {
        Ok(vec![Pattern::argument(&token)])
    } else {
        Ok(vec![Pattern::command(&token)])
    }
}

fn parse_seq(
    tokens: &mut Tokens,
    options: &mut Vec<OptionSpec>,
) -> Result<Vec<Pattern>, ParseError> {
    let mut seq = Vec::new();
    while let Some(token) = tokens.current() {
        if matches!(token, "]" | ")" | "|") {
            break;
        }
        let mut atom = parse_atom(tokens, options)?;
        if tokens.current() == Some("...") {
            tokens.pop();
            let child = if atom.len() == 1 {
                atom
            } else {
                vec![Pattern::Required(atom)]
            };
            seq.push(Pattern::OneOrMore(child));
        } else {
            seq.append(&mut atom);
        }
    }
    Ok(seq)
}

fn collapse_to_required(mut seq: Vec<Pattern>) -> Pattern {
    if seq.len() == 1 {
        seq.remove(0)
    } else {
        Pattern::Required(seq)
    }
}

fn collapse_to_either(mut alternatives: Vec<Pattern>) -> Pattern {
    if alternatives.len() == 1 {
        alternatives.remove(0)
    } else {
        Pattern::Either(alternatives)
    }
}

fn parse_expr(
    tokens: &mut Tokens,
    options: &mut Vec<OptionSpec>,
) -> Result<Vec<Pattern>, ParseError> {
    let seq = parse_seq(tokens, options)?;
    if tokens.current() != Some("|") {
        return Ok(seq);
    }

    let mut alternatives = vec![collapse_to_required(seq)];
    while tokens.current() == Some("|") {
        tokens.pop();
        alternatives.push(collapse_to_required(parse_seq(tokens, options)?));
    }
    Ok(vec![collapse_to_either(alternatives)])
}

/// Parses a formal usage expression into the pattern tree.
pub(crate) fn parse_pattern(
    source: &str,
    options: &mut Vec<OptionSpec>,
) -> Result<Pattern, ParseError> {
    let mut tokens = Tokens::from_pattern(source);
    let result = parse_expr(&mut tokens, options)?;
    if tokens.has_more() {
        return Err(ParseError::Language(format!(
            "Unexpected ending: '{}'",
            tokens.the_rest()
        )));
    }
    Ok(Pattern::Required(result))
}

type OptionIdentity = (Option<String>, Option<String>, u8);

fn owned_identity(spec: &OptionSpec) -> OptionIdentity {
    (spec.short.clone(), spec.long.clone(), spec.argcount)
}

fn expand_options_shortcuts(
    node: &mut Pattern,
    doc: &str,
    referenced: &HashSet<OptionIdentity>,
) {
    match node {
        Pattern::OptionsShortcut(children) => {
            // A fresh catalogue per shortcut node, so its leaves never alias
            // the pattern-referenced descriptors.
            let mut seen = HashSet::new();
            *children = parse_defaults(doc)
                .into_iter()
                .filter(|spec| !referenced.contains(&owned_identity(spec)))
                .filter(|spec| seen.insert(owned_identity(spec)))
                .map(Pattern::Option)
                .collect();
        }
        Pattern::Required(children)
        | Pattern::Optional(children)
        | Pattern::OneOrMore(children)
        | Pattern::Either(children) => {
            for child in children {
                expand_options_shortcuts(child, doc, referenced);
            }
        }
        _ => {}
    }
}

/// Compiles the help text into the pattern tree and the option catalogue.
pub(crate) fn create_pattern_tree(doc: &str) -> Result<(Pattern, Vec<OptionSpec>), ParseError> {
    let usage_sections = parse_section("usage:", doc);
    if usage_sections.is_empty() {
        return Err(ParseError::Language(
            "'usage:' (case-insensitive) not found.".to_string(),
        ));
    }
    if usage_sections.len() > 1 {
        return Err(ParseError::Language(
            "More than one 'usage:' (case-insensitive).".to_string(),
        ));
    }

    let mut options = parse_defaults(doc);
    let mut pattern = parse_pattern(&formal_usage(&usage_sections[0]), &mut options)?;

    let referenced: HashSet<OptionIdentity> = pattern
        .flat(&|p| matches!(p, Pattern::Option(_)))
        .into_iter()
        .filter_map(|p| match p {
            Pattern::Option(spec) => Some(owned_identity(spec)),
            _ => None,
        })
        .collect();
    expand_options_shortcuts(&mut pattern, doc, &referenced);

    debug!(
        catalogue = options.len(),
        referenced = referenced.len(),
        "compiled usage pattern"
    );
    Ok((pattern, options))
}

/// Parses the argument vector into a flat list of leaf tokens.
///
/// A literal `--` turns it and everything after it into positionals; with
/// `options_first`, the first positional does the same for the rest.
pub(crate) fn parse_argv(
    mut tokens: Tokens,
    options: &mut Vec<OptionSpec>,
    options_first: bool,
) -> Result<Vec<ArgvLeaf>, OptionError> {
    let mut parsed = Vec::new();
    while let Some(token) = tokens.current().map(str::to_string) {
        if token == "--" {
            while let Some(value) = tokens.pop() {
                parsed.push(ArgvLeaf::positional(value));
            }
        } else if token.starts_with("--") {
            let spec = parse_long(&mut tokens, options)?;
            parsed.push(ArgvLeaf::option(spec.name(), spec.value.clone()));
        } else if token.starts_with('-') && token != "-" {
            for spec in parse_short(&mut tokens, options)? {
                parsed.push(ArgvLeaf::option(spec.name(), spec.value.clone()));
            }
        } else if options_first {
            while let Some(value) = tokens.pop() {
                parsed.push(ArgvLeaf::positional(value));
            }
        } else if let Some(value) = tokens.pop() {
            parsed.push(ArgvLeaf::positional(value));
        }
    }
    Ok(parsed)
}
