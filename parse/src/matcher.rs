//! Backtracking match of an argument vector against the pattern tree.
//!
//! The argv is first reduced to a flat list of [`ArgvLeaf`] tokens; matching
//! then walks the tree, moving tokens from the residual `left` list into the
//! `collected` accumulator. Group nodes work on copies and commit only on
//! success, so a failed alternative leaves both lists untouched.
//!
//! Accumulation is keyed by canonical leaf name. A leaf whose declared value
//! is an `Int` counts occurrences; one declared as a `List` appends values
//! in argv order; everything else records the matched token as-is.

use usagedoc_core::Value;

use crate::pattern::Pattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgvLeafKind {
    /// A positional token, including everything after `--`.
    Positional,
    /// A resolved option occurrence.
    Option,
}

/// One token of the parsed argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArgvLeaf {
    pub(crate) kind: ArgvLeafKind,
    pub(crate) name: String,
    pub(crate) value: Value,
}

impl ArgvLeaf {
    pub(crate) fn positional(value: String) -> Self {
        ArgvLeaf {
            kind: ArgvLeafKind::Positional,
            name: String::new(),
            value: Value::Str(value),
        }
    }

    pub(crate) fn option(name: &str, value: Value) -> Self {
        ArgvLeaf {
            kind: ArgvLeafKind::Option,
            name: name.to_string(),
            value,
        }
    }

    /// How the token reads in an error message.
    pub(crate) fn display_token(&self) -> &str {
        match &self.value {
            Value::Str(s) if self.kind == ArgvLeafKind::Positional => s,
            _ => &self.name,
        }
    }
}

/// A leaf moved into the accumulator, carrying its result-map name and the
/// value accumulated so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchedLeaf {
    pub(crate) name: String,
    pub(crate) value: Value,
}

impl Pattern {
    /// Attempts to match this pattern against the residual token list.
    ///
    /// On success `left` and `collected` are updated; on failure both are
    /// left exactly as they were.
    pub(crate) fn match_tokens(
        &self,
        left: &mut Vec<ArgvLeaf>,
        collected: &mut Vec<MatchedLeaf>,
    ) -> bool {
        match self {
            Pattern::Required(children) => {
                let mut l = left.clone();
                let mut c = collected.clone();
                for child in children {
                    if !child.match_tokens(&mut l, &mut c) {
                        return false;
                    }
                }
                *left = l;
                *collected = c;
                true
            }
            Pattern::Optional(children) | Pattern::OptionsShortcut(children) => {
                for child in children {
                    child.match_tokens(left, collected);
                }
                true
            }
            Pattern::OneOrMore(children) => {
                let Some(child) = children.first() else {
                    return false;
                };
                let mut l = left.clone();
                let mut c = collected.clone();
                let mut times = 0usize;
                // Options and optionals can succeed without consuming, so
                // termination is detected by comparing residuals, not by the
                // match result alone.
                let mut previous: Option<Vec<ArgvLeaf>> = None;
                loop {
                    let matched = child.match_tokens(&mut l, &mut c);
                    if matched {
                        times += 1;
                    }
                    if previous.as_ref() == Some(&l) {
                        break;
                    }
                    previous = Some(l.clone());
                    if !matched {
                        break;
                    }
                }
                if times == 0 {
                    return false;
                }
                *left = l;
                *collected = c;
                true
            }
            Pattern::Either(children) => {
                // Every alternative starts from the same state; the one
                // leaving the smallest residual wins, first in source order
                // on ties.
                let mut best: Option<(Vec<ArgvLeaf>, Vec<MatchedLeaf>)> = None;
                for child in children {
                    let mut l = left.clone();
                    let mut c = collected.clone();
                    if child.match_tokens(&mut l, &mut c)
                        && best.as_ref().is_none_or(|(bl, _)| l.len() < bl.len())
                    {
                        best = Some((l, c));
                    }
                }
                match best {
                    Some((l, c)) => {
                        *left = l;
                        *collected = c;
                        true
                    }
                    None => false,
                }
            }
            leaf => leaf.match_leaf(left, collected),
        }
    }

    fn match_leaf(&self, left: &mut Vec<ArgvLeaf>, collected: &mut Vec<MatchedLeaf>) -> bool {
        let Some((index, matched)) = self.single_match(left) else {
            return false;
        };
        left.remove(index);

        let declared = self.leaf_value().cloned().unwrap_or(Value::Empty);
        match declared {
            Value::Int(_) => {
                match collected.iter_mut().find(|m| m.name == matched.name) {
                    Some(entry) => {
                        let count = entry.value.as_int().unwrap_or(0) + 1;
                        entry.value = Value::Int(count);
                    }
                    None => collected.push(MatchedLeaf {
                        name: matched.name,
                        value: Value::Int(1),
                    }),
                }
            }
            Value::List(_) => {
                let new_values: Vec<String> = match &matched.value {
                    Value::Str(s) => vec![s.clone()],
                    Value::List(items) => items.clone(),
                    _ => Vec::new(),
                };
                match collected.iter_mut().find(|m| m.name == matched.name) {
                    Some(entry) => {
                        let mut merged = match &entry.value {
                            Value::List(existing) => existing.clone(),
                            _ => Vec::new(),
                        };
                        merged.extend(new_values);
                        entry.value = Value::List(merged);
                    }
                    None => collected.push(MatchedLeaf {
                        name: matched.name,
                        value: Value::List(new_values),
                    }),
                }
            }
            _ => collected.push(matched),
        }
        true
    }

    /// Finds the token this leaf matches, without removing it.
    fn single_match(&self, left: &[ArgvLeaf]) -> Option<(usize, MatchedLeaf)> {
        match self {
            Pattern::Argument(leaf) => left
                .iter()
                .position(|t| t.kind == ArgvLeafKind::Positional)
                .map(|i| {
                    (
                        i,
                        MatchedLeaf {
                            name: leaf.name.clone(),
                            value: left[i].value.clone(),
                        },
                    )
                }),
            Pattern::Command(leaf) => {
                // Only the first positional token is considered; a command
                // never skips over a mismatching one.
                for (i, token) in left.iter().enumerate() {
                    if token.kind == ArgvLeafKind::Positional {
                        if token.value.as_str() == Some(leaf.name.as_str()) {
                            return Some((
                                i,
                                MatchedLeaf {
                                    name: leaf.name.clone(),
                                    value: Value::Bool(true),
                                },
                            ));
                        }
                        return None;
                    }
                }
                None
            }
            Pattern::Option(spec) => left.iter().position(|t| t.name == spec.name()).map(|i| {
                (
                    i,
                    MatchedLeaf {
                        name: left[i].name.clone(),
                        value: left[i].value.clone(),
                    },
                )
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::OptionSpec;

    fn option_leaf(short: Option<&str>, long: Option<&str>, argcount: u8) -> Pattern {
        Pattern::Option(OptionSpec::new(
            short.map(str::to_string),
            long.map(str::to_string),
            argcount,
            Value::Bool(false),
        ))
    }

    fn argv_flag(name: &str) -> ArgvLeaf {
        ArgvLeaf::option(name, Value::Bool(true))
    }

    #[test]
    fn test_argument_takes_first_positional() {
        let pattern = Pattern::argument("<x>");
        let mut left = vec![argv_flag("-v"), ArgvLeaf::positional("10".into())];
        let mut collected = Vec::new();

        assert!(pattern.match_tokens(&mut left, &mut collected));
        assert_eq!(left, vec![argv_flag("-v")]);
        assert_eq!(collected[0].name, "<x>");
        assert_eq!(collected[0].value, Value::Str("10".into()));
    }

    #[test]
    fn test_command_requires_exact_first_positional() {
        let pattern = Pattern::command("move");
        let mut collected = Vec::new();

        let mut left = vec![ArgvLeaf::positional("move".into())];
        assert!(pattern.match_tokens(&mut left, &mut collected));
        assert!(left.is_empty());
        assert_eq!(collected[0].value, Value::Bool(true));

        // A different positional in front blocks the command entirely.
        let mut left = vec![
            ArgvLeaf::positional("other".into()),
            ArgvLeaf::positional("move".into()),
        ];
        let mut collected = Vec::new();
        assert!(!pattern.match_tokens(&mut left, &mut collected));
        assert_eq!(left.len(), 2);
        assert!(collected.is_empty());
    }

    #[test]
    fn test_option_matches_by_canonical_name() {
        let pattern = option_leaf(Some("-v"), Some("--verbose"), 0);
        let mut left = vec![ArgvLeaf::positional("x".into()), argv_flag("--verbose")];
        let mut collected = Vec::new();

        assert!(pattern.match_tokens(&mut left, &mut collected));
        assert_eq!(left.len(), 1);
        assert_eq!(collected[0].name, "--verbose");
    }

    #[test]
    fn test_required_is_all_or_nothing() {
        let pattern = Pattern::Required(vec![
            option_leaf(Some("-a"), None, 0),
            option_leaf(Some("-b"), None, 0),
        ]);
        let mut left = vec![argv_flag("-a")];
        let mut collected = Vec::new();

        assert!(!pattern.match_tokens(&mut left, &mut collected));
        // failed match must not consume anything
        assert_eq!(left, vec![argv_flag("-a")]);
        assert!(collected.is_empty());
    }

    #[test]
    fn test_optional_always_succeeds() {
        let pattern = Pattern::Optional(vec![option_leaf(Some("-a"), None, 0)]);
        let mut left = Vec::new();
        let mut collected = Vec::new();
        assert!(pattern.match_tokens(&mut left, &mut collected));
        assert!(collected.is_empty());
    }

    #[test]
    fn test_one_or_more_consumes_greedily() {
        let pattern = Pattern::OneOrMore(vec![Pattern::argument("<f>")]);
        let mut left = vec![
            ArgvLeaf::positional("a".into()),
            ArgvLeaf::positional("b".into()),
        ];
        let mut collected = Vec::new();

        // without list promotion each iteration appends its own entry
        assert!(pattern.match_tokens(&mut left, &mut collected));
        assert!(left.is_empty());
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn test_one_or_more_requires_at_least_one() {
        let pattern = Pattern::OneOrMore(vec![Pattern::argument("<f>")]);
        let mut left = vec![argv_flag("-v")];
        let mut collected = Vec::new();
        assert!(!pattern.match_tokens(&mut left, &mut collected));
        assert_eq!(left.len(), 1);
    }

    #[test]
    fn test_one_or_more_terminates_on_no_progress() {
        // An optional child always "matches"; the loop must stop once the
        // residual stops shrinking.
        let pattern = Pattern::OneOrMore(vec![Pattern::Optional(vec![option_leaf(
            Some("-v"),
            None,
            0,
        )])]);
        let mut left = vec![argv_flag("-v"), argv_flag("-v")];
        let mut collected = Vec::new();

        assert!(pattern.match_tokens(&mut left, &mut collected));
        assert!(left.is_empty());
    }

    #[test]
    fn test_either_prefers_largest_consumption() {
        let a = option_leaf(Some("-a"), None, 0);
        let b = option_leaf(Some("-b"), None, 0);
        let pattern = Pattern::Either(vec![
            a.clone(),
            Pattern::Required(vec![a.clone(), b.clone()]),
        ]);
        let mut left = vec![argv_flag("-a"), argv_flag("-b")];
        let mut collected = Vec::new();

        assert!(pattern.match_tokens(&mut left, &mut collected));
        assert!(left.is_empty());
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn test_either_tie_breaks_on_first_alternative() {
        let a = option_leaf(Some("-a"), None, 0);
        let b = option_leaf(Some("-b"), None, 0);
        let pattern = Pattern::Either(vec![a, b]);
        let mut left = vec![argv_flag("-a"), argv_flag("-b")];
        let mut collected = Vec::new();

        assert!(pattern.match_tokens(&mut left, &mut collected));
        assert_eq!(left, vec![argv_flag("-b")]);
        assert_eq!(collected[0].name, "-a");
    }

    #[test]
    fn test_counter_accumulation() {
        let mut spec = OptionSpec::new(Some("-v".into()), None, 0, Value::Bool(false));
        spec.value = Value::Int(0);
        let pattern = Pattern::Option(spec);
        let mut left = vec![argv_flag("-v"), argv_flag("-v"), argv_flag("-v")];
        let mut collected = Vec::new();

        for _ in 0..3 {
            assert!(pattern.match_tokens(&mut left, &mut collected));
        }
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].value, Value::Int(3));
    }

    #[test]
    fn test_list_accumulation_preserves_argv_order() {
        let mut leaf = Pattern::argument("<f>");
        leaf.set_leaf_value(Value::List(Vec::new()));
        let mut left = vec![
            ArgvLeaf::positional("one".into()),
            ArgvLeaf::positional("two".into()),
        ];
        let mut collected = Vec::new();

        assert!(leaf.match_tokens(&mut left, &mut collected));
        assert!(leaf.match_tokens(&mut left, &mut collected));
        assert_eq!(collected.len(), 1);
        assert_eq!(
            collected[0].value,
            Value::List(vec!["one".into(), "two".into()])
        );
    }
}
