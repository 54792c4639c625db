//! Canonicalization of the compiled pattern tree.
//!
//! In a value tree, structurally equal nodes already behave as one identity
//! for name-keyed matching, so the deduplication step reduces to the repeat
//! fix: any leaf that can occur more than once in a single flattened
//! alternative is switched into accumulating mode before matching starts —
//! counted flags become `Int(0)`, repeatable arguments and argument-taking
//! options become lists.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use usagedoc_core::Value;

use crate::pattern::Pattern;

/// Canonicalizes a freshly compiled pattern tree.
pub(crate) fn fix(mut pattern: Pattern) -> Pattern {
    fix_repeating_arguments(&mut pattern);
    pattern
}

fn fix_repeating_arguments(pattern: &mut Pattern) {
    let start = match pattern.children() {
        Some(children) => children.to_vec(),
        None => vec![pattern.clone()],
    };

    // First pass over the flattened alternatives: decide, per structural
    // identity, what the accumulating value should be.
    let mut promotions: HashMap<u64, Value> = HashMap::new();
    for sequence in transform(start) {
        let mut counts: HashMap<u64, (&Pattern, usize)> = HashMap::new();
        for leaf in &sequence {
            counts.entry(leaf.structural_hash()).or_insert((leaf, 0)).1 += 1;
        }
        for (hash, (leaf, count)) in counts {
            if count < 2 {
                continue;
            }
            if let Some(value) = promoted_value(leaf) {
                promotions.entry(hash).or_insert(value);
            }
        }
    }

    if promotions.is_empty() {
        return;
    }
    debug!(leaves = promotions.len(), "promoting repeating leaves");

    // Second pass: rewrite every structurally equal occurrence in the tree.
    pattern.for_each_leaf_mut(&mut |leaf| {
        if let Some(value) = promotions.get(&leaf.structural_hash()) {
            let value = value.clone();
            leaf.set_leaf_value(value);
        }
    });
}

fn promoted_value(leaf: &Pattern) -> Option<Value> {
    match leaf {
        Pattern::Command(_) => Some(Value::Int(0)),
        Pattern::Option(spec) if spec.argcount == 0 => Some(Value::Int(0)),
        Pattern::Option(spec) => Some(as_list(&spec.value)),
        Pattern::Argument(inner) => Some(as_list(&inner.value)),
        _ => None,
    }
}

/// An existing string default seeds the list by whitespace-splitting; an
/// existing list is kept; anything else starts empty.
fn as_list(current: &Value) -> Value {
    match current {
        Value::Str(s) => Value::List(s.split_whitespace().map(str::to_string).collect()),
        Value::List(items) => Value::List(items.clone()),
        _ => Value::List(Vec::new()),
    }
}

/// Expands the tree into its transform set: every `Either`-free,
/// `OneOrMore`-free flat child sequence that could arise during matching.
///
/// Worklist expansion of the first branch node in each sequence: an `Either`
/// forks one sequence per alternative, a `OneOrMore` lists its children
/// twice to model repetition, and the other branches inline their children.
fn transform(children: Vec<Pattern>) -> Vec<Vec<Pattern>> {
    let mut result = Vec::new();
    let mut groups: VecDeque<Vec<Pattern>> = VecDeque::new();
    groups.push_back(children);

    while let Some(group) = groups.pop_front() {
        let Some(index) = group.iter().position(Pattern::is_branch) else {
            result.push(group);
            continue;
        };

        let mut rest = group;
        let branch = rest.remove(index);
        match branch {
            Pattern::Either(alternatives) => {
                for alternative in alternatives {
                    let mut next = vec![alternative];
                    next.extend(rest.iter().cloned());
                    groups.push_back(next);
                }
            }
            Pattern::OneOrMore(sub) => {
                let mut next = sub.clone();
                next.extend(sub);
                next.extend(rest);
                groups.push_back(next);
            }
            Pattern::Required(sub) | Pattern::Optional(sub) | Pattern::OptionsShortcut(sub) => {
                let mut next = sub;
                next.extend(rest);
                groups.push_back(next);
            }
            // position() only returns branch nodes
            Pattern::Argument(_) | Pattern::Command(_) | Pattern::Option(_) => {}
        }
    }

    result
}
