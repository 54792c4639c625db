//! The pattern tree compiled from a usage expression.
//!
//! Leaves are positionals, commands, and options; branches encode grouping,
//! optionality, alternation, and repetition. The tree is a plain value tree:
//! occurrences of the same option across alternatives are correlated by
//! canonical name and structural equality rather than by shared ownership,
//! so the whole tree derives `Eq` and `Hash` and structural identity falls
//! out of the derive.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use usagedoc_core::Value;

/// A named leaf: a positional argument or a command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Leaf {
    pub(crate) name: String,
    pub(crate) value: Value,
}

/// An option descriptor: synonyms, arity, and declared (default) value.
///
/// One `OptionSpec` serves both as a catalogue entry harvested from an
/// `options:` section and as an option leaf inside the pattern tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct OptionSpec {
    pub(crate) short: Option<String>,
    pub(crate) long: Option<String>,
    pub(crate) argcount: u8,
    pub(crate) value: Value,
}

impl OptionSpec {
    pub(crate) fn new(
        short: Option<String>,
        long: Option<String>,
        argcount: u8,
        value: Value,
    ) -> Self {
        // An argument-taking option with no default has no value at all,
        // not a false one.
        let value = if argcount > 0 && value == Value::Bool(false) {
            Value::Empty
        } else {
            value
        };
        OptionSpec {
            short,
            long,
            argcount,
            value,
        }
    }

    /// Canonical name: the long synonym if present, else the short.
    pub(crate) fn name(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Pattern {
    /// Positional argument; matches any non-option token.
    Argument(Leaf),
    /// Matches the literal token equal to its name.
    Command(Leaf),
    /// Matches a previously parsed option of the same canonical name.
    Option(OptionSpec),
    /// All children must match, in order.
    Required(Vec<Pattern>),
    /// Each child is attempted; the group always succeeds.
    Optional(Vec<Pattern>),
    /// `[options]`: an optional group whose children are filled in with the
    /// catalogue options not referenced elsewhere in the pattern.
    OptionsShortcut(Vec<Pattern>),
    /// The single child matched greedily, at least once.
    OneOrMore(Vec<Pattern>),
    /// Alternatives; the one consuming the most tokens wins.
    Either(Vec<Pattern>),
}

impl Pattern {
    pub(crate) fn argument(name: &str) -> Self {
        Pattern::Argument(Leaf {
            name: name.to_string(),
            value: Value::Empty,
        })
    }

    pub(crate) fn command(name: &str) -> Self {
        Pattern::Command(Leaf {
            name: name.to_string(),
            value: Value::Bool(false),
        })
    }

    pub(crate) fn is_branch(&self) -> bool {
        self.children().is_some()
    }

    pub(crate) fn children(&self) -> Option<&[Pattern]> {
        match self {
            Pattern::Required(c)
            | Pattern::Optional(c)
            | Pattern::OptionsShortcut(c)
            | Pattern::OneOrMore(c)
            | Pattern::Either(c) => Some(c),
            _ => None,
        }
    }

    /// The canonical name of a leaf; `None` for branches.
    pub(crate) fn leaf_name(&self) -> Option<&str> {
        match self {
            Pattern::Argument(leaf) | Pattern::Command(leaf) => Some(&leaf.name),
            Pattern::Option(spec) => Some(spec.name()),
            _ => None,
        }
    }

    /// The declared value of a leaf; `None` for branches.
    pub(crate) fn leaf_value(&self) -> Option<&Value> {
        match self {
            Pattern::Argument(leaf) | Pattern::Command(leaf) => Some(&leaf.value),
            Pattern::Option(spec) => Some(&spec.value),
            _ => None,
        }
    }

    pub(crate) fn set_leaf_value(&mut self, value: Value) {
        match self {
            Pattern::Argument(leaf) | Pattern::Command(leaf) => leaf.value = value,
            Pattern::Option(spec) => spec.value = value,
            _ => {}
        }
    }

    /// Collects every leaf in the tree, in source order.
    pub(crate) fn leaves(&self) -> Vec<&Pattern> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Pattern>) {
        match self.children() {
            Some(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            None => out.push(self),
        }
    }

    /// Flattens the tree into the nodes accepted by `filter`, stopping
    /// descent at each hit.
    pub(crate) fn flat<'a>(&'a self, filter: &dyn Fn(&Pattern) -> bool) -> Vec<&'a Pattern> {
        let mut out = Vec::new();
        self.flat_into(filter, &mut out);
        out
    }

    fn flat_into<'a>(&'a self, filter: &dyn Fn(&Pattern) -> bool, out: &mut Vec<&'a Pattern>) {
        if filter(self) {
            out.push(self);
            return;
        }
        if let Some(children) = self.children() {
            for child in children {
                child.flat_into(filter, out);
            }
        }
    }

    /// Applies `f` to every leaf in the tree, mutably.
    pub(crate) fn for_each_leaf_mut(&mut self, f: &mut dyn FnMut(&mut Pattern)) {
        match self {
            Pattern::Required(c)
            | Pattern::Optional(c)
            | Pattern::OptionsShortcut(c)
            | Pattern::OneOrMore(c)
            | Pattern::Either(c) => {
                for child in c {
                    child.for_each_leaf_mut(f);
                }
            }
            leaf => f(leaf),
        }
    }

    /// Stable structural hash; equal for equivalent nodes.
    pub(crate) fn structural_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
