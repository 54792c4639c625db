//! The result map returned by a successful parse.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Mapping from every declared name in the usage text to its parsed value.
///
/// Keys are canonical names exactly as they appear in the help: `--output`
/// for options (long form preferred over short), `<name>` or `NAME` for
/// positionals, and the bare word for commands. Iteration and JSON
/// serialization are in sorted key order.
///
/// # Examples
///
/// ```
/// use usagedoc_core::{Args, Value};
///
/// let mut args = Args::default();
/// args.insert("--verbose", Value::Int(2));
/// args.insert("<file>", Value::Str("a.txt".into()));
///
/// assert_eq!(args.get_count("--verbose"), 2);
/// assert_eq!(args.get_str("<file>"), Some("a.txt"));
/// assert!(args.get("--missing").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args {
    map: BTreeMap<String, Value>,
}

impl Args {
    /// Sets `name` to `value`, replacing any previous entry.
    pub fn insert(&mut self, name: &str, value: Value) {
        self.map.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Whether a flag or command was given. Absent names and non-boolean
    /// values read as `false`.
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Occurrence count for a repeatable flag or command. A plain boolean
    /// reads as 0 or 1; absent names read as 0.
    pub fn get_count(&self, name: &str) -> i64 {
        match self.get(name) {
            Some(Value::Int(n)) => *n,
            Some(Value::Bool(true)) => 1,
            _ => 0,
        }
    }

    /// The string value of an argument-taking option or positional, if one
    /// was supplied or defaulted.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// All values of a repeating argument, in argv order.
    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Args {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Args {
            map: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Args {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.into_iter()
    }
}
