//! Token streams for the usage grammar and for argument vectors.
//!
//! Two flavours share one cursor type: pattern tokens come from the formal
//! usage expression and are produced by a two-stage regex split; argv tokens
//! are the user's arguments verbatim. The `parsing_argv` flag changes option
//! resolution downstream (unique-prefix matching and value capture apply to
//! argv only).

use std::sync::LazyLock;

use regex::Regex;

/// Strong delimiters of the usage grammar: brackets, parens, the pipe, and
/// the three-dot ellipsis. Each becomes its own token wherever it occurs.
static DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([\[\]()|]|\.\.\.)").expect("static regex must compile"));

/// Everything between delimiters: runs of non-whitespace, keeping `<...>`
/// groups atomic so positional names may contain spaces.
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S*<[^>]*>|[^<>\s]+").expect("static regex must compile"));

#[derive(Debug, Clone)]
pub(crate) struct Tokens {
    tokens: Vec<String>,
    index: usize,
    parsing_argv: bool,
}

impl Tokens {
    /// Wraps an argument vector as-is.
    pub(crate) fn from_argv(argv: &[String]) -> Self {
        Tokens {
            tokens: argv.to_vec(),
            index: 0,
            parsing_argv: true,
        }
    }

    /// Tokenizes a formal usage expression.
    ///
    /// The delimiters `[ ] ( ) |` and `...` are split out wherever they
    /// occur, even glued to the end of a word; the text between them is then
    /// split into words.
    pub(crate) fn from_pattern(source: &str) -> Self {
        let mut tokens = Vec::new();
        let mut last = 0;

        for cap in DELIMITER_RE.captures_iter(source) {
            let Some(delim) = cap.get(1) else { continue };
            let whole = cap.get(0).map_or(delim.range(), |m| m.range());
            for word in WORD_RE.find_iter(&source[last..whole.start]) {
                tokens.push(word.as_str().to_string());
            }
            tokens.push(delim.as_str().to_string());
            last = whole.end;
        }
        for word in WORD_RE.find_iter(&source[last..]) {
            tokens.push(word.as_str().to_string());
        }

        Tokens {
            tokens,
            index: 0,
            parsing_argv: false,
        }
    }

    pub(crate) fn has_more(&self) -> bool {
        self.index < self.tokens.len()
    }

    pub(crate) fn current(&self) -> Option<&str> {
        self.tokens.get(self.index).map(String::as_str)
    }

    pub(crate) fn pop(&mut self) -> Option<String> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// The unconsumed remainder joined with spaces, for error messages.
    pub(crate) fn the_rest(&self) -> String {
        self.tokens[self.index.min(self.tokens.len())..].join(" ")
    }

    pub(crate) fn is_parsing_argv(&self) -> bool {
        self.parsing_argv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_tokens(source: &str) -> Vec<String> {
        let mut tokens = Tokens::from_pattern(source);
        let mut out = Vec::new();
        while let Some(token) = tokens.pop() {
            out.push(token);
        }
        out
    }

    #[test]
    fn test_splits_delimiters_from_words() {
        assert_eq!(
            pattern_tokens("( [a] | b... )"),
            vec!["(", "[", "a", "]", "|", "b", "...", ")"]
        );
    }

    #[test]
    fn test_glued_delimiters() {
        assert_eq!(
            pattern_tokens("(--all|-x)..."),
            vec!["(", "--all", "|", "-x", ")", "..."]
        );
    }

    #[test]
    fn test_angle_brackets_stay_atomic() {
        assert_eq!(
            pattern_tokens("<kind of fish> --speed=<knots>"),
            vec!["<kind of fish>", "--speed=<knots>"]
        );
    }

    #[test]
    fn test_cursor_and_rest() {
        let mut tokens = Tokens::from_pattern("a b c");
        assert!(tokens.has_more());
        assert_eq!(tokens.current(), Some("a"));
        assert_eq!(tokens.pop().as_deref(), Some("a"));
        assert_eq!(tokens.the_rest(), "b c");
        tokens.pop();
        tokens.pop();
        assert!(!tokens.has_more());
        assert_eq!(tokens.current(), None);
        assert_eq!(tokens.pop(), None);
        assert_eq!(tokens.the_rest(), "");
    }

    #[test]
    fn test_argv_tokens_verbatim() {
        let argv = vec!["--speed=15".to_string(), "[x]".to_string()];
        let mut tokens = Tokens::from_argv(&argv);
        assert!(tokens.is_parsing_argv());
        assert_eq!(tokens.pop().as_deref(), Some("--speed=15"));
        assert_eq!(tokens.pop().as_deref(), Some("[x]"));
    }
}
