//! Error taxonomy for usage-text parsing.
//!
//! Errors are categorized by blame: [`ParseError::Language`] means the usage
//! text itself is malformed (author error), [`ParseError::Argument`] means
//! the argument vector did not fit the declared patterns (user error). The
//! two early-exit signals for `--help` and `--version` travel through the
//! same channel so callers handle every non-success outcome in one place.

use thiserror::Error;

/// Any non-success outcome of parsing argv against a usage text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The usage text could not be compiled: missing or duplicated `usage:`
    /// section, unbalanced brackets, trailing pattern tokens, or an
    /// inconsistent option description.
    #[error("{0}")]
    Language(String),

    /// The argument vector did not match: unknown or ambiguous option,
    /// arity violation, or leftover tokens.
    #[error("{0}")]
    Argument(String),

    /// `-h`/`--help` was supplied and help handling is enabled. Not an
    /// error; the caller should print the usage text and exit cleanly.
    #[error("help requested")]
    Help,

    /// `--version` was supplied and a version string is configured. Not an
    /// error; the caller should print the version and exit cleanly.
    #[error("version requested")]
    Version,
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;
