//! Data model for usage-text driven argument parsing.
//!
//! This crate holds the types shared by every consumer of the parser: the
//! tagged [`Value`] container, the [`Args`] result map, and the
//! [`ParseError`] taxonomy. It contains no parsing logic; see the
//! `usagedoc-parse` crate for the compiler and matcher.
//!
//! All types serialize with [`serde`] into their natural JSON forms, so a
//! result map round-trips as a plain JSON object.

mod args;
mod error;
mod value;

pub use args::Args;
pub use error::{ParseError, Result};
pub use value::{Kind, Value, ValueError};
