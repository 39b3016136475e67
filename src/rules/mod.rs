// src/rules/mod.rs

//! Pattern rules for rewriting dependency identities
//!
//! - [`Rule`] compiles one field pattern (literal, `*` wildcard or `s///`)
//! - [`DependencyRule`] combines six field rules into a unit matched against a
//!   whole dependency
//! - [`RuleSet`] orders rules by specificity and answers first-match queries

mod composite;
mod rule;
mod set;

pub use composite::{DependencyRule, KEEP_PLUGIN_VERSION, TO_PLACEHOLDER_VERSION};
pub use rule::Rule;
pub use set::RuleSet;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while compiling or loading rules
#[derive(Error, Debug)]
pub enum RuleError {
    /// A field pattern is not a valid regular expression
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// `s//.../` with nothing to match
    #[error("Empty pattern in substitution rule '{0}'")]
    EmptySubstitution(String),

    /// More than six fields on one line
    #[error("Too many fields in rule '{0}'")]
    TooManyFields(String),

    /// A rule line that failed to compile
    #[error("line {line}: {source}")]
    InvalidLine {
        line: usize,
        source: Box<RuleError>,
    },

    /// The rule file could not be read
    #[error("Failed to read rules from '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}
