// src/lib.rs

//! pomrewrite
//!
//! Rewrites library manifests (Maven POM files) so that versions and
//! selected sections follow a distribution's packaging conventions, while
//! everything else is preserved as written.
//!
//! # Architecture
//!
//! - Rules: a small pattern language selecting and rewriting dependency
//!   identities, searched most specific first
//! - Manifests: a structured model of one manifest with every dependency
//!   category kept in document order
//! - Repository: a directory of manifests resolved to a fixed point so that
//!   inherited management versions are known
//! - Transform: a two-pass streaming rewrite pairing model entries with
//!   source elements by position

pub mod config;
mod error;
pub mod manifest;
pub mod repository;
pub mod rules;
pub mod transform;

pub use config::{Config, ConfigError, RulesConfig};
pub use error::{Error, Result};
pub use manifest::{Dependency, DependencyKind, ManifestError, ManifestInfo, ManifestReader};
pub use repository::{PlainTextReport, ReportWriter, Repository, RepositoryError, RepositoryReport};
pub use rules::{DependencyRule, Rule, RuleError, RuleSet};
pub use transform::{
    TransformContext, TransformEngine, TransformError, TransformOptions, TransformOutcome,
    TransformRequest,
};
