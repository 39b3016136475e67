// src/error.rs

//! Crate-wide error type

use crate::config::ConfigError;
use crate::manifest::ManifestError;
use crate::repository::RepositoryError;
use crate::rules::RuleError;
use crate::transform::TransformError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
