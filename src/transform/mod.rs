// src/transform/mod.rs

//! Manifest rewriting
//!
//! A transform runs in two passes over one manifest:
//!
//! 1. read the manifest into a [`ManifestInfo`](crate::manifest::ManifestInfo),
//!    apply the rule cascades and register it with the repository;
//! 2. stream the original text again and re-emit it, substituting rewritten
//!    fields entry by entry, dropping suppressed sections and injecting
//!    provenance properties.
//!
//! Everything that is not touched is copied byte for byte.

mod context;
mod engine;
mod policy;

pub use context::TransformContext;
pub use engine::{
    SuppressedElement, TransformEngine, TransformOptions, TransformOutcome, TransformRequest,
};
pub use policy::{Candidate, ElementPolicy, Suppression};

use crate::manifest::{Dependency, ManifestError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the transform of one manifest
#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The declared parent is unknown and a parent is required
    #[error("Parent manifest not found: {0}")]
    MissingParent(Dependency),

    #[error("Failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The rewritten manifest could not be stored; the original is untouched
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Rewritten manifest is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
