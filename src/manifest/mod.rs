// src/manifest/mod.rs

//! Manifest model and parsing
//!
//! A manifest declares a component's identity, its parent manifest, and the
//! dependencies, plugins, extensions and modules it uses. This module holds
//! the structured model ([`ManifestInfo`]), the identity type shared with the
//! rule engine ([`Dependency`]) and the parser ([`ManifestReader`]).

mod dependency;
mod info;
mod path;
mod reader;

pub use dependency::{
    Dependency, DEFAULT_PLUGIN_GROUP, DEFAULT_SCOPE, DEFAULT_TYPE, PLACEHOLDER_VERSION, PLUGIN_TYPE,
};
pub use info::{DependencyKind, ManifestInfo};
pub use path::{ElementPath, Frame};
pub use reader::ManifestReader;

pub(crate) use reader::{local_name, read_element_text, ENTRY_FIELDS, PARENT_FIELDS, PROJECT_FIELDS};

use quick_xml::Reader;
use std::path::PathBuf;
use thiserror::Error;

/// File extension of manifests stored in a repository
pub const MANIFEST_EXTENSION: &str = "pom";

/// Errors raised while reading a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be read
    #[error("Failed to read manifest '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The text is not well-formed
    #[error("Malformed manifest near byte {position}: {source}")]
    Xml {
        position: u64,
        source: quick_xml::Error,
    },

    /// An entity or character reference could not be decoded
    #[error("Invalid escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// The document root is not `<project>`
    #[error("Manifest has no <project> root element")]
    MissingRoot,

    /// The project declares no artifactId
    #[error("Manifest does not declare an artifactId")]
    MissingArtifact,
}

impl ManifestError {
    pub(crate) fn xml(reader: &Reader<&[u8]>, source: quick_xml::Error) -> Self {
        ManifestError::Xml {
            position: reader.buffer_position() as u64,
            source,
        }
    }
}
