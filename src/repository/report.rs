// src/repository/report.rs

//! Scan diagnostics
//!
//! A scan never fails on a single bad manifest. Whatever could not be
//! resolved is collected into a [`RepositoryReport`] and rendered by a
//! [`ReportWriter`], either as plain text for a terminal or as JSON for
//! tooling.

use crate::manifest::{Dependency, DependencyKind};
use serde::{Serialize, Serializer};
use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;

fn as_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn as_display_list<S: Serializer>(values: &[Dependency], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(ToString::to_string))
}

/// A manifest whose parent is not in the repository
#[derive(Debug, Clone, Serialize)]
pub struct MissingParent {
    pub file: PathBuf,
    #[serde(serialize_with = "as_display")]
    pub parent: Dependency,
}

/// A resolved manifest with entries no management list could version
#[derive(Debug, Clone, Serialize)]
pub struct MissingVersions {
    pub file: PathBuf,
    #[serde(serialize_with = "as_display_list")]
    pub dependencies: Vec<Dependency>,
}

/// A dependency used by a manifest but absent from the repository
#[derive(Debug, Clone, Serialize)]
pub struct UnpackagedDependency {
    pub file: PathBuf,
    #[serde(serialize_with = "as_display")]
    pub kind: DependencyKind,
    #[serde(serialize_with = "as_display")]
    pub dependency: Dependency,
}

/// A file with the manifest extension that failed to parse
#[derive(Debug, Clone, Serialize)]
pub struct Unreadable {
    pub file: PathBuf,
    pub error: String,
}

/// Summary of a repository scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepositoryReport {
    /// Number of manifests fully resolved
    pub resolved: usize,
    pub missing_parent: Vec<MissingParent>,
    /// Manifests whose parent is known but never resolved, usually a cycle
    pub unresolved: Vec<PathBuf>,
    pub missing_versions: Vec<MissingVersions>,
    pub unpackaged: Vec<UnpackagedDependency>,
    pub unreadable: Vec<Unreadable>,
}

impl RepositoryReport {
    /// True when the scan found nothing to complain about
    pub fn is_clean(&self) -> bool {
        self.missing_parent.is_empty()
            && self.unresolved.is_empty()
            && self.missing_versions.is_empty()
            && self.unpackaged.is_empty()
            && self.unreadable.is_empty()
    }
}

/// Renders a [`RepositoryReport`]
pub trait ReportWriter {
    fn write_report(&self, report: &RepositoryReport, out: &mut dyn Write) -> io::Result<()>;
}

/// Human-readable listing grouped by problem
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextReport;

impl ReportWriter for PlainTextReport {
    fn write_report(&self, report: &RepositoryReport, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Resolved manifests: {}", report.resolved)?;

        if !report.missing_parent.is_empty() {
            writeln!(out, "\nMissing parents:")?;
            for entry in &report.missing_parent {
                writeln!(out, "  {} (parent {})", entry.file.display(), entry.parent)?;
            }
        }

        if !report.unresolved.is_empty() {
            writeln!(out, "\nUnresolved:")?;
            for file in &report.unresolved {
                writeln!(out, "  {}", file.display())?;
            }
        }

        if !report.missing_versions.is_empty() {
            writeln!(out, "\nDependencies without a version:")?;
            for entry in &report.missing_versions {
                writeln!(out, "  {}", entry.file.display())?;
                for dep in &entry.dependencies {
                    writeln!(out, "    {}", dep)?;
                }
            }
        }

        if !report.unpackaged.is_empty() {
            writeln!(out, "\nUnpackaged dependencies:")?;
            for entry in &report.unpackaged {
                writeln!(
                    out,
                    "  {} [{}] needed by {}",
                    entry.dependency,
                    entry.kind,
                    entry.file.display()
                )?;
            }
        }

        if !report.unreadable.is_empty() {
            writeln!(out, "\nUnreadable manifests:")?;
            for entry in &report.unreadable {
                writeln!(out, "  {}: {}", entry.file.display(), entry.error)?;
            }
        }

        Ok(())
    }
}

/// Pretty-printed JSON document
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReport;

impl ReportWriter for JsonReport {
    fn write_report(&self, report: &RepositoryReport, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RepositoryReport {
        RepositoryReport {
            resolved: 3,
            missing_parent: vec![MissingParent {
                file: PathBuf::from("/repo/orphan.pom"),
                parent: Dependency::new("com.x", "ghost", "pom", "1"),
            }],
            unpackaged: vec![UnpackagedDependency {
                file: PathBuf::from("/repo/lib.pom"),
                kind: DependencyKind::Plugins,
                dependency: Dependency::new("org.x", "x-plugin", "maven-plugin", "2"),
            }],
            ..RepositoryReport::default()
        }
    }

    #[test]
    fn test_plain_text_lists_sections() {
        let mut out = Vec::new();
        PlainTextReport.write_report(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Resolved manifests: 3"));
        assert!(text.contains("/repo/orphan.pom (parent com.x:ghost:pom:1)"));
        assert!(text.contains("org.x:x-plugin:maven-plugin:2 [plugins] needed by /repo/lib.pom"));
        assert!(!text.contains("Unreadable"));
    }

    #[test]
    fn test_json_uses_coordinates() {
        let mut out = Vec::new();
        JsonReport.write_report(&sample(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["resolved"], 3);
        assert_eq!(value["missing_parent"][0]["parent"], "com.x:ghost:pom:1");
        assert_eq!(value["unpackaged"][0]["kind"], "plugins");
    }

    #[test]
    fn test_clean_report() {
        assert!(RepositoryReport::default().is_clean());
        assert!(!sample().is_clean());
    }
}
