// tests/common/mod.rs

//! Shared fixture writers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest text with an identity and an optional body placed after it.
pub fn pom(group: &str, artifact: &str, version: &str, body: &str) -> String {
    format!(
        "<project>\n  <groupId>{group}</groupId>\n  <artifactId>{artifact}</artifactId>\n  \
         <version>{version}</version>\n{body}</project>\n"
    )
}

/// Manifest text inheriting from `parent` (group, artifact, version).
pub fn child_pom(parent: (&str, &str, &str), artifact: &str, body: &str) -> String {
    let (group, parent_artifact, version) = parent;
    format!(
        "<project>\n  <parent>\n    <groupId>{group}</groupId>\n    \
         <artifactId>{parent_artifact}</artifactId>\n    <version>{version}</version>\n  \
         </parent>\n  <artifactId>{artifact}</artifactId>\n{body}</project>\n"
    )
}

/// `<dependencies>` block; `None` leaves the version out.
pub fn dependencies(entries: &[(&str, &str, Option<&str>)]) -> String {
    let mut out = String::from("  <dependencies>\n");
    for (group, artifact, version) in entries {
        out.push_str("    <dependency>\n");
        out.push_str(&format!("      <groupId>{group}</groupId>\n"));
        out.push_str(&format!("      <artifactId>{artifact}</artifactId>\n"));
        if let Some(version) = version {
            out.push_str(&format!("      <version>{version}</version>\n"));
        }
        out.push_str("    </dependency>\n");
    }
    out.push_str("  </dependencies>\n");
    out
}

/// Write `content` at `relative` below `root`, creating directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Scratch directory with `repo/` and `work/` subdirectories.
///
/// Returns (TempDir, repo, work) - keep the TempDir alive to prevent cleanup.
pub fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let repo = temp_dir.path().join("repo");
    let work = temp_dir.path().join("work");
    fs::create_dir_all(&repo).unwrap();
    fs::create_dir_all(&work).unwrap();
    (temp_dir, repo, work)
}
