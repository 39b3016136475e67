// src/repository/mod.rs

//! Local manifest repository and inheritance resolver
//!
//! The repository is a directory tree of manifests. Scanning it rebuilds the
//! management information each manifest inherits from its ancestors:
//!
//! ```text
//! scan()
//!     |
//!     v
//! walk tree, parse every manifest ──> pending
//!     |
//!     v
//! resolve pending until it stops shrinking
//!     |            \
//!     |             parent unknown ──> missing_parent
//!     v
//! resolve missing_parent until it stops shrinking
//!     |
//!     v
//! repeat both while anything moved ──> resolved / reported
//! ```
//!
//! A manifest's identity is indexed as soon as it is first visited, before
//! its management lists are final, so siblings resolving in the same pass
//! can locate it. Merging against a parent only happens once that parent is
//! itself resolved.
//!
//! Nothing is dropped: manifests that never resolve stay in their working
//! set and show up in the [`RepositoryReport`].

mod report;

pub use report::{
    JsonReport, MissingParent, MissingVersions, PlainTextReport, ReportWriter, RepositoryReport,
    UnpackagedDependency, Unreadable,
};

use crate::manifest::{
    Dependency, DependencyKind, ManifestInfo, ManifestReader, MANIFEST_EXTENSION,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Errors signalled by the repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The declared parent of a registered manifest is not in the repository
    #[error("Dependency not found: {0}")]
    DependencyNotFound(Dependency),
}

/// Working set a manifest currently sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Pending,
    MissingParent,
}

/// A scanned manifest repository
#[derive(Debug, Default)]
pub struct Repository {
    root: PathBuf,
    pending: BTreeMap<PathBuf, ManifestInfo>,
    missing_parent: BTreeMap<PathBuf, ManifestInfo>,
    resolved: BTreeMap<PathBuf, ManifestInfo>,
    index: HashMap<Dependency, PathBuf>,
    missing_versions: BTreeSet<PathBuf>,
    unpackaged: Vec<UnpackagedDependency>,
    unreadable: Vec<Unreadable>,
}

impl Repository {
    /// Create an empty repository rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parse every manifest below the root and resolve inheritance
    pub fn scan(&mut self) {
        info!("Scanning repository {}", self.root.display());
        let reader = ManifestReader::new();

        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let file = e.path().unwrap_or(&self.root).to_path_buf();
                    warn!("Cannot read {}: {}", file.display(), e);
                    self.unreadable.push(Unreadable {
                        file,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().is_none_or(|ext| ext != MANIFEST_EXTENSION)
            {
                continue;
            }
            match reader.read_file(path) {
                Ok(info) => {
                    self.pending.insert(path.to_path_buf(), info);
                }
                Err(e) => {
                    warn!("Skipping unreadable manifest {}: {}", path.display(), e);
                    self.unreadable.push(Unreadable {
                        file: path.to_path_buf(),
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!("Found {} manifests", self.pending.len());
        self.resolve_until_stable();
        self.collect_unpackaged();

        info!(
            "Resolved {} manifests ({} pending, {} with missing parent)",
            self.resolved.len(),
            self.pending.len(),
            self.missing_parent.len()
        );
    }

    /// Add a manifest to the pending set without resolving it
    pub fn add(&mut self, file: impl Into<PathBuf>, info: ManifestInfo) {
        self.pending.insert(file.into(), info);
    }

    /// Resolve the working sets until neither shrinks any further
    pub fn resolve_until_stable(&mut self) {
        loop {
            let before = self.unresolved_count();
            self.resolve_stage_until_stable(Stage::Pending);
            self.resolve_stage_until_stable(Stage::MissingParent);
            if self.unresolved_count() >= before {
                break;
            }
        }
        if !self.missing_parent.is_empty() || !self.pending.is_empty() {
            debug!(
                "Resolution settled with {} pending and {} missing parent",
                self.pending.len(),
                self.missing_parent.len()
            );
        }
    }

    fn unresolved_count(&self) -> usize {
        self.pending.len() + self.missing_parent.len()
    }

    fn resolve_stage_until_stable(&mut self, stage: Stage) {
        loop {
            let before = self.stage(stage).len();
            self.resolve_all(stage);
            if self.stage(stage).len() >= before {
                break;
            }
        }
    }

    fn resolve_all(&mut self, stage: Stage) {
        let files: Vec<PathBuf> = self.stage(stage).keys().cloned().collect();
        for file in files {
            if let Some(info) = self.stage_mut(stage).remove(&file) {
                self.resolve_dependencies(file, info, stage);
            }
        }
    }

    /// Try to resolve one manifest taken out of `from`
    fn resolve_dependencies(&mut self, file: PathBuf, mut info: ManifestInfo, from: Stage) {
        self.index.insert(info.this_manifest.clone(), file.clone());

        if let Some(parent) = info.parent.as_ref().filter(|p| !p.super_pom) {
            let Some(parent_file) = self.locate(parent).cloned() else {
                debug!("Parent {} of {} not found yet", parent, file.display());
                self.missing_parent.insert(file, info);
                return;
            };
            let Some(parent_info) = self.resolved.get(&parent_file) else {
                self.stage_mut(from).insert(file, info);
                return;
            };
            info.merge_management(parent_info);
        }

        if !info.backfill_versions() {
            debug!("{} has dependencies without a version", file.display());
            self.missing_versions.insert(file.clone());
        }
        self.resolved.insert(file, info);
    }

    /// Insert one extra manifest, typically the one being transformed
    ///
    /// The manifest is indexed and resolved against whatever is already
    /// resolved. When its parent cannot be located it is parked with the
    /// missing-parent set and, unless `no_parent` is set, the condition is
    /// returned as [`RepositoryError::DependencyNotFound`].
    pub fn register_manifest(
        &mut self,
        file: impl Into<PathBuf>,
        info: ManifestInfo,
        no_parent: bool,
    ) -> Result<(), RepositoryError> {
        let file = file.into();
        let mut info = info;
        if no_parent {
            info.parent = None;
        }
        let missing = info
            .parent
            .as_ref()
            .filter(|p| !p.super_pom && self.locate(p).is_none())
            .cloned();

        self.resolved.remove(&file);
        self.pending.remove(&file);
        self.missing_parent.remove(&file);
        self.missing_versions.remove(&file);
        self.resolve_dependencies(file.clone(), info, Stage::Pending);
        if self.pending.contains_key(&file) {
            // Parent located but not resolved yet; it stays queued until it is
            self.resolve_until_stable();
        }

        match missing {
            Some(parent) => Err(RepositoryError::DependencyNotFound(parent)),
            None => Ok(()),
        }
    }

    /// File registered for `dep`, falling back to a type-insensitive match
    fn locate(&self, dep: &Dependency) -> Option<&PathBuf> {
        self.index.get(dep).or_else(|| {
            self.index
                .iter()
                .filter(|(known, _)| known.same_coordinates(dep))
                .map(|(_, file)| file)
                .min()
        })
    }

    fn lookup(&self, file: &Path) -> Option<&ManifestInfo> {
        self.resolved
            .get(file)
            .or_else(|| self.pending.get(file))
            .or_else(|| self.missing_parent.get(file))
    }

    /// Manifest registered under the identity `dep`
    pub fn get_manifest(&self, dep: &Dependency) -> Option<&ManifestInfo> {
        self.locate(dep).and_then(|file| self.lookup(file))
    }

    /// Manifest with the same group and artifact as `dep`, any version
    ///
    /// Resolved manifests are preferred.
    pub fn search_matching(&self, dep: &Dependency) -> Option<&ManifestInfo> {
        let mut candidates: Vec<&PathBuf> = self
            .index
            .iter()
            .filter(|(known, _)| known.group_id == dep.group_id && known.artifact_id == dep.artifact_id)
            .map(|(_, file)| file)
            .collect();
        candidates.sort();
        candidates
            .iter()
            .find_map(|file| self.resolved.get(*file))
            .or_else(|| candidates.iter().find_map(|file| self.lookup(file)))
    }

    /// Resolved manifest stored at `file`
    pub fn resolved_manifest(&self, file: &Path) -> Option<&ManifestInfo> {
        self.resolved.get(file)
    }

    pub fn resolved(&self) -> impl Iterator<Item = (&PathBuf, &ManifestInfo)> {
        self.resolved.iter()
    }

    pub fn is_resolved(&self, file: &Path) -> bool {
        self.resolved.contains_key(file)
    }

    pub fn missing_parent(&self) -> impl Iterator<Item = (&PathBuf, &ManifestInfo)> {
        self.missing_parent.iter()
    }

    pub fn pending(&self) -> impl Iterator<Item = (&PathBuf, &ManifestInfo)> {
        self.pending.iter()
    }

    fn collect_unpackaged(&mut self) {
        let mut unpackaged = Vec::new();
        for (file, info) in &self.resolved {
            for kind in [
                DependencyKind::Dependencies,
                DependencyKind::Plugins,
                DependencyKind::Extensions,
                DependencyKind::ReportingPlugins,
            ] {
                for dep in info.dependencies(kind) {
                    if self.search_matching(dep).is_none() {
                        unpackaged.push(UnpackagedDependency {
                            file: file.clone(),
                            kind,
                            dependency: dep.clone(),
                        });
                    }
                }
            }
        }
        for missing in &unpackaged {
            debug!("{} needs unpackaged {}", missing.file.display(), missing.dependency);
        }
        self.unpackaged = unpackaged;
    }

    /// Everything the scan could not resolve
    pub fn report(&self) -> RepositoryReport {
        RepositoryReport {
            resolved: self.resolved.len(),
            missing_parent: self
                .missing_parent
                .iter()
                .map(|(file, info)| MissingParent {
                    file: file.clone(),
                    parent: info.parent.clone().unwrap_or_default(),
                })
                .collect(),
            unresolved: self.pending.keys().cloned().collect(),
            missing_versions: self
                .missing_versions
                .iter()
                .filter_map(|file| {
                    let info = self.lookup(file)?;
                    let dependencies =
                        info.unversioned().into_iter().map(|(_, d)| d.clone()).collect();
                    Some(MissingVersions {
                        file: file.clone(),
                        dependencies,
                    })
                })
                .collect(),
            unpackaged: self.unpackaged.clone(),
            unreadable: self.unreadable.clone(),
        }
    }

    fn stage(&self, stage: Stage) -> &BTreeMap<PathBuf, ManifestInfo> {
        match stage {
            Stage::Pending => &self.pending,
            Stage::MissingParent => &self.missing_parent,
        }
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut BTreeMap<PathBuf, ManifestInfo> {
        match stage {
            Stage::Pending => &mut self.pending,
            Stage::MissingParent => &mut self.missing_parent,
        }
    }
}
