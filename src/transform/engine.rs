// src/transform/engine.rs

//! Two-pass manifest rewriter
//!
//! Pass 1 reads the manifest, applies the primary and automatic rule
//! cascades and settles every decision that depends on the whole document:
//! which entries lacking a version get one, and which provenance properties
//! are injected.
//!
//! Pass 2 streams the original text and re-emits it. Rewritten entries are
//! paired with source elements by position inside their category: the n-th
//! `<dependency>` seen under `<dependencyManagement>` takes the n-th entry of
//! the transformed management list. A cursor per category is advanced once
//! for every entry element opened, including entries inside suppressed
//! sections, so the pairing never drifts.
//!
//! Whitespace preceding a removed element is removed with it, and inserted
//! elements reuse the indentation of their siblings.

use super::{Candidate, ElementPolicy, Suppression, TransformContext, TransformError};
use crate::manifest::{
    local_name, read_element_text, DependencyKind, ElementPath, ManifestError, ManifestInfo,
    ManifestReader, ENTRY_FIELDS, PARENT_FIELDS, PLACEHOLDER_VERSION, PROJECT_FIELDS,
};
use crate::repository::{Repository, RepositoryError};
use crate::rules::DependencyRule;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PROP_ORIGINAL_VERSION: &str = "debian.originalVersion";
const PROP_PACKAGE: &str = "debian.package";
const PROP_RULES: &str = "debian.mavenRules";
const PROP_HAS_PACKAGE_VERSION: &str = "debian.hasPackageVersion";

/// Properties with this prefix are regenerated on every transform
const PROVENANCE_PREFIX: &str = "debian.";

/// Switches controlling one transform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Target package name recorded in the provenance properties
    pub package: Option<String>,
    /// Keep the manifest's own version and its parent's version as written
    pub keep_pom_version: bool,
    /// Drop the parent reference
    pub no_parent: bool,
    /// Fail instead of warning when the parent is not in the repository
    pub require_parent: bool,
    /// Transforming for the package build rather than for installation
    pub debian_build: bool,
    pub build_without_docs: bool,
    pub keep_all_elements: bool,
    /// Module paths removed from `<modules>`
    pub ignored_modules: Vec<String>,
}

impl TransformOptions {
    pub fn policy(&self) -> ElementPolicy {
        ElementPolicy {
            debian_build: self.debian_build,
            build_without_docs: self.build_without_docs,
            keep_all_elements: self.keep_all_elements,
            no_parent: self.no_parent,
            ignored_modules: self.ignored_modules.clone(),
        }
    }
}

/// Where a transform reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    pub input: PathBuf,
    /// Output manifest; `None` replaces the input
    pub output: Option<PathBuf>,
    /// Companion key/value file describing the rewritten identity
    pub properties_out: Option<PathBuf>,
}

impl TransformRequest {
    pub fn in_place(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            properties_out: None,
        }
    }

    pub fn to(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: Some(output.into()),
            properties_out: None,
        }
    }

    pub fn with_properties(mut self, path: impl Into<PathBuf>) -> Self {
        self.properties_out = Some(path.into());
        self
    }

    pub fn target(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.input)
    }
}

/// An element left out of the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressedElement {
    pub reason: Suppression,
    /// Category when the element was a dependency-like entry
    pub kind: Option<DependencyKind>,
    /// Entry coordinates, module path or element name
    pub description: String,
}

/// Result of transforming one manifest
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    /// Rewritten manifest text
    pub output: String,
    pub original: ManifestInfo,
    pub transformed: ManifestInfo,
    /// Version written into the manifest's own identity
    pub written_version: Option<String>,
    /// Every rule that rewrote something
    pub used_rules: BTreeSet<DependencyRule>,
    pub suppressed: Vec<SuppressedElement>,
    /// The parent could not be located in the repository
    pub parent_missing: bool,
}

impl TransformOutcome {
    /// Companion properties describing the rewritten identity
    pub fn properties_text(&self) -> String {
        let this = &self.transformed.this_manifest;
        let original = self
            .original
            .this_manifest
            .version()
            .unwrap_or_default();
        let mut out = String::new();
        for (key, value) in [
            ("groupId", this.group().unwrap_or_default()),
            ("artifactId", this.artifact().unwrap_or_default()),
            ("type", this.dep_type.as_str()),
            ("version", self.written_version.as_deref().unwrap_or_default()),
            ("debianVersion", this.version().unwrap_or_default()),
            ("originalVersion", original),
        ] {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

/// Rewrites manifests according to a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    options: TransformOptions,
    policy: ElementPolicy,
    reader: ManifestReader,
}

impl TransformEngine {
    pub fn new(options: TransformOptions) -> Self {
        let policy = options.policy();
        Self {
            options,
            policy,
            reader: ManifestReader::new(),
        }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Transform manifest text
    ///
    /// `origin` identifies the manifest when it is registered with `repo`.
    pub fn transform_str(
        &self,
        ctx: &mut TransformContext,
        repo: Option<&mut Repository>,
        source: &str,
        origin: &Path,
    ) -> Result<TransformOutcome, TransformError> {
        let original = self.reader.read_str(source)?;
        let mut parent_missing = false;
        let mut view = None;

        if let Some(repo) = repo {
            ctx.add_repository_rules(&original, repo);
            match repo.register_manifest(origin, original.clone(), self.options.no_parent) {
                Ok(()) => {}
                Err(RepositoryError::DependencyNotFound(parent)) => {
                    if self.options.require_parent {
                        return Err(TransformError::MissingParent(parent));
                    }
                    warn!("Parent {} of {} not found in repository", parent, origin.display());
                    parent_missing = true;
                }
            }
            view = repo.resolved_manifest(origin).cloned();
        }
        let view = view.as_ref().unwrap_or(&original);

        let mut used_rules = BTreeSet::new();
        let transformed = original
            .apply_rules_tracked(&ctx.rules, &mut used_rules)
            .apply_rules_tracked(&ctx.automatic_rules, &mut used_rules);

        let late_versions = self.late_versions(ctx, &original, &transformed, view, &mut used_rules);
        let written_version = if self.options.keep_pom_version {
            original.this_manifest.version.clone()
        } else {
            transformed.this_manifest.version.clone()
        };
        let provenance = self.provenance(ctx, &original, &used_rules);

        let rewriter = Rewriter {
            options: &self.options,
            policy: &self.policy,
            ctx,
            original: &original,
            transformed: &transformed,
            late_versions: &late_versions,
            provenance: &provenance,
            written_version: written_version.as_deref(),
            writer: Writer::new(Vec::new()),
            path: ElementPath::new(),
            cursors: HashMap::new(),
            entries: Vec::new(),
            suppress_depth: None,
            pending_ws: None,
            project_indent: None,
            property_indent: None,
            saw_properties: false,
            saw_group: false,
            inserted_group: false,
            suppressed: Vec::new(),
        };
        let (output, suppressed) = rewriter.run(source)?;

        for element in &suppressed {
            debug!("Removed {} ({})", element.description, element.reason);
        }

        Ok(TransformOutcome {
            output,
            original,
            transformed,
            written_version,
            used_rules,
            suppressed,
            parent_missing,
        })
    }

    /// Transform one file, replacing the target atomically
    ///
    /// Both outputs are staged before either is renamed into place, so a
    /// failure leaves the original manifest untouched.
    pub fn transform_file(
        &self,
        ctx: &mut TransformContext,
        repo: Option<&mut Repository>,
        request: &TransformRequest,
    ) -> Result<TransformOutcome, TransformError> {
        let source = fs::read_to_string(&request.input).map_err(|source| ManifestError::Read {
            path: request.input.clone(),
            source,
        })?;
        let outcome = self.transform_str(ctx, repo, &source, &request.input)?;

        let manifest = stage(request.target(), outcome.output.as_bytes())?;
        let properties = match request.properties_out {
            Some(ref path) => match stage(path, outcome.properties_text().as_bytes()) {
                Ok(staged) => Some(staged),
                Err(e) => {
                    manifest.discard();
                    return Err(e);
                }
            },
            None => None,
        };
        // The properties file goes first so a rewritten manifest always has one
        if let Some(properties) = properties
            && let Err(e) = properties.commit()
        {
            manifest.discard();
            return Err(e);
        }
        manifest.commit()?;

        info!(
            "Transformed {} ({} rules used, {} elements removed)",
            request.input.display(),
            outcome.used_rules.len(),
            outcome.suppressed.len()
        );
        Ok(outcome)
    }

    /// Transform several files; a failure only affects its own file
    pub fn transform_all(
        &self,
        ctx: &mut TransformContext,
        mut repo: Option<&mut Repository>,
        requests: &[TransformRequest],
    ) -> Vec<(PathBuf, Result<TransformOutcome, TransformError>)> {
        requests
            .iter()
            .map(|request| {
                let result = self.transform_file(ctx, repo.as_deref_mut(), request);
                if let Err(ref e) = result {
                    warn!("Failed to transform {}: {}", request.input.display(), e);
                }
                (request.input.clone(), result)
            })
            .collect()
    }

    /// Versions to insert into entries that declare none
    ///
    /// The placeholder is run through both cascades so a rule can still pick
    /// a concrete version. Nothing is inserted when a management entry
    /// supplies the version, or for a plugin left at the placeholder.
    fn late_versions(
        &self,
        ctx: &TransformContext,
        original: &ManifestInfo,
        transformed: &ManifestInfo,
        view: &ManifestInfo,
        used_rules: &mut BTreeSet<DependencyRule>,
    ) -> HashMap<(DependencyKind, usize), String> {
        let mut late = HashMap::new();
        for kind in DependencyKind::ALL {
            if kind == DependencyKind::Modules {
                continue;
            }
            let pairs = original
                .dependencies(kind)
                .iter()
                .zip(transformed.dependencies(kind))
                .enumerate();
            for (index, (source, dep)) in pairs {
                if source.version.is_some() || dep.version.is_some() {
                    continue;
                }
                if !kind.is_management() && view.find_management(kind, source).is_some() {
                    continue;
                }
                if ctx.is_ignored(source, dep) || !self.policy.accepts_dependency(kind, dep) {
                    continue;
                }

                let mut candidate = dep.clone();
                candidate.version = Some(PLACEHOLDER_VERSION.to_string());
                let (candidate, first) = candidate.apply_rules_traced(&ctx.rules);
                let (candidate, second) = candidate.apply_rules_traced(&ctx.automatic_rules);
                let Some(version) = candidate.version else {
                    continue;
                };
                if kind.is_plugin() && version == PLACEHOLDER_VERSION {
                    continue;
                }

                used_rules.extend(first.into_iter().chain(second).cloned());
                late.insert((kind, index), version);
            }
        }
        late
    }

    fn provenance(
        &self,
        ctx: &TransformContext,
        original: &ManifestInfo,
        used_rules: &BTreeSet<DependencyRule>,
    ) -> Vec<(&'static str, String)> {
        let mut properties = Vec::new();
        if let Some(version) = original.this_manifest.version() {
            properties.push((PROP_ORIGINAL_VERSION, version.to_string()));
        }
        if let Some(ref package) = self.options.package {
            properties.push((PROP_PACKAGE, package.clone()));
        }
        let rules = ctx.provenance_rules(used_rules);
        if !rules.is_empty() {
            properties.push((PROP_RULES, rules.join(", ")));
        }
        if self.options.keep_pom_version {
            properties.push((PROP_HAS_PACKAGE_VERSION, "true".to_string()));
        }
        properties
    }
}

/// Content written and synced to a sibling temporary file
struct Staged {
    temp: PathBuf,
    target: PathBuf,
}

impl Staged {
    /// Rename over the target
    fn commit(self) -> Result<(), TransformError> {
        fs::rename(&self.temp, &self.target).map_err(|source| {
            let _ = fs::remove_file(&self.temp);
            TransformError::Write {
                path: self.target.clone(),
                source,
            }
        })
    }

    fn discard(self) {
        let _ = fs::remove_file(&self.temp);
    }
}

/// Write `content` next to `path` without touching `path` itself
fn stage(path: &Path, content: &[u8]) -> Result<Staged, TransformError> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp = path.with_file_name(temp_name);

    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&temp)?;
        file.write_all(content)?;
        file.sync_all()
    };

    match write() {
        Ok(()) => Ok(Staged {
            temp,
            target: path.to_path_buf(),
        }),
        Err(source) => {
            let _ = fs::remove_file(&temp);
            Err(TransformError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
