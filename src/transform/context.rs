// src/transform/context.rs

//! Rule state shared across a batch of transforms
//!
//! A batch run transforms many manifests with the same rules. Rules derived
//! from the repository accumulate as the batch proceeds, so the context is a
//! plain value the driver owns and passes by `&mut` to each transform.

use crate::manifest::{Dependency, DependencyKind, ManifestInfo};
use crate::repository::Repository;
use crate::rules::{DependencyRule, RuleSet};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// Categories whose versions are pinned to what the repository packages
const PINNED_KINDS: &[DependencyKind] = &[
    DependencyKind::Plugins,
    DependencyKind::PluginManagement,
    DependencyKind::ReportingPlugins,
    DependencyKind::Extensions,
    DependencyKind::ProfilePlugins,
    DependencyKind::ProfilePluginManagement,
    DependencyKind::ProfileReportingPlugins,
];

#[derive(Debug, Clone)]
pub struct TransformContext {
    /// Primary rules, always including the built-in defaults
    pub rules: RuleSet,
    /// Rules derived from the repository while transforming
    pub automatic_rules: RuleSet,
    /// Rules echoed into every transformed manifest
    pub published_rules: RuleSet,
    /// Entries matched here are removed entirely
    pub ignore_rules: RuleSet,
}

impl Default for TransformContext {
    fn default() -> Self {
        Self::new(RuleSet::new("rules"))
    }
}

impl TransformContext {
    /// Context around `rules`, with the built-in defaults added
    pub fn new(mut rules: RuleSet) -> Self {
        rules.add_defaults();
        Self {
            rules,
            automatic_rules: RuleSet::new("automatic rules"),
            published_rules: RuleSet::new("published rules"),
            ignore_rules: RuleSet::new("ignore rules"),
        }
    }

    /// Load each rule file on its own
    ///
    /// A missing or invalid file only empties its own set; the others are
    /// still used.
    pub fn load(
        rules: Option<&Path>,
        ignore_rules: Option<&Path>,
        published_rules: Option<&Path>,
    ) -> Self {
        let mut ctx = Self::new(load_optional(rules, "rules"));
        ctx.ignore_rules = load_optional(ignore_rules, "ignore rules");
        ctx.published_rules = load_optional(published_rules, "published rules");
        // Published rules take part in rewriting too
        let published = ctx.published_rules.clone();
        ctx.rules.add_all(&published);
        ctx
    }

    /// Pin plugin and extension versions to the packaged ones
    ///
    /// Returns the number of rules added.
    pub fn add_repository_rules(&mut self, info: &ManifestInfo, repo: &Repository) -> usize {
        let mut added = 0;
        for kind in PINNED_KINDS {
            for dep in info.dependencies(*kind) {
                if let Some(rule) = packaged_version_rule(dep, repo)
                    && self.automatic_rules.add(rule)
                {
                    added += 1;
                }
            }
        }
        if added > 0 {
            debug!("Added {} automatic rules", added);
        }
        added
    }

    /// True when an ignore rule matches either form of an entry
    pub fn is_ignored(&self, original: &Dependency, transformed: &Dependency) -> bool {
        self.ignore_rules.find_first(original).is_some()
            || self.ignore_rules.find_first(transformed).is_some()
    }

    /// Rule text recorded as provenance: published first, then exercised
    pub fn provenance_rules(&self, used: &BTreeSet<DependencyRule>) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.published_rules
            .iter()
            .chain(used.iter().filter(|rule| !rule.is_builtin()))
            .map(ToString::to_string)
            .filter(|text| seen.insert(text.clone()))
            .collect()
    }
}

fn load_optional(path: Option<&Path>, description: &str) -> RuleSet {
    match path {
        Some(path) => RuleSet::read_or_empty(path),
        None => RuleSet::new(description),
    }
}

/// `"<g> <a> <type> s/.*/<version>/"` for a packaged plugin or extension
fn packaged_version_rule(dep: &Dependency, repo: &Repository) -> Option<DependencyRule> {
    let group = dep.group()?;
    let artifact = dep.artifact()?;
    let packaged = repo.search_matching(dep)?;
    let version = packaged.this_manifest.version()?;

    let text = format!(
        "{} {} {} s/.*/{}/",
        group,
        artifact,
        dep.dep_type,
        version.replace('$', r"\$").replace('/', r"\/")
    );
    match DependencyRule::parse(&text) {
        Ok(rule) => Some(rule),
        Err(e) => {
            warn!("Cannot pin {} to packaged version {}: {}", dep, version, e);
            None
        }
    }
}
