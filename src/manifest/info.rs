// src/manifest/info.rs

//! In-memory model of one manifest
//!
//! Every dependency-like list is kept in document order. The transform engine
//! pairs rewritten entries with source elements by their index inside a
//! category, so no operation here may reorder, drop or insert entries in the
//! middle of a list.

use super::Dependency;
use crate::rules::{DependencyRule, RuleSet};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// The categories a dependency-like element can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyKind {
    Dependencies,
    DependencyManagement,
    Plugins,
    PluginManagement,
    PluginDependencies,
    PluginManagementDependencies,
    ReportingPlugins,
    Extensions,
    Modules,
    ProfileDependencies,
    ProfileDependencyManagement,
    ProfilePlugins,
    ProfilePluginManagement,
    ProfilePluginDependencies,
    ProfileReportingPlugins,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 15] = [
        Self::Dependencies,
        Self::DependencyManagement,
        Self::Plugins,
        Self::PluginManagement,
        Self::PluginDependencies,
        Self::PluginManagementDependencies,
        Self::ReportingPlugins,
        Self::Extensions,
        Self::Modules,
        Self::ProfileDependencies,
        Self::ProfileDependencyManagement,
        Self::ProfilePlugins,
        Self::ProfilePluginManagement,
        Self::ProfilePluginDependencies,
        Self::ProfileReportingPlugins,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::DependencyManagement => "dependency-management",
            Self::Plugins => "plugins",
            Self::PluginManagement => "plugin-management",
            Self::PluginDependencies => "plugin-dependencies",
            Self::PluginManagementDependencies => "plugin-management-dependencies",
            Self::ReportingPlugins => "reporting-plugins",
            Self::Extensions => "extensions",
            Self::Modules => "modules",
            Self::ProfileDependencies => "profile-dependencies",
            Self::ProfileDependencyManagement => "profile-dependency-management",
            Self::ProfilePlugins => "profile-plugins",
            Self::ProfilePluginManagement => "profile-plugin-management",
            Self::ProfilePluginDependencies => "profile-plugin-dependencies",
            Self::ProfileReportingPlugins => "profile-reporting-plugins",
        }
    }

    /// Entries that only supply versions to other entries
    pub fn is_management(&self) -> bool {
        matches!(
            self,
            Self::DependencyManagement
                | Self::PluginManagement
                | Self::ProfileDependencyManagement
                | Self::ProfilePluginManagement
        )
    }

    /// Entries declared with a `<plugin>` element
    pub fn is_plugin(&self) -> bool {
        matches!(
            self,
            Self::Plugins
                | Self::PluginManagement
                | Self::ReportingPlugins
                | Self::ProfilePlugins
                | Self::ProfilePluginManagement
                | Self::ProfileReportingPlugins
        )
    }

    /// Plain `<dependency>` lists whose scope is meaningful
    pub fn is_scoped(&self) -> bool {
        matches!(self, Self::Dependencies | Self::ProfileDependencies)
    }

    /// Management lists consulted, in order, for entries missing a version
    pub fn management_kinds(&self) -> &'static [DependencyKind] {
        match self {
            Self::Dependencies => &[Self::DependencyManagement],
            Self::Plugins | Self::ReportingPlugins => &[Self::PluginManagement],
            Self::ProfileDependencies => &[Self::ProfileDependencyManagement, Self::DependencyManagement],
            Self::ProfilePlugins | Self::ProfileReportingPlugins => {
                &[Self::ProfilePluginManagement, Self::PluginManagement]
            }
            _ => &[],
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured view of a manifest
#[derive(Debug, Clone)]
pub struct ManifestInfo {
    /// Identity of the manifest itself; the version is always set after reading
    pub this_manifest: Dependency,
    pub parent: Option<Dependency>,
    /// Identity before any rule was applied
    pub original_manifest: Option<Dependency>,
    pub properties: HashMap<String, String>,
    /// Whether the source declared `<version>` on the project itself
    pub explicit_version: bool,
    /// Whether the source has a project-level `<properties>` block
    pub has_properties: bool,
    dependencies: BTreeMap<DependencyKind, Vec<Dependency>>,
}

impl ManifestInfo {
    pub fn new(this_manifest: Dependency) -> Self {
        Self {
            this_manifest,
            parent: None,
            original_manifest: None,
            properties: HashMap::new(),
            explicit_version: false,
            has_properties: false,
            dependencies: BTreeMap::new(),
        }
    }

    /// Entries of one category in document order
    pub fn dependencies(&self, kind: DependencyKind) -> &[Dependency] {
        self.dependencies.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependencies_mut(&mut self, kind: DependencyKind) -> &mut Vec<Dependency> {
        self.dependencies.entry(kind).or_default()
    }

    /// Append an entry at the end of a category
    pub fn push(&mut self, kind: DependencyKind, dep: Dependency) {
        self.dependencies_mut(kind).push(dep);
    }

    /// Every non-empty category with its entries
    pub fn categories(&self) -> impl Iterator<Item = (DependencyKind, &[Dependency])> {
        self.dependencies
            .iter()
            .filter(|(_, deps)| !deps.is_empty())
            .map(|(kind, deps)| (*kind, deps.as_slice()))
    }

    /// Management entry supplying a version for `dep` declared in `kind`
    pub fn find_management(&self, kind: DependencyKind, dep: &Dependency) -> Option<&Dependency> {
        kind.management_kinds().iter().find_map(|mgmt| {
            self.dependencies(*mgmt).iter().find(|entry| {
                entry.group_id == dep.group_id
                    && entry.artifact_id == dep.artifact_id
                    && entry.normalized_type() == dep.normalized_type()
            })
        })
    }

    /// Copy versions from management entries into entries lacking one
    ///
    /// Returns true when every non-management entry ends up versioned.
    pub fn backfill_versions(&mut self) -> bool {
        let mut complete = true;
        for kind in DependencyKind::ALL {
            if kind.is_management() || kind == DependencyKind::Modules {
                continue;
            }
            let filled: Vec<Option<String>> = self
                .dependencies(kind)
                .iter()
                .map(|dep| match dep.version {
                    Some(_) => None,
                    None => self.find_management(kind, dep).and_then(|m| m.version.clone()),
                })
                .collect();
            for (dep, version) in self.dependencies_mut(kind).iter_mut().zip(filled) {
                if version.is_some() {
                    dep.version = version;
                }
                if dep.version.is_none() {
                    complete = false;
                }
            }
        }
        complete
    }

    /// Entries of any category still lacking a version
    pub fn unversioned(&self) -> Vec<(DependencyKind, &Dependency)> {
        self.categories()
            .filter(|(kind, _)| *kind != DependencyKind::Modules)
            .flat_map(|(kind, deps)| deps.iter().map(move |dep| (kind, dep)))
            .filter(|(_, dep)| dep.version.is_none())
            .collect()
    }

    /// Append parent management entries that this manifest does not override
    pub fn merge_management(&mut self, parent: &ManifestInfo) {
        for kind in [DependencyKind::DependencyManagement, DependencyKind::PluginManagement] {
            let inherited: Vec<Dependency> = parent
                .dependencies(kind)
                .iter()
                .filter(|entry| {
                    !self
                        .dependencies(kind)
                        .iter()
                        .any(|own| own.equals_ignoring_version(entry))
                })
                .cloned()
                .collect();
            self.dependencies_mut(kind).extend(inherited);
        }
    }

    /// Derive a new manifest with every identity rewritten by `rules`
    pub fn apply_rules(&self, rules: &RuleSet) -> ManifestInfo {
        let mut used = BTreeSet::new();
        self.apply_rules_tracked(rules, &mut used)
    }

    /// Like [`apply_rules`](Self::apply_rules), recording the rules that fired
    pub fn apply_rules_tracked(
        &self,
        rules: &RuleSet,
        used: &mut BTreeSet<DependencyRule>,
    ) -> ManifestInfo {
        let mut rewrite = |dep: &Dependency| {
            let (rewritten, rule) = dep.apply_rules_traced(rules);
            if let Some(rule) = rule {
                used.insert(rule.clone());
            }
            rewritten
        };

        let dependencies = self
            .dependencies
            .iter()
            .map(|(kind, deps)| {
                let deps = match kind {
                    DependencyKind::Modules => deps.clone(),
                    _ => deps.iter().map(&mut rewrite).collect(),
                };
                (*kind, deps)
            })
            .collect();

        ManifestInfo {
            this_manifest: rewrite(&self.this_manifest),
            parent: self.parent.as_ref().map(&mut rewrite),
            original_manifest: Some(
                self.original_manifest
                    .clone()
                    .unwrap_or_else(|| self.this_manifest.clone()),
            ),
            properties: self.properties.clone(),
            explicit_version: self.explicit_version,
            has_properties: self.has_properties,
            dependencies,
        }
    }
}
