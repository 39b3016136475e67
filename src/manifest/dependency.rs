// src/manifest/dependency.rs

//! Dependency identity shared by rules, manifests and the repository index
//!
//! A dependency is named by `(group, artifact, type, version, classifier)`.
//! Scope, optionality and the relative path travel with it but never take
//! part in equality, ordering or hashing.
//!
//! # Type normalization
//!
//! `jar` and `bundle` describe the same artifact on disk, so both compare
//! equal. Hashing only looks at group, artifact and version, which keeps
//! `Hash` consistent with that relaxed `Eq`.

use crate::rules::{DependencyRule, RuleSet};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Scope reported for a dependency that does not declare one
pub const DEFAULT_SCOPE: &str = "runtime";

/// Type assigned to dependencies without an explicit `<type>`
pub const DEFAULT_TYPE: &str = "jar";

/// Type assigned to build plugins
pub const PLUGIN_TYPE: &str = "maven-plugin";

/// Group assumed for plugins that omit `<groupId>`
pub const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// Placeholder version substituted by the default rule
pub const PLACEHOLDER_VERSION: &str = "debian";

/// A dependency, plugin, extension or manifest identity
#[derive(Debug, Clone)]
pub struct Dependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub dep_type: String,
    pub version: Option<String>,
    pub classifier: Option<String>,
    /// Declared scope, `None` when the source omits it
    pub scope: Option<String>,
    pub optional: bool,
    pub relative_path: Option<String>,
    /// Marks the implicit root ancestor that never needs to be located
    pub super_pom: bool,
}

impl Default for Dependency {
    fn default() -> Self {
        Self {
            group_id: None,
            artifact_id: None,
            dep_type: DEFAULT_TYPE.to_string(),
            version: None,
            classifier: None,
            scope: None,
            optional: false,
            relative_path: None,
            super_pom: false,
        }
    }
}

impl Dependency {
    /// Create a fully versioned dependency
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        dep_type: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: Some(group_id.into()),
            artifact_id: Some(artifact_id.into()),
            dep_type: dep_type.into(),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    /// Create a dependency that does not carry a version
    pub fn unversioned(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        dep_type: impl Into<String>,
    ) -> Self {
        Self {
            group_id: Some(group_id.into()),
            artifact_id: Some(artifact_id.into()),
            dep_type: dep_type.into(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Effective scope, defaulting to [`DEFAULT_SCOPE`]
    pub fn scope(&self) -> &str {
        self.scope.as_deref().unwrap_or(DEFAULT_SCOPE)
    }

    pub fn group(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn artifact(&self) -> Option<&str> {
        self.artifact_id.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Type with `bundle` folded into `jar`
    pub fn normalized_type(&self) -> &str {
        match self.dep_type.as_str() {
            "bundle" => "jar",
            other => other,
        }
    }

    pub fn is_plugin(&self) -> bool {
        self.dep_type == PLUGIN_TYPE
    }

    /// Identity equality that disregards the version
    pub fn equals_ignoring_version(&self, other: &Dependency) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.normalized_type() == other.normalized_type()
            && self.classifier == other.classifier
    }

    /// Same group, artifact and version, whatever the type
    pub fn same_coordinates(&self, other: &Dependency) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.version == other.version
    }

    /// Rewrite this dependency with the first matching rule of `rules`
    ///
    /// Rules are visited in specificity order; the first match wins. When
    /// nothing matches an unchanged copy is returned.
    pub fn apply_rules(&self, rules: &RuleSet) -> Dependency {
        self.apply_rules_traced(rules).0
    }

    /// Like [`apply_rules`](Self::apply_rules), also returning the rule that fired
    pub fn apply_rules_traced<'r>(
        &self,
        rules: &'r RuleSet,
    ) -> (Dependency, Option<&'r DependencyRule>) {
        match rules.find_first(self) {
            Some(rule) => (rule.apply(self), Some(rule)),
            None => (self.clone(), None),
        }
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.equals_ignoring_version(other) && self.version == other.version
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
        self.artifact_id.hash(state);
        self.version.hash(state);
    }
}

impl Ord for Dependency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group_id
            .cmp(&other.group_id)
            .then_with(|| self.artifact_id.cmp(&other.artifact_id))
            .then_with(|| self.normalized_type().cmp(other.normalized_type()))
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.classifier.cmp(&other.classifier))
    }
}

impl PartialOrd for Dependency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group_id.as_deref().unwrap_or("?"),
            self.artifact_id.as_deref().unwrap_or("?"),
            self.dep_type,
            self.version.as_deref().unwrap_or("?")
        )?;
        if let Some(ref classifier) = self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_jar_and_bundle_are_equal() {
        let jar = Dependency::new("org.slf4j", "slf4j-api", "jar", "1.7.36");
        let bundle = Dependency::new("org.slf4j", "slf4j-api", "bundle", "1.7.36");
        assert_eq!(jar, bundle);
    }

    #[test]
    fn test_scope_and_optional_ignored_by_equality() {
        let a = Dependency::new("junit", "junit", "jar", "4.13").with_scope("test");
        let b = Dependency::new("junit", "junit", "jar", "4.13").with_optional(true);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_equals_ignoring_version() {
        let a = Dependency::new("junit", "junit", "jar", "4.13");
        let b = Dependency::new("junit", "junit", "jar", "3.8");
        assert_ne!(a, b);
        assert!(a.equals_ignoring_version(&b));
    }

    #[test]
    fn test_hash_consistent_with_type_normalization() {
        let mut set = HashSet::new();
        set.insert(Dependency::new("g", "a", "jar", "1"));
        assert!(set.contains(&Dependency::new("g", "a", "bundle", "1")));
    }

    #[test]
    fn test_default_scope() {
        let dep = Dependency::unversioned("g", "a", "jar");
        assert_eq!(dep.scope(), "runtime");
        assert_eq!(dep.clone().with_scope("test").scope(), "test");
    }

    #[test]
    fn test_display() {
        let dep = Dependency::new("g", "a", "jar", "1.0").with_classifier("tests");
        assert_eq!(dep.to_string(), "g:a:jar:1.0:tests");
        assert_eq!(Dependency::default().to_string(), "?:?:jar:?");
    }
}
