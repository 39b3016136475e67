// src/rules/composite.rs

//! Dependency rules: one field rule per identity component
//!
//! A dependency rule is written as up to six whitespace separated fields:
//!
//! ```text
//! group artifact type version scope classifier
//! ```
//!
//! Missing trailing fields match anything, except the version, which
//! defaults to `s/.*/debian/` so that an empty rule forces the placeholder
//! version.
//!
//! # Ordering
//!
//! Rules sort from the most specific to the most generic. Fields are
//! compared in declaration order and a literal field sorts before a generic
//! one; full ties fall back to the rule text.

use super::{Rule, RuleError};
use crate::manifest::Dependency;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Rule forcing every version to the placeholder
pub static TO_PLACEHOLDER_VERSION: LazyLock<DependencyRule> =
    LazyLock::new(|| DependencyRule::parse("").expect("built-in placeholder rule"));

/// Rule keeping the declared version of build plugins
pub static KEEP_PLUGIN_VERSION: LazyLock<DependencyRule> =
    LazyLock::new(|| DependencyRule::parse("* * maven-plugin *").expect("built-in plugin rule"));

const DEFAULT_VERSION_RULE: &str = "s/.*/debian/";
const MAX_FIELDS: usize = 6;

/// Six field rule matched against a whole dependency
#[derive(Debug, Clone)]
pub struct DependencyRule {
    group: Rule,
    artifact: Rule,
    dep_type: Rule,
    version: Rule,
    scope: Rule,
    classifier: Rule,
}

impl DependencyRule {
    /// Parse a rule line
    pub fn parse(def: &str) -> Result<Self, RuleError> {
        let fields: Vec<&str> = def.split_whitespace().collect();
        if fields.len() > MAX_FIELDS {
            return Err(RuleError::TooManyFields(def.to_string()));
        }
        let field = |index: usize, default: &str| Rule::compile(fields.get(index).copied().unwrap_or(default));

        Ok(Self {
            group: field(0, "*")?,
            artifact: field(1, "*")?,
            dep_type: field(2, "*")?,
            version: field(3, DEFAULT_VERSION_RULE)?,
            scope: field(4, "*")?,
            classifier: field(5, "*")?,
        })
    }

    /// Check every field of `dep` against this rule
    pub fn matches(&self, dep: &Dependency) -> bool {
        self.group.matches(dep.group())
            && self.artifact.matches(dep.artifact())
            && self.dep_type.matches(Some(&dep.dep_type))
            && self.version.matches(dep.version())
            && self.scope.matches(Some(dep.scope()))
            && self.classifier.matches(dep.classifier.as_deref())
    }

    /// Rewrite `dep`, carrying `optional` and the relative path through
    pub fn apply(&self, dep: &Dependency) -> Dependency {
        Dependency {
            group_id: self.group.apply(dep.group()),
            artifact_id: self.artifact.apply(dep.artifact()),
            dep_type: self
                .dep_type
                .apply(Some(&dep.dep_type))
                .unwrap_or_else(|| dep.dep_type.clone()),
            version: self.version.apply(dep.version()),
            classifier: self.classifier.apply(dep.classifier.as_deref()),
            scope: self.scope.apply(dep.scope.as_deref()),
            optional: dep.optional,
            relative_path: dep.relative_path.clone(),
            super_pom: dep.super_pom,
        }
    }

    /// True for the two rules every default rule set carries
    pub fn is_builtin(&self) -> bool {
        self == &*TO_PLACEHOLDER_VERSION || self == &*KEEP_PLUGIN_VERSION
    }

    fn fields(&self) -> [&Rule; MAX_FIELDS] {
        [
            &self.group,
            &self.artifact,
            &self.dep_type,
            &self.version,
            &self.scope,
            &self.classifier,
        ]
    }
}

impl FromStr for DependencyRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DependencyRule::parse(s)
    }
}

impl fmt::Display for DependencyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields().map(Rule::as_str);
        write!(f, "{}", fields.join(" "))
    }
}

impl PartialEq for DependencyRule {
    fn eq(&self, other: &Self) -> bool {
        self.fields() == other.fields()
    }
}

impl Eq for DependencyRule {}

impl Ord for DependencyRule {
    fn cmp(&self, other: &Self) -> Ordering {
        for (mine, theirs) in self.fields().iter().zip(other.fields().iter()) {
            match (mine.is_generic(), theirs.is_generic()) {
                (false, true) => return Ordering::Less,
                (true, false) => return Ordering::Greater,
                _ => {}
            }
        }
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for DependencyRule {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
