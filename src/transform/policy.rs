// src/transform/policy.rs

//! Element acceptance policy
//!
//! Decides which sections and entries survive the rewrite. All switches live
//! in one [`ElementPolicy`] and every decision goes through
//! [`ElementPolicy::verdict`], so the set of removed things can be read off a
//! single match.

use crate::manifest::{Dependency, DependencyKind, ElementPath};
use std::fmt;

/// Why an element was removed from the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suppression {
    /// The parent block, dropped in parent-less mode
    Parent,
    /// Publishing and remote repository sections
    RemoteSection,
    /// Documentation-only reporting section
    Reporting,
    /// A test-scoped dependency outside of package builds
    TestScope,
    /// A module listed as ignored
    IgnoredModule,
    /// An entry matched by an ignore rule
    IgnoreRule,
    /// An entry with no rewritten counterpart
    Unmatched,
}

impl fmt::Display for Suppression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parent => "parent",
            Self::RemoteSection => "remote section",
            Self::Reporting => "reporting",
            Self::TestScope => "test scope",
            Self::IgnoredModule => "ignored module",
            Self::IgnoreRule => "ignore rule",
            Self::Unmatched => "unmatched entry",
        };
        f.write_str(s)
    }
}

/// Sections removed unless every element is kept
const REMOTE_SECTIONS: &[&str] = &["distributionManagement", "repositories", "pluginRepositories"];

/// What the policy is asked about
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    /// An element about to be opened at the given path
    Element { path: &'a ElementPath, name: &'a str },
    /// A dependency-like entry of a category
    Entry { kind: DependencyKind, dependency: &'a Dependency },
    /// A `<module>` reference
    Module { path: &'a str },
}

/// Named switches controlling suppression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementPolicy {
    /// Building the package itself; test dependencies are needed
    pub debian_build: bool,
    /// Drop documentation-only sections
    pub build_without_docs: bool,
    /// Disable every structural suppression
    pub keep_all_elements: bool,
    /// Remove the parent block
    pub no_parent: bool,
    /// Module paths to drop from `<modules>`
    pub ignored_modules: Vec<String>,
}

impl ElementPolicy {
    /// Single dispatch over every suppression rule
    pub fn verdict(&self, candidate: Candidate<'_>) -> Option<Suppression> {
        match candidate {
            Candidate::Element { path, name } => {
                if self.no_parent && path.would_be(name, &["project", "parent"]) {
                    return Some(Suppression::Parent);
                }
                if self.keep_all_elements {
                    return None;
                }
                let section = path.section();
                if section.is_empty() && path.depth() > 0 {
                    if REMOTE_SECTIONS.contains(&name) {
                        return Some(Suppression::RemoteSection);
                    }
                    if self.build_without_docs && name == "reporting" {
                        return Some(Suppression::Reporting);
                    }
                }
                None
            }
            Candidate::Entry { kind, dependency } => {
                if !self.keep_all_elements
                    && !self.debian_build
                    && kind.is_scoped()
                    && dependency.scope() == "test"
                {
                    Some(Suppression::TestScope)
                } else {
                    None
                }
            }
            Candidate::Module { path } => {
                if self.ignored_modules.iter().any(|m| m == path) {
                    Some(Suppression::IgnoredModule)
                } else {
                    None
                }
            }
        }
    }

    pub fn accepts_element(&self, path: &ElementPath, name: &str) -> bool {
        self.verdict(Candidate::Element { path, name }).is_none()
    }

    pub fn accepts_dependency(&self, kind: DependencyKind, dependency: &Dependency) -> bool {
        self.verdict(Candidate::Entry { kind, dependency }).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_of(names: &[&str]) -> ElementPath {
        let mut path = ElementPath::new();
        for name in names {
            path.push(name);
        }
        path
    }

    #[test]
    fn test_remote_sections_removed_at_both_levels() {
        let policy = ElementPolicy::default();
        assert!(!policy.accepts_element(&path_of(&["project"]), "repositories"));
        assert!(!policy.accepts_element(
            &path_of(&["project", "profiles", "profile"]),
            "distributionManagement"
        ));
        // Nested elements with the same name are not sections
        assert!(policy.accepts_element(&path_of(&["project", "build"]), "repositories"));
    }

    #[test]
    fn test_keep_all_disables_suppression() {
        let policy = ElementPolicy {
            keep_all_elements: true,
            build_without_docs: true,
            ..ElementPolicy::default()
        };
        assert!(policy.accepts_element(&path_of(&["project"]), "repositories"));
        assert!(policy.accepts_element(&path_of(&["project"]), "reporting"));
        let junit = Dependency::new("junit", "junit", "jar", "4").with_scope("test");
        assert!(policy.accepts_dependency(DependencyKind::Dependencies, &junit));
    }

    #[test]
    fn test_reporting_only_without_docs() {
        let root = path_of(&["project"]);
        assert!(ElementPolicy::default().accepts_element(&root, "reporting"));
        let policy = ElementPolicy {
            build_without_docs: true,
            ..ElementPolicy::default()
        };
        assert_eq!(
            policy.verdict(Candidate::Element { path: &root, name: "reporting" }),
            Some(Suppression::Reporting)
        );
    }

    #[test]
    fn test_test_scope_depends_on_build_mode() {
        let junit = Dependency::new("junit", "junit", "jar", "4").with_scope("test");
        let policy = ElementPolicy::default();
        assert!(!policy.accepts_dependency(DependencyKind::Dependencies, &junit));
        assert!(!policy.accepts_dependency(DependencyKind::ProfileDependencies, &junit));
        // Management entries only carry versions
        assert!(policy.accepts_dependency(DependencyKind::DependencyManagement, &junit));

        let build = ElementPolicy {
            debian_build: true,
            ..ElementPolicy::default()
        };
        assert!(build.accepts_dependency(DependencyKind::Dependencies, &junit));
    }

    #[test]
    fn test_parent_and_modules() {
        let policy = ElementPolicy {
            no_parent: true,
            keep_all_elements: true,
            ignored_modules: vec!["samples".to_string()],
            ..ElementPolicy::default()
        };
        assert!(!policy.accepts_element(&path_of(&["project"]), "parent"));
        assert_eq!(
            policy.verdict(Candidate::Module { path: "samples" }),
            Some(Suppression::IgnoredModule)
        );
        assert_eq!(policy.verdict(Candidate::Module { path: "core" }), None);
    }
}
