// src/manifest/path.rs

//! Element path tracking for the manifest grammar
//!
//! The same element name means different things depending on where it sits:
//! a `<dependency>` may be a direct dependency, a management entry, a plugin
//! dependency or any of those inside a profile. The path keeps one frame per
//! open element and tags the frames that open a dependency-like entry.

use super::DependencyKind;

/// One open element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    /// Set when this element is itself a dependency-like entry
    pub entry: Option<DependencyKind>,
}

/// Stack of open elements from the root down
#[derive(Debug, Clone, Default)]
pub struct ElementPath {
    frames: Vec<Frame>,
}

impl ElementPath {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Open an element, returning its category when it is an entry
    pub fn push(&mut self, name: &str) -> Option<DependencyKind> {
        let entry = self.classify(name);
        self.frames.push(Frame {
            name: name.to_string(),
            entry,
        });
        entry
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Name of the innermost open element
    pub fn current(&self) -> Option<&str> {
        self.frames.last().map(|f| f.name.as_str())
    }

    /// Category of the innermost element when it is an entry
    pub fn current_entry(&self) -> Option<DependencyKind> {
        self.frames.last().and_then(|f| f.entry)
    }

    /// True when the open elements are exactly `names`
    pub fn is(&self, names: &[&str]) -> bool {
        self.frames.len() == names.len()
            && self.frames.iter().zip(names).all(|(frame, name)| frame.name == *name)
    }

    /// True when opening `name` here would produce the path `names`
    pub fn would_be(&self, name: &str, names: &[&str]) -> bool {
        match names.split_last() {
            Some((last, prefix)) => *last == name && self.is(prefix),
            None => false,
        }
    }

    /// Section path relative to the project or to the enclosing profile
    ///
    /// `project/profiles/profile/reporting` and `project/reporting` both yield
    /// `["reporting"]`.
    pub fn section(&self) -> Vec<&str> {
        let names: Vec<&str> = self.frames.iter().map(|f| f.name.as_str()).collect();
        match names.as_slice() {
            ["project", "profiles", "profile", rest @ ..] => rest.to_vec(),
            ["project", rest @ ..] => rest.to_vec(),
            _ => Vec::new(),
        }
    }

    fn classify(&self, name: &str) -> Option<DependencyKind> {
        use DependencyKind::*;

        let mut names: Vec<&str> = self.frames.iter().map(|f| f.name.as_str()).collect();
        names.push(name);

        match names.as_slice() {
            ["project", "modules", "module"] => Some(Modules),
            ["project", "profiles", "profile", rest @ ..] => match rest {
                ["dependencies", "dependency"] => Some(ProfileDependencies),
                ["dependencyManagement", "dependencies", "dependency"] => {
                    Some(ProfileDependencyManagement)
                }
                ["build", "plugins", "plugin"] => Some(ProfilePlugins),
                ["build", "plugins", "plugin", "dependencies", "dependency"] => {
                    Some(ProfilePluginDependencies)
                }
                ["build", "pluginManagement", "plugins", "plugin"] => Some(ProfilePluginManagement),
                ["reporting", "plugins", "plugin"] => Some(ProfileReportingPlugins),
                _ => None,
            },
            ["project", rest @ ..] => match rest {
                ["dependencies", "dependency"] => Some(Dependencies),
                ["dependencyManagement", "dependencies", "dependency"] => Some(DependencyManagement),
                ["build", "plugins", "plugin"] => Some(Plugins),
                ["build", "plugins", "plugin", "dependencies", "dependency"] => {
                    Some(PluginDependencies)
                }
                ["build", "pluginManagement", "plugins", "plugin"] => Some(PluginManagement),
                ["build", "pluginManagement", "plugins", "plugin", "dependencies", "dependency"] => {
                    Some(PluginManagementDependencies)
                }
                ["build", "extensions", "extension"] => Some(Extensions),
                ["reporting", "plugins", "plugin"] => Some(ReportingPlugins),
                _ => None,
            },
            _ => None,
        }
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
    fn test_same_name_different_categories() {
        let cases: [(&[&str], DependencyKind); 5] = [
            (&["project", "dependencies"], DependencyKind::Dependencies),
            (&["project", "dependencyManagement", "dependencies"], DependencyKind::DependencyManagement),
            (&["project", "build", "plugins", "plugin", "dependencies"], DependencyKind::PluginDependencies),
            (&["project", "profiles", "profile", "dependencies"], DependencyKind::ProfileDependencies),
            (
                &["project", "build", "pluginManagement", "plugins", "plugin", "dependencies"],
                DependencyKind::PluginManagementDependencies,
            ),
        ];
        for (prefix, expected) in cases {
            let mut path = path_of(prefix);
            assert_eq!(path.push("dependency"), Some(expected), "{:?}", prefix);
        }
    }

    #[test]
    fn test_exclusions_are_not_entries() {
        let mut path = path_of(&["project", "dependencies", "dependency", "exclusions"]);
        assert_eq!(path.push("exclusion"), None);
    }

    #[test]
    fn test_plugins_and_extensions() {
        let mut path = path_of(&["project", "build", "plugins"]);
        assert_eq!(path.push("plugin"), Some(DependencyKind::Plugins));
        assert_eq!(path.current_entry(), Some(DependencyKind::Plugins));

        let mut path = path_of(&["project", "build", "extensions"]);
        assert_eq!(path.push("extension"), Some(DependencyKind::Extensions));

        let mut path = path_of(&["project", "profiles", "profile", "reporting", "plugins"]);
        assert_eq!(path.push("plugin"), Some(DependencyKind::ProfileReportingPlugins));
    }

    #[test]
    fn test_section_strips_profile() {
        let path = path_of(&["project", "profiles", "profile", "reporting"]);
        assert_eq!(path.section(), vec!["reporting"]);
        let path = path_of(&["project", "repositories"]);
        assert_eq!(path.section(), vec!["repositories"]);
    }

    #[test]
    fn test_is_and_would_be() {
        let path = path_of(&["project", "parent"]);
        assert!(path.is(&["project", "parent"]));
        assert!(path.would_be("version", &["project", "parent", "version"]));
        assert!(!path.would_be("version", &["project", "version"]));
    }
}
