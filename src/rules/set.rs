// src/rules/set.rs

//! Ordered collections of dependency rules
//!
//! Rule files hold one rule per line. Lines starting with `#` and blank lines
//! are skipped:
//!
//! ```text
//! # Map every commons-io version to 2.x
//! commons-io commons-io jar s/2\..*/2.x/
//! junit junit jar s/3\..*/3.x/
//! ```
//!
//! Rules are kept sorted from most to least specific, so a linear scan
//! stopping at the first match gives narrow overrides priority over broad
//! wildcards.

use super::{DependencyRule, RuleError, KEEP_PLUGIN_VERSION, TO_PLACEHOLDER_VERSION};
use crate::manifest::Dependency;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// A sorted set of dependency rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    description: String,
    rules: BTreeSet<DependencyRule>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            rules: BTreeSet::new(),
        }
    }

    /// Rule set holding the placeholder and plugin-version rules
    pub fn with_defaults(description: impl Into<String>) -> Self {
        let mut set = Self::new(description);
        set.add_defaults();
        set
    }

    pub fn add_defaults(&mut self) {
        self.add(TO_PLACEHOLDER_VERSION.clone());
        self.add(KEEP_PLUGIN_VERSION.clone());
    }

    /// Parse rules from text, one per line
    pub fn parse(description: impl Into<String>, content: &str) -> Result<Self, RuleError> {
        let mut set = Self::new(description);
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let rule = DependencyRule::parse(line).map_err(|source| RuleError::InvalidLine {
                line: number + 1,
                source: Box::new(source),
            })?;
            set.add(rule);
        }
        Ok(set)
    }

    /// Read a rule file
    pub fn read(path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::parse(path.display().to_string(), &content)?;
        debug!("Loaded {} rules from {}", set.len(), path.display());
        Ok(set)
    }

    /// Read a rule file, falling back to an empty set when it is unusable
    ///
    /// A missing or invalid rule file is a warning, not a failure.
    pub fn read_or_empty(path: &Path) -> Self {
        match Self::read(path) {
            Ok(set) => set,
            Err(e) => {
                warn!("Ignoring rules from {}: {}", path.display(), e);
                Self::new(path.display().to_string())
            }
        }
    }

    /// Write the description line and one rule per line in sorted order
    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "# {}", self.description)?;
        for rule in &self.rules {
            writeln!(out, "{}", rule)?;
        }
        Ok(())
    }

    /// Save to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()
    }

    /// Insert a rule, returning false when an equal rule was present
    pub fn add(&mut self, rule: DependencyRule) -> bool {
        self.rules.insert(rule)
    }

    /// Merge every rule of `other` into this set
    pub fn add_all(&mut self, other: &RuleSet) {
        self.rules.extend(other.rules.iter().cloned());
    }

    /// Every rule matching `dep`, most specific first
    pub fn find_matching_rules(&self, dep: &Dependency) -> Vec<&DependencyRule> {
        self.rules.iter().filter(|rule| rule.matches(dep)).collect()
    }

    /// The first rule in specificity order matching `dep`
    pub fn find_first(&self, dep: &Dependency) -> Option<&DependencyRule> {
        self.rules.iter().find(|rule| rule.matches(dep))
    }

    pub fn contains(&self, rule: &DependencyRule) -> bool {
        self.rules.contains(rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyRule> {
        self.rules.iter()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a DependencyRule;
    type IntoIter = std::collections::btree_set::Iter<'a, DependencyRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl Extend<DependencyRule> for RuleSet {
    fn extend<T: IntoIterator<Item = DependencyRule>>(&mut self, iter: T) {
        self.rules.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = "\
# Rules for the test
junit junit jar s/3\\..*/3.x/

commons-io commons-io
* * * *
";

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let set = RuleSet::parse("test", RULES).unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = RuleSet::parse("test", "a\ns/(/x/\n").unwrap_err();
        assert!(matches!(err, RuleError::InvalidLine { line: 2, .. }));
    }

    #[test]
    fn test_first_match_wins() {
        let set = RuleSet::parse("test", RULES).unwrap();
        let junit = Dependency::new("junit", "junit", "jar", "3.8.2");
        let first = set.find_first(&junit).unwrap();
        assert_eq!(first.to_string(), "junit junit jar s/3\\..*/3.x/ * *");
        assert_eq!(junit.apply_rules(&set).version.as_deref(), Some("3.x"));
        assert_eq!(set.find_matching_rules(&junit).len(), 2);
    }

    #[test]
    fn test_no_match_returns_copy() {
        let set = RuleSet::parse("test", "junit junit").unwrap();
        let dep = Dependency::new("org.slf4j", "slf4j-api", "jar", "1.7");
        assert_eq!(dep.apply_rules(&set), dep);
    }

    #[test]
    fn test_defaults() {
        let set = RuleSet::with_defaults("defaults");
        let plugin = Dependency::new("org.apache.maven.plugins", "maven-jar-plugin", "maven-plugin", "3.3.0");
        assert_eq!(plugin.apply_rules(&set).version.as_deref(), Some("3.3.0"));
        let lib = Dependency::new("commons-io", "commons-io", "jar", "2.11.0");
        assert_eq!(lib.apply_rules(&set).version.as_deref(), Some("debian"));
    }

    #[test]
    fn test_add_all_merges() {
        let mut a = RuleSet::parse("a", "x y").unwrap();
        let b = RuleSet::parse("b", "x y\nz w").unwrap();
        a.add_all(&b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_save_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maven.rules");
        let set = RuleSet::parse("round trip", RULES).unwrap();
        set.save(&path).unwrap();

        let reread = RuleSet::read(&path).unwrap();
        let original: Vec<String> = set.iter().map(ToString::to_string).collect();
        let restored: Vec<String> = reread.iter().map(ToString::to_string).collect();
        assert_eq!(original, restored);

        for dep in [
            Dependency::new("junit", "junit", "jar", "3.8.1"),
            Dependency::new("commons-io", "commons-io", "jar", "2.4"),
            Dependency::unversioned("org.foo", "bar", "pom"),
        ] {
            assert_eq!(dep.apply_rules(&set), dep.apply_rules(&reread));
            assert_eq!(
                dep.apply_rules(&set).version,
                dep.apply_rules(&reread).version
            );
        }
    }

    #[test]
    fn test_read_or_empty_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let set = RuleSet::read_or_empty(&dir.path().join("absent.rules"));
        assert!(set.is_empty());
    }
}
