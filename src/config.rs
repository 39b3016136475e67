// src/config.rs

//! Configuration file for batch runs
//!
//! ```toml
//! [transform]
//! package = "libfoo-java"
//! keep_pom_version = true
//! ignored_modules = ["samples"]
//!
//! [rules]
//! rules = "debian/maven.rules"
//! ignore_rules = "debian/maven.ignoreRules"
//! published_rules = "debian/maven.publishedRules"
//! repository = "/usr/share/maven-repo"
//! ```
//!
//! Every key is optional. A missing file yields the defaults.

use crate::transform::{TransformContext, TransformOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pomrewrite.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Rule files and repository location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub rules: Option<PathBuf>,
    pub ignore_rules: Option<PathBuf>,
    pub published_rules: Option<PathBuf>,
    /// Root of the local manifest repository
    pub repository: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transform: TransformOptions,
    pub rules: RulesConfig,
}

impl Config {
    /// Load `path`, or the defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Build the rule context from the configured rule files
    pub fn context(&self) -> TransformContext {
        TransformContext::load(
            self.rules.rules.as_deref(),
            self.rules.ignore_rules.as_deref(),
            self.rules.published_rules.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[transform]
package = "libfoo-java"
keep_pom_version = true
ignored_modules = ["samples"]

[rules]
rules = "debian/maven.rules"
repository = "/usr/share/maven-repo"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.transform.package.as_deref(), Some("libfoo-java"));
        assert!(config.transform.keep_pom_version);
        assert!(!config.transform.no_parent);
        assert_eq!(config.transform.ignored_modules, vec!["samples"]);
        assert_eq!(config.rules.rules, Some(PathBuf::from("debian/maven.rules")));
        assert_eq!(config.rules.ignore_rules, None);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::parse("[transform]\nkeep_pom_version = \"maybe\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_round_trip() {
        let mut config = Config::default();
        config.transform.debian_build = true;
        config.rules.published_rules = Some(PathBuf::from("published.rules"));
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), config);
    }
}
