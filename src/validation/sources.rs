//! Platform rule sources.
//!
//! Each platform contributes its own rule list on request. Sources are
//! external collaborators; two ready-made variants are provided.

use crate::core::error::SourceError;
use crate::core::rule::SharedRule;
use crate::rules::loader::RuleLoader;
use std::path::PathBuf;
use std::sync::Arc;

/// Supplies the rules of one platform.
pub trait PlatformRuleSource: Send + Sync {
    /// Platform tag this source belongs to.
    fn platform(&self) -> &str;

    /// Rules to run, given the full set of requested platforms.
    fn validation_rules(&self, platforms: &[String]) -> Result<Vec<SharedRule>, SourceError>;
}

/// Sources are shared across platform tasks.
pub type SharedSource = Arc<dyn PlatformRuleSource>;

/// A source with a fixed rule list.
pub struct StaticRuleSource {
    platform: String,
    rules: Vec<SharedRule>,
}

impl StaticRuleSource {
    /// A source that always returns `rules`.
    pub fn new(platform: impl Into<String>, rules: Vec<SharedRule>) -> Self {
        Self {
            platform: platform.into(),
            rules,
        }
    }

    /// Wrap and share.
    pub fn shared(platform: impl Into<String>, rules: Vec<SharedRule>) -> SharedSource {
        Arc::new(Self::new(platform, rules))
    }
}

impl PlatformRuleSource for StaticRuleSource {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn validation_rules(&self, _platforms: &[String]) -> Result<Vec<SharedRule>, SourceError> {
        Ok(self.rules.clone())
    }
}

/// A source backed by its own rule directory.
///
/// The directory follows the same layout contract as the common rule
/// directory, filtered by the requested platforms.
pub struct DirectoryRuleSource {
    platform: String,
    directory: PathBuf,
    loader: RuleLoader,
}

impl DirectoryRuleSource {
    /// A source loading from `directory` with `loader`.
    pub fn new(platform: impl Into<String>, directory: impl Into<PathBuf>, loader: RuleLoader) -> Self {
        Self {
            platform: platform.into(),
            directory: directory.into(),
            loader,
        }
    }
}

impl PlatformRuleSource for DirectoryRuleSource {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn validation_rules(&self, platforms: &[String]) -> Result<Vec<SharedRule>, SourceError> {
        self.loader
            .load(&self.directory, platforms)
            .map_err(|source| SourceError::Load {
                platform: self.platform.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rule::FnRule;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_static_source_returns_its_rules() {
        let source = StaticRuleSource::new("ios", vec![FnRule::shared("r", |_| Ok(Vec::new()))]);
        assert_eq!(source.platform(), "ios");
        assert_eq!(source.validation_rules(&[]).unwrap().len(), 1);
    }

    #[test]
    fn test_directory_source_loads_rules() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("name.toml"), "kind = \"registered\"\nid = \"manifest.name\"\n").unwrap();

        let source = DirectoryRuleSource::new("windows", dir.path(), RuleLoader::default());
        assert_eq!(source.validation_rules(&["windows".to_string()]).unwrap().len(), 1);
    }

    #[test]
    fn test_directory_source_missing_directory() {
        let source = DirectoryRuleSource::new("windows", "/definitely/not/here", RuleLoader::default());
        let error = source.validation_rules(&[]).unwrap_err();
        assert!(error.to_string().contains("windows"));
    }
}
