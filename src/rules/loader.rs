//! Rule discovery from a directory tree.
//!
//! Layout contract: a root directory holding rule module files plus zero or
//! more immediate subdirectories named after platform tags. Only the
//! subdirectories named in the platform filter are descended into, and
//! their contents load unconditionally. Platform partitioning applies to
//! the first level only; deeper directories are not filtered.
//!
//! # Failure isolation
//!
//! - Root directory cannot be listed: the whole call fails
//! - A rule file cannot be read, parsed or resolved: logged and dropped
//! - A matched platform subdirectory cannot be listed: logged and dropped

use crate::core::error::{LoadFailure, RuleLoadError, ValidatorError, ValidatorResult};
use crate::core::rule::SharedRule;
use crate::rules::definition::{parse_module, MODULE_EXTENSIONS};
use crate::rules::registry::RuleRegistry;
use log::{debug, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Loads rule modules from disk.
#[derive(Clone)]
pub struct RuleLoader {
    registry: Arc<RuleRegistry>,
}

impl RuleLoader {
    /// Create a loader resolving `registered` rules through `registry`.
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    /// The registry used to resolve named rules.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Load every rule under `directory`, descending only into the
    /// immediate subdirectories named in `platforms`.
    pub fn load<S: AsRef<str> + Sync>(
        &self,
        directory: &Path,
        platforms: &[S],
    ) -> ValidatorResult<Vec<SharedRule>> {
        self.scan(directory, Some(platforms))
    }

    /// Load every rule under `directory` with no platform filtering at any
    /// depth. Used for the contents of a matched platform directory.
    fn load_all(&self, directory: &Path) -> ValidatorResult<Vec<SharedRule>> {
        self.scan::<&str>(directory, None)
    }

    /// List `directory` and load its entries concurrently. With a filter,
    /// subdirectories load only when named in it; without one, they always
    /// load.
    fn scan<S: AsRef<str> + Sync>(
        &self,
        directory: &Path,
        platforms: Option<&[S]>,
    ) -> ValidatorResult<Vec<SharedRule>> {
        let entries = list_entries(directory)?;
        debug!(
            "Scanning {} entries in rule directory {}",
            entries.len(),
            directory.display()
        );

        let outcomes: Vec<Result<Vec<SharedRule>, RuleLoadError>> = entries
            .par_iter()
            .map(|entry| self.load_entry(entry, platforms))
            .collect();

        let mut rules = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(loaded) => rules.extend(loaded),
                Err(error) => warn!("{}", error),
            }
        }
        Ok(rules)
    }

    fn load_entry<S: AsRef<str>>(
        &self,
        entry: &Entry,
        platforms: Option<&[S]>,
    ) -> Result<Vec<SharedRule>, RuleLoadError> {
        if !entry.is_dir {
            return self.load_file(&entry.path);
        }

        if let Some(platforms) = platforms {
            let name = entry.path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !platforms.iter().any(|p| p.as_ref() == name) {
                debug!("Skipping platform directory {} (not requested)", entry.path.display());
                return Ok(Vec::new());
            }
        }

        self.load_all(&entry.path).map_err(|error| match error {
            ValidatorError::DirectoryRead { path, source } => {
                RuleLoadError::new(path, LoadFailure::Directory(source.to_string()))
            }
            other => RuleLoadError::new(&entry.path, LoadFailure::Directory(other.to_string())),
        })
    }

    /// Load a single rule module file.
    pub fn load_file(&self, path: &Path) -> Result<Vec<SharedRule>, RuleLoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if !MODULE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(RuleLoadError::new(path, LoadFailure::UnsupportedExtension(extension)));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| RuleLoadError::new(path, LoadFailure::Read(e.to_string())))?;

        let definitions =
            parse_module(&extension, &text).map_err(|reason| RuleLoadError::new(path, reason))?;

        let rules = definitions
            .iter()
            .map(|def| def.instantiate(&self.registry))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| RuleLoadError::new(path, reason))?;

        debug!("Loaded {} rule(s) from {}", rules.len(), path.display());
        Ok(rules)
    }
}

impl Default for RuleLoader {
    fn default() -> Self {
        Self::new(Arc::new(RuleRegistry::with_builtins()))
    }
}

/// An immediate child of a rule directory.
#[derive(Debug)]
struct Entry {
    path: PathBuf,
    is_dir: bool,
}

/// List the immediate children of `directory`, sorted by file name.
fn list_entries(directory: &Path) -> ValidatorResult<Vec<Entry>> {
    let read_error = |source: std::io::Error| ValidatorError::DirectoryRead {
        path: directory.to_path_buf(),
        source,
    };

    if !directory.is_dir() {
        return Err(read_error(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not a readable directory",
        )));
    }

    WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| -> ValidatorResult<Entry> {
            let entry = entry.map_err(|e| read_error(e.into()))?;
            Ok(Entry {
                is_dir: entry.file_type().is_dir(),
                path: entry.into_path(),
            })
        })
        .collect()
}

/// Load rules from `directory` with the built-in registry.
pub fn load_validation_rules<S: AsRef<str> + Sync>(
    directory: impl AsRef<Path>,
    platforms: &[S],
) -> ValidatorResult<Vec<SharedRule>> {
    RuleLoader::default().load(directory.as_ref(), platforms)
}
