//! Rule registry for named rules.
//!
//! Rule files refer to compiled rules by identifier (`kind = "registered"`);
//! the registry maps those identifiers to factories. Hosts populate it at
//! startup instead of loading code from disk.

use crate::core::rule::SharedRule;
use indexmap::IndexMap;
use std::sync::Arc;

/// Factory function for creating rule instances.
pub type RuleFactory = Arc<dyn Fn() -> SharedRule + Send + Sync>;

/// Registry entry containing a factory and its tags.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Factory function to create instances.
    pub factory: RuleFactory,
    /// Whether this rule can be created.
    pub enabled: bool,
    /// Tags for organization and search.
    pub tags: Vec<String>,
}

/// Registry of named rule factories, in registration order.
pub struct RuleRegistry {
    rules: IndexMap<String, RegistryEntry>,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    /// Create a registry pre-populated with the built-in named rules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::rules::builtin::register_all(&mut registry);
        registry
    }

    /// Register a rule factory. Re-registering an id replaces the previous factory.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> SharedRule + Send + Sync + 'static,
    {
        self.register_with_tags(id, factory, Vec::new());
    }

    /// Register a rule factory with additional tags.
    pub fn register_with_tags<F>(&mut self, id: impl Into<String>, factory: F, tags: Vec<String>)
    where
        F: Fn() -> SharedRule + Send + Sync + 'static,
    {
        let entry = RegistryEntry {
            factory: Arc::new(factory),
            enabled: true,
            tags,
        };
        self.rules.insert(id.into(), entry);
    }

    /// Create a new instance of a rule by id.
    pub fn create(&self, id: &str) -> Option<SharedRule> {
        self.rules.get(id).filter(|e| e.enabled).map(|e| (e.factory)())
    }

    /// Check if a rule is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    /// Get all registered rule ids.
    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|s| s.as_str())
    }

    /// Search rules by id or tag.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();

        self.rules
            .iter()
            .filter(|(id, entry)| {
                id.to_lowercase().contains(&query)
                    || entry.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Enable or disable a rule.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        if let Some(entry) = self.rules.get_mut(id) {
            entry.enabled = enabled;
            true
        } else {
            false
        }
    }

    /// Unregister a rule.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.rules.shift_remove(id).is_some()
    }

    /// Get the total number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rule::FnRule;

    fn quiet() -> SharedRule {
        FnRule::shared("quiet", |_| Ok(Vec::new()))
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = RuleRegistry::new();
        registry.register("custom.quiet", quiet);

        assert!(registry.contains("custom.quiet"));
        let rule = registry.create("custom.quiet").unwrap();
        assert_eq!(rule.name(), "quiet");
        assert!(registry.create("custom.loud").is_none());
    }

    #[test]
    fn test_builtins_registered() {
        let registry = RuleRegistry::with_builtins();
        assert!(registry.contains("manifest.name"));
        assert!(registry.contains("icons.any"));
    }

    #[test]
    fn test_search_by_tag() {
        let registry = RuleRegistry::with_builtins();
        let results = registry.search("member");
        assert!(results.contains(&"manifest.start_url"));
        assert!(!results.contains(&"icons.any"));
    }

    #[test]
    fn test_enable_disable() {
        let mut registry = RuleRegistry::new();
        registry.register("custom.quiet", quiet);

        registry.set_enabled("custom.quiet", false);
        assert!(registry.create("custom.quiet").is_none());

        registry.set_enabled("custom.quiet", true);
        assert!(registry.create("custom.quiet").is_some());
        assert!(!registry.set_enabled("missing", true));
    }

    #[test]
    fn test_unregister() {
        let mut registry = RuleRegistry::new();
        registry.register("custom.quiet", quiet);

        assert!(registry.unregister("custom.quiet"));
        assert!(!registry.contains("custom.quiet"));
        assert!(registry.is_empty());
    }
}
