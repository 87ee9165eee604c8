//! Rule module files.
//!
//! A rule module is a `.toml` or `.json` file holding either one rule
//! definition or a `rules` list of them. Each definition is tagged by
//! `kind`:
//!
//! ```toml
//! [[rules]]
//! kind = "require_icon_sizes"
//! description = "Android launchers need these icon sizes"
//! platform = "android"
//! level = "warning"
//! sizes = ["48x48", "96x96"]
//!
//! [[rules]]
//! kind = "registered"
//! id = "manifest.start_url"
//! ```

use crate::core::error::LoadFailure;
use crate::core::result::Level;
use crate::core::rule::SharedRule;
use crate::rules::builtin::{require_any_icon_size, require_icon_sizes, require_member};
use crate::rules::registry::RuleRegistry;
use serde::{Deserialize, Serialize};

/// File extensions the loader accepts as rule modules.
pub const MODULE_EXTENSIONS: &[&str] = &["toml", "json"];

/// One declarative rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDefinition {
    /// Every listed icon size must be present.
    RequireIconSizes {
        description: String,
        platform: String,
        #[serde(default)]
        level: Level,
        sizes: Vec<String>,
    },
    /// At least one listed icon size must be present.
    RequireAnyIconSize {
        description: String,
        platform: String,
        sizes: Vec<String>,
    },
    /// A top-level member must be present and non-empty.
    RequireMember {
        description: String,
        platform: String,
        #[serde(default)]
        level: Level,
        member: String,
    },
    /// A compiled rule looked up in the registry.
    Registered { id: String },
}

impl RuleDefinition {
    /// Turn the definition into a runnable rule.
    pub fn instantiate(&self, registry: &RuleRegistry) -> Result<SharedRule, LoadFailure> {
        match self {
            RuleDefinition::RequireIconSizes {
                description,
                platform,
                level,
                sizes,
            } => Ok(require_icon_sizes(description, platform, *level, sizes.iter().cloned())),
            RuleDefinition::RequireAnyIconSize {
                description,
                platform,
                sizes,
            } => Ok(require_any_icon_size(description, platform, sizes.iter().cloned())),
            RuleDefinition::RequireMember {
                description,
                platform,
                level,
                member,
            } => Ok(require_member(description, platform, *level, member)),
            RuleDefinition::Registered { id } => registry
                .create(id)
                .ok_or_else(|| LoadFailure::UnknownRule(id.clone())),
        }
    }
}

/// Parse the text of a rule module. `extension` selects the syntax.
pub fn parse_module(extension: &str, text: &str) -> Result<Vec<RuleDefinition>, LoadFailure> {
    match extension {
        "toml" => parse_toml(text),
        "json" => parse_json(text),
        other => Err(LoadFailure::UnsupportedExtension(other.to_string())),
    }
}

fn parse_toml(text: &str) -> Result<Vec<RuleDefinition>, LoadFailure> {
    let parse_err = |e: toml::de::Error| LoadFailure::Parse(e.to_string());

    let value: toml::Value = toml::from_str(text).map_err(parse_err)?;
    match value.get("rules") {
        Some(rules) => rules.clone().try_into().map_err(parse_err),
        None => value.try_into().map(|d| vec![d]).map_err(parse_err),
    }
}

fn parse_json(text: &str) -> Result<Vec<RuleDefinition>, LoadFailure> {
    use serde_json::Value;
    let parse_err = |e: serde_json::Error| LoadFailure::Parse(e.to_string());

    let value: Value = serde_json::from_str(text).map_err(parse_err)?;
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(parse_err),
        Value::Object(mut map) if map.contains_key("rules") => {
            let rules = map.remove("rules").unwrap_or(Value::Null);
            serde_json::from_value(rules).map_err(parse_err)
        }
        other => serde_json::from_value(other).map(|d| vec![d]).map_err(parse_err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_toml_definition() {
        let defs = parse_module(
            "toml",
            r#"
kind = "require_member"
description = "Name required"
platform = "web"
member = "name"
"#,
        )
        .unwrap();

        assert_eq!(
            defs,
            vec![RuleDefinition::RequireMember {
                description: "Name required".to_string(),
                platform: "web".to_string(),
                level: Level::Error,
                member: "name".to_string(),
            }]
        );
    }

    #[test]
    fn test_toml_rule_list() {
        let defs = parse_module(
            "toml",
            r#"
[[rules]]
kind = "require_any_icon_size"
description = "Some icon"
platform = "web"
sizes = ["192x192"]

[[rules]]
kind = "registered"
id = "manifest.name"
"#,
        )
        .unwrap();
        assert_eq!(defs.len(), 2);
    }

    #[test]
    fn test_empty_rule_list() {
        assert!(parse_module("toml", "rules = []").unwrap().is_empty());
        assert!(parse_module("json", "[]").unwrap().is_empty());
    }

    #[test]
    fn test_json_forms() {
        let single = r#"{ "kind": "registered", "id": "manifest.name" }"#;
        let wrapped = r#"{ "rules": [{ "kind": "registered", "id": "manifest.name" }] }"#;
        assert_eq!(parse_module("json", single).unwrap().len(), 1);
        assert_eq!(parse_module("json", wrapped).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_kind_is_parse_failure() {
        let result = parse_module("toml", r#"kind = "teleport""#);
        assert!(matches!(result, Err(LoadFailure::Parse(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        assert_eq!(
            parse_module("js", "module.exports = []"),
            Err(LoadFailure::UnsupportedExtension("js".to_string()))
        );
    }

    #[test]
    fn test_instantiate_registered() {
        let registry = RuleRegistry::with_builtins();
        let known = RuleDefinition::Registered { id: "manifest.name".to_string() };
        let unknown = RuleDefinition::Registered { id: "nope".to_string() };

        assert!(known.instantiate(&registry).is_ok());
        assert_eq!(
            unknown.instantiate(&registry).err(),
            Some(LoadFailure::UnknownRule("nope".to_string()))
        );
    }
}
