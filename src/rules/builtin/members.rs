//! Member presence rules.

use crate::core::error::RuleResult;
use crate::core::manifest::Manifest;
use crate::core::result::{codes, Level, ResultRecord};
use crate::core::rule::{SharedRule, ValidationRule};
use serde_json::Value;
use std::sync::Arc;

/// Reports when a top-level member is absent, null or an empty string.
#[derive(Debug, Clone)]
pub struct RequireMember {
    name: String,
    description: String,
    platform: String,
    level: Level,
    member: String,
}

impl RequireMember {
    /// Require `member` to be present and non-blank.
    pub fn new(
        description: impl Into<String>,
        platform: impl Into<String>,
        level: Level,
        member: impl Into<String>,
    ) -> Self {
        let platform = platform.into();
        let member = member.into();
        Self {
            name: format!("require_member[{}:{}]", platform, member),
            description: description.into(),
            platform,
            level,
            member,
        }
    }
}

impl ValidationRule for RequireMember {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, manifest: &Manifest) -> RuleResult<Vec<ResultRecord>> {
        let present = match manifest.member(&self.member) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };

        if present {
            return Ok(Vec::new());
        }

        Ok(vec![ResultRecord::new(
            &self.description,
            &self.platform,
            self.level,
            &self.member,
            codes::REQUIRED_VALUE,
        )])
    }
}

/// Rule requiring `member` to be present and non-empty.
pub fn require_member(
    description: impl Into<String>,
    platform: impl Into<String>,
    level: Level,
    member: impl Into<String>,
) -> SharedRule {
    Arc::new(RequireMember::new(description, platform, level, member))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_member_reported() {
        let rule = require_member("A name is required", "web", Level::Error, "name");
        let results = rule.evaluate(&Manifest::default()).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].member, "name");
        assert_eq!(results[0].code, codes::REQUIRED_VALUE);
        assert!(results[0].data.is_empty());
    }

    #[test]
    fn test_blank_string_counts_as_missing() {
        let manifest = Manifest::from_json_str(r#"{ "short_name": "  " }"#).unwrap();
        let rule = require_member("d", "web", Level::Warning, "short_name");
        assert_eq!(rule.evaluate(&manifest).unwrap().len(), 1);
    }

    #[test]
    fn test_untyped_member_present() {
        let manifest = Manifest::from_json_str(r#"{ "orientation": "portrait" }"#).unwrap();
        let rule = require_member("d", "web", Level::Error, "orientation");
        assert!(rule.evaluate(&manifest).unwrap().is_empty());
    }
}
