//! Icon presence rules.
//!
//! Two flavours over the same icon size data: "require all of" and
//! "require at least one of".

use crate::core::error::RuleResult;
use crate::core::manifest::Manifest;
use crate::core::result::{codes, members, Level, ResultRecord};
use crate::core::rule::{SharedRule, ValidationRule};
use std::sync::Arc;

/// Reports every required size that no icon declares.
#[derive(Debug, Clone)]
pub struct RequireIconSizes {
    name: String,
    description: String,
    platform: String,
    level: Level,
    required: Vec<String>,
}

impl RequireIconSizes {
    /// Require every size in `required_sizes`, reported at `level`.
    pub fn new<I, S>(
        description: impl Into<String>,
        platform: impl Into<String>,
        level: Level,
        required_sizes: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let platform = platform.into();
        Self {
            name: format!("require_icon_sizes[{}]", platform),
            description: description.into(),
            platform,
            level,
            required: required_sizes.into_iter().map(Into::into).collect(),
        }
    }

    fn record(&self, sizes: &[String]) -> ResultRecord {
        ResultRecord::new(
            &self.description,
            &self.platform,
            self.level,
            members::ICONS,
            codes::MISSING_IMAGE,
        )
        .with_data(sizes.iter().cloned())
    }
}

impl ValidationRule for RequireIconSizes {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, manifest: &Manifest) -> RuleResult<Vec<ResultRecord>> {
        if !manifest.has_icons() {
            return Ok(vec![self.record(&self.required)]);
        }

        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|size| !manifest.icons().iter().any(|icon| icon.has_size(size)))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![self.record(&missing)])
        }
    }
}

/// Reports a warning unless at least one icon declares one of the valid sizes.
#[derive(Debug, Clone)]
pub struct RequireAnyIconSize {
    name: String,
    description: String,
    platform: String,
    valid: Vec<String>,
}

impl RequireAnyIconSize {
    /// Require at least one size from `valid_sizes`.
    pub fn new<I, S>(description: impl Into<String>, platform: impl Into<String>, valid_sizes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let platform = platform.into();
        Self {
            name: format!("require_any_icon_size[{}]", platform),
            description: description.into(),
            platform,
            valid: valid_sizes.into_iter().map(Into::into).collect(),
        }
    }
}

impl ValidationRule for RequireAnyIconSize {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, manifest: &Manifest) -> RuleResult<Vec<ResultRecord>> {
        let found = manifest
            .icons()
            .iter()
            .any(|icon| self.valid.iter().any(|size| icon.has_size(size)));

        if found {
            return Ok(Vec::new());
        }

        Ok(vec![ResultRecord::new(
            &self.description,
            &self.platform,
            Level::Warning,
            members::ICONS,
            codes::MISSING_IMAGE_GROUP,
        )
        .with_data(self.valid.iter().cloned())])
    }
}

/// Rule requiring every size in `required_sizes` to be present among the icons.
pub fn require_icon_sizes<I, S>(
    description: impl Into<String>,
    platform: impl Into<String>,
    level: Level,
    required_sizes: I,
) -> SharedRule
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arc::new(RequireIconSizes::new(description, platform, level, required_sizes))
}

/// Rule requiring at least one of `valid_sizes` to be present among the icons.
pub fn require_any_icon_size<I, S>(
    description: impl Into<String>,
    platform: impl Into<String>,
    valid_sizes: I,
) -> SharedRule
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arc::new(RequireAnyIconSize::new(description, platform, valid_sizes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::Icon;
    use proptest::prelude::*;
    use serde_json::json;

    fn manifest_with(sizes: &[&str]) -> Manifest {
        Manifest {
            icons: Some(sizes.iter().map(|s| Icon::with_sizes(*s)).collect()),
            ..Manifest::default()
        }
    }

    #[test]
    fn test_require_sizes_reports_missing_subset() {
        let rule = require_icon_sizes("desc", "web", Level::Error, ["16", "32"]);
        let results = rule.evaluate(&manifest_with(&["16"])).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].data, vec![json!("32")]);
        assert_eq!(results[0].code, codes::MISSING_IMAGE);
        assert_eq!(results[0].level, Level::Error);
    }

    #[test]
    fn test_require_sizes_all_present() {
        let rule = require_icon_sizes("desc", "web", Level::Error, ["16", "32"]);
        assert!(rule.evaluate(&manifest_with(&["16", "32"])).unwrap().is_empty());
    }

    #[test]
    fn test_require_sizes_without_icons_reports_everything() {
        let rule = require_icon_sizes("desc", "web", Level::Warning, ["16", "32"]);
        let results = rule.evaluate(&Manifest::default()).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, codes::MISSING_IMAGE);
        assert_eq!(results[0].level, Level::Warning);
        assert_eq!(results[0].data, vec![json!("16"), json!("32")]);
    }

    #[test]
    fn test_require_sizes_empty_icon_list_counts_as_none() {
        let rule = require_icon_sizes("desc", "web", Level::Error, ["16"]);
        let results = rule.evaluate(&manifest_with(&[])).unwrap();
        assert_eq!(results[0].data, vec![json!("16")]);
    }

    #[test]
    fn test_require_sizes_matches_multi_size_icons() {
        let rule = require_icon_sizes("desc", "web", Level::Error, ["16x16", "32x32"]);
        assert!(rule.evaluate(&manifest_with(&["16x16 32x32"])).unwrap().is_empty());
    }

    #[test]
    fn test_require_any_reports_full_list_when_nothing_matches() {
        let rule = require_any_icon_size("desc", "web", ["16", "32"]);
        let results = rule.evaluate(&manifest_with(&["64"])).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, Level::Warning);
        assert_eq!(results[0].code, codes::MISSING_IMAGE_GROUP);
        assert_eq!(results[0].data, vec![json!("16"), json!("32")]);
    }

    #[test]
    fn test_require_any_passes_on_first_match() {
        let rule = require_any_icon_size("desc", "web", ["16", "32"]);
        assert!(rule.evaluate(&manifest_with(&["64", "32"])).unwrap().is_empty());
    }

    #[test]
    fn test_require_any_without_icons() {
        let rule = require_any_icon_size("desc", "web", ["16"]);
        let results = rule.evaluate(&Manifest::default()).unwrap();
        assert_eq!(results[0].code, codes::MISSING_IMAGE_GROUP);
        assert_eq!(results[0].level, Level::Warning);
    }

    proptest! {
        #[test]
        fn prop_missing_sizes_are_exactly_the_absent_ones(
            required in proptest::collection::btree_set(1u32..512, 1..8),
            present in proptest::collection::btree_set(1u32..512, 1..8),
        ) {
            let required: Vec<String> = required.iter().map(|n| n.to_string()).collect();
            let present: Vec<String> = present.iter().map(|n| n.to_string()).collect();
            let present_refs: Vec<&str> = present.iter().map(String::as_str).collect();

            let rule = require_icon_sizes("desc", "web", Level::Error, required.clone());
            let results = rule.evaluate(&manifest_with(&present_refs)).unwrap();

            let expected: Vec<serde_json::Value> = required
                .iter()
                .filter(|size| !present.contains(size))
                .map(|size| json!(size))
                .collect();

            if expected.is_empty() {
                prop_assert!(results.is_empty());
            } else {
                prop_assert_eq!(results.len(), 1);
                prop_assert_eq!(&results[0].data, &expected);
            }
        }
    }
}
