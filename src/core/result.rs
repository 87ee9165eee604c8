//! Result records emitted by rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Classification codes used by the built-in rules.
pub mod codes {
    /// One or more required icon sizes are missing.
    pub const MISSING_IMAGE: &str = "missingImage";
    /// None of a group of acceptable icon sizes is present.
    pub const MISSING_IMAGE_GROUP: &str = "missingImageGroup";
    /// A required member is absent or empty.
    pub const REQUIRED_VALUE: &str = "requiredValue";
}

/// Manifest members the built-in rules report against.
pub mod members {
    pub const ICONS: &str = "icons";
}

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Error,
    Warning,
}

impl Level {
    /// Lower-case display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding emitted by a rule.
///
/// Immutable once emitted. `data` is always present and carries
/// rule-specific detail such as the missing icon sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Human-readable description of the problem.
    pub description: String,
    /// Platform tag the finding belongs to.
    pub platform: String,
    /// Severity.
    pub level: Level,
    /// The manifest member the finding is about.
    pub member: String,
    /// Classification code.
    pub code: String,
    /// Supporting values.
    #[serde(default)]
    pub data: Vec<Value>,
}

impl ResultRecord {
    /// Create a record with empty data.
    pub fn new(
        description: impl Into<String>,
        platform: impl Into<String>,
        level: Level,
        member: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            platform: platform.into(),
            level,
            member: member.into(),
            code: code.into(),
            data: Vec::new(),
        }
    }

    /// Attach supporting data.
    pub fn with_data<I, V>(mut self, data: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.data = data.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this is an error-level finding.
    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}/{}): {}",
            self.level, self.platform, self.member, self.code, self.description
        )?;
        if !self.data.is_empty() {
            let data: Vec<String> = self
                .data
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            write!(f, " [{}]", data.join(", "))?;
        }
        Ok(())
    }
}
