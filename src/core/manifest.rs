//! The manifest document and the envelope it travels in.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The base format tag every manifest must carry before rules run.
pub const BASE_FORMAT: &str = "w3c";

/// A manifest together with the format tag its loader declared.
///
/// Owned by the caller. The validator only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestInfo {
    /// The parsed document, if any.
    pub content: Option<Manifest>,
    /// Format tag declared by the loader (e.g. "w3c").
    pub format: String,
}

impl ManifestInfo {
    /// Wrap a manifest with an explicit format tag.
    pub fn new(content: Manifest, format: impl Into<String>) -> Self {
        Self {
            content: Some(content),
            format: format.into(),
        }
    }

    /// Wrap a manifest tagged with the base format.
    pub fn w3c(content: Manifest) -> Self {
        Self::new(content, BASE_FORMAT)
    }

    /// An envelope with no content.
    pub fn empty(format: impl Into<String>) -> Self {
        Self {
            content: None,
            format: format.into(),
        }
    }
}

/// A W3C web application manifest.
///
/// The members rules commonly inspect are typed; everything else is kept
/// verbatim in `extra` so custom rules can still reach it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<Vec<Icon>>,
    /// All other members, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Icons declared by the manifest. `None` and an empty list both count as no icons.
    pub fn icons(&self) -> &[Icon] {
        self.icons.as_deref().unwrap_or(&[])
    }

    /// Whether the manifest declares at least one icon.
    pub fn has_icons(&self) -> bool {
        !self.icons().is_empty()
    }

    /// Look up a top-level member by its JSON name.
    pub fn member(&self, name: &str) -> Option<Value> {
        let typed = |v: &Option<String>| v.as_ref().map(|s| Value::String(s.clone()));
        match name {
            "name" => typed(&self.name),
            "short_name" => typed(&self.short_name),
            "start_url" => typed(&self.start_url),
            "display" => typed(&self.display),
            "icons" => self
                .icons
                .as_ref()
                .and_then(|icons| serde_json::to_value(icons).ok()),
            other => self.extra.get(other).cloned(),
        }
    }
}

/// A single entry of the manifest's `icons` member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Whitespace-separated size list, e.g. "16x16 32x32".
    #[serde(
        default,
        deserialize_with = "deserialize_sizes",
        skip_serializing_if = "Option::is_none"
    )]
    pub sizes: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl Icon {
    /// Create an icon that only declares its sizes.
    pub fn with_sizes(sizes: impl Into<String>) -> Self {
        Self {
            sizes: Some(sizes.into()),
            ..Self::default()
        }
    }

    /// Every size token this icon declares.
    pub fn size_list(&self) -> impl Iterator<Item = &str> {
        self.sizes.as_deref().unwrap_or("").split_whitespace()
    }

    /// Whether this icon declares `size`.
    pub fn has_size(&self, size: &str) -> bool {
        self.size_list().any(|s| s == size)
    }
}

/// Accept `sizes` as either a string or a bare number.
fn deserialize_sizes<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "icon sizes must be a string or number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_keeps_unknown_members() {
        let manifest = Manifest::from_json_str(
            r##"{ "name": "App", "theme_color": "#fff", "icons": [{ "src": "a.png", "sizes": "16x16 32x32" }] }"##,
        )
        .unwrap();

        assert_eq!(manifest.name.as_deref(), Some("App"));
        assert_eq!(manifest.extra.get("theme_color"), Some(&Value::from("#fff")));
        assert!(manifest.icons()[0].has_size("32x32"));
        assert!(!manifest.icons()[0].has_size("64x64"));
    }

    #[test]
    fn test_numeric_icon_sizes_are_normalised() {
        let manifest = Manifest::from_json_str(r#"{ "icons": [{ "sizes": 16 }] }"#).unwrap();
        assert_eq!(manifest.icons()[0].sizes.as_deref(), Some("16"));
        assert!(manifest.icons()[0].has_size("16"));
    }

    #[test]
    fn test_invalid_icon_sizes_rejected() {
        assert!(Manifest::from_json_str(r#"{ "icons": [{ "sizes": [16] }] }"#).is_err());
    }

    #[test]
    fn test_member_lookup() {
        let manifest = Manifest::from_json_str(r#"{ "short_name": "A", "lang": "en" }"#).unwrap();
        assert_eq!(manifest.member("short_name"), Some(Value::from("A")));
        assert_eq!(manifest.member("lang"), Some(Value::from("en")));
        assert_eq!(manifest.member("name"), None);
        assert!(!manifest.has_icons());
    }

    #[test]
    fn test_manifest_info_constructors() {
        let info = ManifestInfo::w3c(Manifest::default());
        assert_eq!(info.format, BASE_FORMAT);
        assert!(info.content.is_some());
        assert!(ManifestInfo::empty("w3c").content.is_none());
    }
}
