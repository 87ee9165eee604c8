//! Built-in rule factories.
//!
//! This module contains the generic rules that ship with the validator and
//! registers a few named instances of them in the rule registry.

mod icons;
mod members;

pub use icons::{require_any_icon_size, require_icon_sizes, RequireAnyIconSize, RequireIconSizes};
pub use members::{require_member, RequireMember};

use crate::core::result::Level;
use crate::rules::registry::RuleRegistry;

/// Register the named built-in rules.
pub fn register_all(registry: &mut RuleRegistry) {
    registry.register_with_tags(
        "manifest.name",
        || members::require_member("The manifest should declare a name", "web", Level::Error, "name"),
        vec!["member".to_string()],
    );
    registry.register_with_tags(
        "manifest.short_name",
        || {
            members::require_member(
                "The manifest should declare a short name",
                "web",
                Level::Warning,
                "short_name",
            )
        },
        vec!["member".to_string()],
    );
    registry.register_with_tags(
        "manifest.start_url",
        || {
            members::require_member(
                "The manifest should declare a start URL",
                "web",
                Level::Error,
                "start_url",
            )
        },
        vec!["member".to_string()],
    );
    registry.register_with_tags(
        "icons.any",
        || icons::require_any_icon_size("At least one icon should be declared", "web", ["192x192", "512x512"]),
        vec!["icons".to_string()],
    );
}
