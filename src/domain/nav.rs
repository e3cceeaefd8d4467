//! Sidebar navigation entries.

use serde::{Deserialize, Serialize};

/// Reserved id of the leading navigation entry
pub const HOME_ID: &str = "home";

/// A navigable category (or the home entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    /// Category key, or `home`
    pub id: String,

    /// Display label
    pub label: String,

    /// Glyph shown next to the label
    pub icon: String,
}

impl NavItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: icon.into(),
        }
    }

    /// The fixed home entry
    pub fn home() -> Self {
        Self::new(HOME_ID, "Home", "🏠")
    }

    pub fn is_home(&self) -> bool {
        self.id == HOME_ID
    }
}
