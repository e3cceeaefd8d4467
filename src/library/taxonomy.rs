//! Navigation entries derived from a normalized resource set.

use std::collections::HashSet;

use crate::domain::{NavItem, Resource};

/// Glyph for categories without an entry in the icon table
pub const DEFAULT_ICON: &str = "🪔";

/// Fixed category → glyph lookup
pub fn category_icon(category: &str) -> &'static str {
    match category {
        "mridanga" | "mritanga" => "🥁",
        "harmonium" => "🎹",
        "karatal" => "🔔",
        "raga" => "🎵",
        "bhajans" => "📜",
        "kirtan" => "🙌",
        _ => DEFAULT_ICON,
    }
}

/// Upper-case the first character, leave the rest alone
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Home entry followed by one entry per distinct category, first-seen order
pub fn build_nav(resources: &[Resource]) -> Vec<NavItem> {
    let mut seen = HashSet::new();
    let mut items = vec![NavItem::home()];

    for resource in resources {
        if seen.insert(resource.category.as_str()) {
            items.push(NavItem::new(
                resource.category.clone(),
                capitalize(&resource.category),
                category_icon(&resource.category),
            ));
        }
    }

    items
}
