//! Raw record normalization.
//!
//! The catalog endpoint returns loosely shaped JSON. Every field is read
//! defensively: a missing or mistyped field becomes empty/absent and never
//! drops the record or fails the batch.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::domain::{Level, Resource, ResourceId};

/// Category used when a record carries no usable category
pub const UNCATEGORIZED: &str = "uncategorized";

/// Known source misspellings, keyed by the lowercased variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRewrites {
    table: HashMap<String, String>,
}

impl Default for CategoryRewrites {
    fn default() -> Self {
        let mut table = HashMap::new();
        table.insert("mritanga".to_string(), "mridanga".to_string());
        Self { table }
    }
}

impl CategoryRewrites {
    /// An empty table (no corrections)
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Add or replace a rewrite. Both sides are lowercased.
    pub fn with_rewrite(mut self, from: impl AsRef<str>, to: impl AsRef<str>) -> Self {
        self.insert(from, to);
        self
    }

    pub fn insert(&mut self, from: impl AsRef<str>, to: impl AsRef<str>) {
        self.table.insert(
            from.as_ref().trim().to_lowercase(),
            to.as_ref().trim().to_lowercase(),
        );
    }

    /// Merge another table over this one
    pub fn extend(&mut self, other: &HashMap<String, String>) {
        for (from, to) in other {
            self.insert(from, to);
        }
    }

    /// Canonical key for a raw category label
    pub fn canonicalize(&self, raw: &str) -> String {
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() {
            return UNCATEGORIZED.to_string();
        }
        match self.table.get(&lowered) {
            Some(canonical) => canonical.clone(),
            None => lowered,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Turns raw catalog records into `Resource`s
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    rewrites: CategoryRewrites,
}

impl Normalizer {
    pub fn new(rewrites: CategoryRewrites) -> Self {
        Self { rewrites }
    }

    pub fn rewrites(&self) -> &CategoryRewrites {
        &self.rewrites
    }

    /// Normalize a batch, one resource per record, order preserved
    pub fn normalize(&self, records: &[Value]) -> Vec<Resource> {
        let resources: Vec<Resource> = records
            .iter()
            .enumerate()
            .map(|(index, record)| self.normalize_record(index, record))
            .collect();

        debug!(count = resources.len(), "Normalized catalog records");
        resources
    }

    /// Normalize one record. `index` only feeds the fallback id.
    pub fn normalize_record(&self, index: usize, record: &Value) -> Resource {
        let raw_category = text_field(record, "category");
        let video_path = non_empty(text_field(record, "videoPath"));
        let audio_path = non_empty(text_field(record, "audioPath"));

        let reference_url = video_path
            .clone()
            .or_else(|| audio_path.clone())
            .unwrap_or_default();

        Resource {
            id: id_field(record, index),
            category: self.rewrites.canonicalize(&raw_category),
            title: text_field(record, "title"),
            description: text_field(record, "description"),
            instrument: raw_category,
            level: Level::parse(&text_field(record, "level")),
            raga_tala: non_empty(text_field(record, "ragaTalaName")),
            reference_url,
            video_path,
            audio_path,
            thumbnail_url: None,
            mantra: non_empty(text_field(record, "beatSwara")),
        }
    }
}

/// Read a field as text. Numbers and booleans are stringified; anything
/// else (null, arrays, objects, missing) becomes empty.
fn text_field(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn id_field(record: &Value, index: usize) -> ResourceId {
    match non_empty(text_field(record, "id")) {
        Some(id) => ResourceId::new(id),
        None => ResourceId::new(format!("#{}", index)),
    }
}

/// Only the empty string counts as absent; whitespace is kept as given
fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typo_is_rewritten() {
        let normalizer = Normalizer::default();
        let r = normalizer.normalize_record(0, &json!({"id": 1, "category": "Mritanga"}));
        assert_eq!(r.category, "mridanga");
        assert_eq!(r.instrument, "Mritanga");
    }

    #[test]
    fn test_other_categories_lowercased() {
        let normalizer = Normalizer::default();
        let r = normalizer.normalize_record(0, &json!({"category": "Harmonium"}));
        assert_eq!(r.category, "harmonium");
    }

    #[test]
    fn test_custom_rewrite_table() {
        let rewrites = CategoryRewrites::default().with_rewrite("Harmonim", "harmonium");
        let normalizer = Normalizer::new(rewrites);
        let r = normalizer.normalize_record(0, &json!({"category": "HARMONIM"}));
        assert_eq!(r.category, "harmonium");
        assert_eq!(normalizer.rewrites().len(), 2);
    }

    #[test]
    fn test_missing_category() {
        let r = Normalizer::default().normalize_record(0, &json!({"title": "x"}));
        assert_eq!(r.category, UNCATEGORIZED);
        assert_eq!(r.instrument, "");
    }

    #[test]
    fn test_video_beats_audio() {
        let r = Normalizer::default().normalize_record(
            0,
            &json!({"videoPath": "https://youtu.be/abc", "audioPath": "https://x/a.m4a"}),
        );
        assert_eq!(r.reference_url, "https://youtu.be/abc");
        assert!(r.is_video());
    }

    #[test]
    fn test_empty_video_falls_back_to_audio() {
        let r = Normalizer::default()
            .normalize_record(0, &json!({"videoPath": "", "audioPath": "https://x/a.m4a"}));
        assert_eq!(r.reference_url, "https://x/a.m4a");
        assert!(r.is_audio());
        assert!(r.video_path.is_none());
    }

    #[test]
    fn test_whitespace_video_path_is_present() {
        let r = Normalizer::default()
            .normalize_record(0, &json!({"videoPath": "  ", "audioPath": "https://x/a.m4a"}));
        assert_eq!(r.reference_url, "  ");
        assert!(r.is_video());
        assert_eq!(r.audio_path.as_deref(), Some("https://x/a.m4a"));
    }

    #[test]
    fn test_no_media_is_valid() {
        let r = Normalizer::default()
            .normalize_record(0, &json!({"videoPath": null, "audioPath": null}));
        assert_eq!(r.reference_url, "");
        assert!(!r.has_media());
    }

    #[test]
    fn test_non_object_record_still_normalizes() {
        let resources = Normalizer::default().normalize(&[json!("garbage"), json!(42)]);
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].id.as_str(), "#0");
        assert_eq!(resources[1].id.as_str(), "#1");
        assert_eq!(resources[0].title, "");
    }

    #[test]
    fn test_numeric_id_and_optional_fields() {
        let r = Normalizer::default().normalize_record(
            3,
            &json!({
                "id": 17,
                "title": 5,
                "ragaTalaName": "Kaharva",
                "beatSwara": "",
                "level": ["bad"]
            }),
        );
        assert_eq!(r.id.as_str(), "17");
        assert_eq!(r.title, "5");
        assert_eq!(r.raga_tala.as_deref(), Some("Kaharva"));
        assert!(r.mantra.is_none());
        assert_eq!(r.level, Level::default());
    }
}
