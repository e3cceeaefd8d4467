//! Canonical lesson record.
//!
//! A `Resource` is only ever built by the normalizer; everything downstream
//! (taxonomy, queries, playback, downloads) reads it and never mutates it.

use serde::{Deserialize, Serialize};

/// Opaque lesson identifier, unique within one catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which path field supplied the reference URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    /// Neither path was present; `reference_url` is empty.
    None,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::None => write!(f, "none"),
        }
    }
}

/// Difficulty tier, or whatever the source sent if it is not one we know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    /// Passed through verbatim (may be empty when the source omitted it)
    Other(String),
}

/// Badge colour for a level, as shown on lesson cards and rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelBadge {
    Green,
    Yellow,
    Red,
    Gray,
}

impl Level {
    /// Parse a raw level string. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "beginner" => Level::Beginner,
            "intermediate" => Level::Intermediate,
            "advanced" => Level::Advanced,
            _ => Level::Other(raw.to_string()),
        }
    }

    /// Text used for matching and display (canonical for known tiers)
    pub fn as_str(&self) -> &str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
            Level::Other(raw) => raw,
        }
    }

    /// Human label; an absent level reads as "Unknown"
    pub fn label(&self) -> &str {
        match self {
            Level::Other(raw) if raw.trim().is_empty() => "Unknown",
            other => other.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Level::Other(_))
    }

    /// Badge colour lookup. "medium" is treated like intermediate.
    pub fn badge(&self) -> LevelBadge {
        match self {
            Level::Beginner => LevelBadge::Green,
            Level::Intermediate => LevelBadge::Yellow,
            Level::Advanced => LevelBadge::Red,
            Level::Other(raw) if raw.eq_ignore_ascii_case("medium") => LevelBadge::Yellow,
            Level::Other(_) => LevelBadge::Gray,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Other(String::new())
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::fmt::Display for LevelBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelBadge::Green => write!(f, "green"),
            LevelBadge::Yellow => write!(f, "yellow"),
            LevelBadge::Red => write!(f, "red"),
            LevelBadge::Gray => write!(f, "gray"),
        }
    }
}

/// A normalized lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,

    /// Canonical lowercase category key
    pub category: String,

    pub title: String,

    pub description: String,

    /// Category label exactly as the source spelled it
    pub instrument: String,

    pub level: Level,

    pub raga_tala: Option<String>,

    /// Video path if present, else audio path, else empty
    pub reference_url: String,

    pub video_path: Option<String>,

    pub audio_path: Option<String>,

    /// Explicit thumbnail; usually absent and resolved by `library::thumbnail`
    pub thumbnail_url: Option<String>,

    pub mantra: Option<String>,
}

impl Resource {
    /// Which path the reference URL came from
    pub fn media_kind(&self) -> MediaKind {
        if self.video_path.is_some() {
            MediaKind::Video
        } else if self.audio_path.is_some() {
            MediaKind::Audio
        } else {
            MediaKind::None
        }
    }

    pub fn is_video(&self) -> bool {
        self.media_kind() == MediaKind::Video
    }

    pub fn is_audio(&self) -> bool {
        self.media_kind() == MediaKind::Audio
    }

    pub fn has_media(&self) -> bool {
        !self.reference_url.is_empty()
    }

    /// URL handed to the audio player on the detail view
    pub fn playback_url(&self) -> &str {
        self.audio_path.as_deref().unwrap_or(&self.reference_url)
    }

    /// Glyph for the detail view, keyed on the instrument label
    pub fn instrument_icon(&self) -> &'static str {
        let instrument = self.instrument.to_lowercase();
        if instrument.contains("mridanga") {
            "🥁"
        } else if instrument.contains("harmonium") {
            "🎹"
        } else if instrument.contains("karatal") {
            "🔔"
        } else {
            "🎵"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(video: Option<&str>, audio: Option<&str>) -> Resource {
        Resource {
            id: ResourceId::new("1"),
            category: "harmonium".to_string(),
            title: String::new(),
            description: String::new(),
            instrument: "Harmonium".to_string(),
            level: Level::default(),
            raga_tala: None,
            reference_url: video.or(audio).unwrap_or_default().to_string(),
            video_path: video.map(str::to_string),
            audio_path: audio.map(str::to_string),
            thumbnail_url: None,
            mantra: None,
        }
    }

    #[test]
    fn test_level_parse_known_tiers() {
        assert_eq!(Level::parse("Beginner"), Level::Beginner);
        assert_eq!(Level::parse("INTERMEDIATE"), Level::Intermediate);
        assert_eq!(Level::parse("advanced"), Level::Advanced);
    }

    #[test]
    fn test_level_passthrough() {
        let level = Level::parse("Expert-ish");
        assert_eq!(level, Level::Other("Expert-ish".to_string()));
        assert_eq!(level.as_str(), "Expert-ish");
        assert!(!level.is_known());
        assert_eq!(level.badge(), LevelBadge::Gray);
    }

    #[test]
    fn test_level_badges() {
        assert_eq!(Level::Beginner.badge(), LevelBadge::Green);
        assert_eq!(Level::Intermediate.badge(), LevelBadge::Yellow);
        assert_eq!(Level::parse("Medium").badge(), LevelBadge::Yellow);
        assert_eq!(Level::Advanced.badge(), LevelBadge::Red);
        assert_eq!(Level::default().badge(), LevelBadge::Gray);
    }

    #[test]
    fn test_empty_level_label() {
        assert_eq!(Level::default().label(), "Unknown");
        assert_eq!(Level::default().to_string(), "Unknown");
    }

    #[test]
    fn test_media_kind_is_exclusive() {
        let both = resource(Some("v.mp4"), Some("a.m4a"));
        assert!(both.is_video());
        assert!(!both.is_audio());

        let audio = resource(None, Some("a.m4a"));
        assert!(audio.is_audio());
        assert!(!audio.is_video());

        let none = resource(None, None);
        assert_eq!(none.media_kind(), MediaKind::None);
        assert!(!none.has_media());
    }

    #[test]
    fn test_playback_url_prefers_audio_path() {
        assert_eq!(resource(Some("v.mp4"), Some("a.m4a")).playback_url(), "a.m4a");
        assert_eq!(resource(Some("v.mp4"), None).playback_url(), "v.mp4");
    }

    #[test]
    fn test_instrument_icon() {
        let mut r = resource(None, None);
        assert_eq!(r.instrument_icon(), "🎹");
        r.instrument = "Mritanga".to_string();
        assert_eq!(r.instrument_icon(), "🎵");
        r.instrument = "Mridanga".to_string();
        assert_eq!(r.instrument_icon(), "🥁");
    }
}
