//! Thumbnail resolution.
//!
//! Resolution order:
//! 1. An explicit `thumbnail_url` on the resource
//! 2. For YouTube-hosted media, the video's `hqdefault.jpg`
//! 3. A fixed placeholder image
//!
//! A thumbnail that fails to load is replaced by the same placeholder.
//!
//! The video id is taken from the text after the first `v=` (up to the next
//! `&`), otherwise from the last path segment. This is a heuristic and does
//! not cover every hosting URL shape.

use crate::domain::Resource;

/// Shown when no thumbnail can be derived or one fails to load
pub const PLACEHOLDER_THUMBNAIL: &str =
    "https://images.unsplash.com/photo-1511671782779-c97d3d27a1d4?auto=format&fit=crop&q=80&w=400";

/// Where a resolved thumbnail came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    Explicit(String),
    Derived(String),
    Placeholder,
}

impl Thumbnail {
    pub fn url(&self) -> &str {
        match self {
            Thumbnail::Explicit(url) | Thumbnail::Derived(url) => url,
            Thumbnail::Placeholder => PLACEHOLDER_THUMBNAIL,
        }
    }

    /// Replacement after a load failure
    pub fn on_load_failure(&self) -> Thumbnail {
        Thumbnail::Placeholder
    }
}

/// Whether a media URL points at a known video host
pub fn is_video_host(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Extract the video identifier from a hosting URL
pub fn video_id(url: &str) -> &str {
    match url.split_once("v=") {
        Some((_, rest)) => rest.split('&').next().unwrap_or_default(),
        None => url.rsplit('/').next().unwrap_or_default(),
    }
}

/// Resolve the thumbnail for a resource
pub fn resolve(resource: &Resource) -> Thumbnail {
    if let Some(explicit) = resource.thumbnail_url.as_deref().filter(|u| !u.is_empty()) {
        return Thumbnail::Explicit(explicit.to_string());
    }

    let url = &resource.reference_url;
    if is_video_host(url) {
        return Thumbnail::Derived(format!(
            "https://img.youtube.com/vi/{}/hqdefault.jpg",
            video_id(url)
        ));
    }

    Thumbnail::Placeholder
}
