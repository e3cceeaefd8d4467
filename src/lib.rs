//! kirtan - Kirtan lesson catalog and playback core
//!
//! Fetches a loosely shaped list of lesson records from a remote endpoint,
//! normalizes them into canonical `Resource`s, derives the category
//! navigation, and answers filtered/paginated queries. A playback
//! controller tracks timing and scrubbing for the open lesson, and a
//! downloader saves lesson media with a direct-link fallback.
//!
//! # Modules
//!
//! - `adapters`: Remote catalog source and media downloads
//! - `library`: Normalization, taxonomy, queries, thumbnails, snapshots
//! - `playback`: Playback state machine, lesson binding, time labels
//! - `domain`: Data structures (Resource, Level, NavItem)
//! - `config`: Configuration resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Categories
//! kirtan nav
//!
//! # Lessons in a category, filtered
//! kirtan list mridanga --search ghen --level beginner
//!
//! # Download a lesson's audio
//! kirtan download 42
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod library;
pub mod playback;

// Re-export main types at crate root for convenience
pub use adapters::{CatalogError, CatalogSource, DownloadOutcome, Downloader, HttpCatalogSource};
pub use domain::{Level, MediaKind, NavItem, Resource, ResourceId};
pub use library::{Catalog, CatalogState, CatalogStore, Normalizer, QuerySession};
pub use playback::{
    format_time, LessonSession, MediaElement, MediaEvent, PlaybackController, PlaybackState,
};
