//! Adapter interfaces for external systems.
//!
//! - `http`: the remote lesson catalog endpoint
//! - `download`: media downloads with a direct-link fallback

pub mod download;
pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use download::{DownloadError, DownloadOutcome, Downloader, LinkOpener, SystemOpener};
pub use http::HttpCatalogSource;

/// Why the catalog could not be retrieved
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse catalog: {0}")]
    Parse(String),
}

/// Source of raw lesson records
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Retrieve the whole collection in one call
    async fn fetch(&self) -> Result<Vec<Value>, CatalogError>;
}
