//! Configuration for the kirtan catalog client.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (KIRTAN_API_URL, KIRTAN_DOWNLOAD_DIR, KIRTAN_PAGE_SIZE)
//! 2. Config file (.kirtan/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .kirtan/config.yaml
//! - `downloads.dir` is relative to the config file's project root

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::http::DEFAULT_ENDPOINT;
use crate::adapters::Downloader;
use crate::library::query::DEFAULT_PAGE_SIZE;
use crate::library::{CategoryRewrites, Normalizer};
use crate::playback::{PlaybackSettings, DEFAULT_VOLUME};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const ENV_API_URL: &str = "KIRTAN_API_URL";
pub const ENV_DOWNLOAD_DIR: &str = "KIRTAN_DOWNLOAD_DIR";
pub const ENV_PAGE_SIZE: &str = "KIRTAN_PAGE_SIZE";

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub query: Option<QueryConfig>,
    #[serde(default)]
    pub playback: Option<PlaybackConfig>,
    #[serde(default)]
    pub normalize: NormalizeConfig,
    #[serde(default)]
    pub downloads: Option<DownloadsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    pub default_volume: Option<f64>,
    pub autoplay: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NormalizeConfig {
    /// Extra category corrections (misspelling -> canonical key)
    #[serde(default)]
    pub category_rewrites: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadsConfig {
    pub dir: Option<String>,
}

/// Remote catalog settings
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub catalog: CatalogSettings,
    /// Rows per page in list views
    pub page_size: usize,
    pub playback: PlaybackSettings,
    /// Category corrections merged over the built-in table
    pub category_rewrites: HashMap<String, String>,
    /// Absolute path downloads are written to
    pub download_dir: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Normalizer with the built-in and configured rewrites
    pub fn normalizer(&self) -> Normalizer {
        let mut rewrites = CategoryRewrites::default();
        rewrites.extend(&self.category_rewrites);
        Normalizer::new(rewrites)
    }

    /// Downloader writing into the configured directory
    pub fn downloader(&self) -> Downloader {
        Downloader::new(&self.download_dir)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".kirtan").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn parse_config(content: &str) -> Result<ConfigFile> {
    // An empty file deserializes to unit, not a mapping
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Merge file values, environment and defaults
fn resolve(
    file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let (config_file, file) = match file {
        Some((path, parsed)) => (Some(path), parsed),
        None => (None, ConfigFile::default()),
    };

    // Project root is the parent of .kirtan/
    let base_dir = config_file
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."));

    let catalog = CatalogSettings {
        endpoint: env(ENV_API_URL)
            .or_else(|| file.catalog.as_ref().and_then(|c| c.endpoint.clone()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        timeout_seconds: file
            .catalog
            .as_ref()
            .and_then(|c| c.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
    };

    let page_size = match env(ENV_PAGE_SIZE) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("Invalid {}: {}", ENV_PAGE_SIZE, raw))?,
        None => file
            .query
            .as_ref()
            .and_then(|q| q.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE),
    };
    if page_size == 0 {
        anyhow::bail!("Page size must be at least 1");
    }

    let playback = PlaybackSettings {
        volume: file
            .playback
            .as_ref()
            .and_then(|p| p.default_volume)
            .unwrap_or(DEFAULT_VOLUME),
        autoplay: file
            .playback
            .as_ref()
            .and_then(|p| p.autoplay)
            .unwrap_or(true),
    };

    let download_dir = if let Some(dir) = env(ENV_DOWNLOAD_DIR) {
        PathBuf::from(dir)
    } else if let Some(dir) = file.downloads.as_ref().and_then(|d| d.dir.as_deref()) {
        resolve_path(base_dir, dir)
    } else {
        default_download_dir()
    };

    Ok(ResolvedConfig {
        catalog,
        page_size,
        playback,
        category_rewrites: file.normalize.category_rewrites,
        download_dir,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let file = match find_config_file() {
        Some(path) => {
            let parsed = load_config_file(&path)?;
            Some((path, parsed))
        }
        None => None,
    };

    resolve(file, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
