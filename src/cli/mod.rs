//! Command-line interface for kirtan.
//!
//! Fetches the lesson catalog and prints navigation, filtered pages and
//! lesson details; downloads lesson media.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{DownloadOutcome, Downloader, HttpCatalogSource};
use crate::config::{self, ResolvedConfig};
use crate::domain::{Resource, ResourceId};
use crate::library::{
    thumbnail, Catalog, CatalogState, CatalogStore, LevelFilter, Normalizer, QuerySession,
};
use crate::playback::format_time;

/// kirtan - Kirtan lesson catalog browser
#[derive(Parser, Debug)]
#[command(name = "kirtan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List navigable categories
    Nav,

    /// List lessons in a category
    List {
        /// Category key (e.g. "mridanga")
        category: String,

        /// Case-insensitive text to find in title or description
        #[arg(short, long, default_value = "")]
        search: String,

        /// Difficulty: all, beginner, intermediate, advanced
        #[arg(short, long, default_value = "all")]
        level: String,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show details of a lesson
    Show {
        /// Lesson ID
        id: String,
    },

    /// Download a lesson's media
    Download {
        /// Lesson ID
        id: String,

        /// Directory to save into (defaults to the configured download dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config,

    /// Format a number of seconds as a clock label
    Time {
        /// Seconds
        seconds: f64,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Nav => show_nav().await,
            Commands::List {
                category,
                search,
                level,
                page,
            } => list_lessons(&category, &search, &level, page).await,
            Commands::Show { id } => show_lesson(&id).await,
            Commands::Download { id, dir } => download_lesson(&id, dir).await,
            Commands::Config => show_config(),
            Commands::Time { seconds } => {
                println!("{}", format_time(seconds));
                Ok(())
            }
        }
    }
}

/// Fetch and normalize the catalog, or fail with the user-visible message
async fn load_catalog(cfg: &ResolvedConfig) -> Result<Arc<Catalog>> {
    let source = HttpCatalogSource::from_config(cfg);
    let mut store = CatalogStore::new(cfg.normalizer());

    match store.refresh(&source).await {
        CatalogState::Ready(catalog) => Ok(Arc::clone(catalog)),
        CatalogState::Failed { message } => anyhow::bail!("{}", message),
        CatalogState::Loading => anyhow::bail!("Catalog fetch already in progress"),
    }
}

fn find_lesson<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a Resource> {
    catalog
        .get(&ResourceId::new(id))
        .ok_or_else(|| anyhow::anyhow!("Lesson not found: {}", id))
}

/// Category key for a user-typed name ("Mritanga" -> "mridanga")
fn category_key(normalizer: &Normalizer, category: &str) -> String {
    normalizer.rewrites().canonicalize(category)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Print navigation entries
async fn show_nav() -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;

    for item in &catalog.nav {
        let count = catalog
            .resources
            .iter()
            .filter(|r| r.category == item.id)
            .count();
        if item.is_home() {
            println!("{}  {:<20}", item.icon, item.label);
        } else {
            println!("{}  {:<20} {} lessons", item.icon, item.label, count);
        }
    }

    Ok(())
}

/// Print one page of a category
async fn list_lessons(category: &str, search: &str, level: &str, page: usize) -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;

    let category = category_key(&cfg.normalizer(), category);
    let heading = catalog
        .nav_item(&category)
        .map(|n| n.label.clone())
        .unwrap_or_else(|| category.clone());

    let mut session = QuerySession::new(catalog, cfg.page_size);
    session.set_category(category);
    session.set_search(search);
    session.set_level(LevelFilter::parse(level));
    session.set_page(page);

    let result = session.current_page();

    println!("{} ({})", heading, session.level().label());
    if result.items.is_empty() {
        println!("No lessons found in this category.");
        return Ok(());
    }

    println!("{:<8} {:<40} {:<14} {:<14}", "ID", "TITLE", "INSTRUMENT", "LEVEL");
    println!("{}", "-".repeat(80));

    for resource in &result.items {
        let instrument = if resource.instrument.is_empty() {
            resource.category.as_str()
        } else {
            resource.instrument.as_str()
        };
        println!(
            "{:<8} {:<40} {:<14} {:<14}",
            resource.id.as_str(),
            truncate(&resource.title, 40),
            truncate(instrument, 14),
            resource.level.label()
        );
    }

    println!(
        "\nShowing {} items. Page {} of {}",
        result.total_items, result.page, result.total_pages
    );

    Ok(())
}

/// Print a lesson's details
async fn show_lesson(id: &str) -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;
    let resource = find_lesson(&catalog, id)?;

    println!("{}", "═".repeat(64));
    println!("  {} {}", resource.instrument_icon(), resource.title);
    println!("{}", "═".repeat(64));
    println!("  ID:          {}", resource.id);
    println!("  Instrument:  {}", resource.instrument);
    println!(
        "  Level:       {} ({})",
        resource.level.label(),
        resource.level.badge()
    );
    if let Some(raga_tala) = &resource.raga_tala {
        println!("  Raga/Tala:   {}", raga_tala);
    }
    println!("  Media:       {}", resource.media_kind());
    if resource.has_media() {
        println!("  URL:         {}", resource.reference_url);
    }
    println!("  Thumbnail:   {}", thumbnail::resolve(resource).url());

    if !resource.description.is_empty() {
        println!("\n{}", resource.description);
    }
    if let Some(mantra) = &resource.mantra {
        println!("\nMantra / Beat Swara:\n  {}", mantra);
    }

    Ok(())
}

/// Download a lesson's media
async fn download_lesson(id: &str, dir: Option<PathBuf>) -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;
    let resource = find_lesson(&catalog, id)?;

    let downloader = match dir {
        Some(dir) => Downloader::new(dir),
        None => cfg.downloader(),
    };

    let handle = downloader.spawn(
        resource.playback_url().to_string(),
        Some(resource.title.clone()).filter(|t| !t.is_empty()),
    );
    let outcome = handle.await.context("Download task failed")?;

    match outcome {
        DownloadOutcome::Saved(path) => println!("Saved to {}", path.display()),
        DownloadOutcome::OpenedDirect { reason } => {
            eprintln!("Download failed ({}); opened the link directly instead", reason)
        }
        DownloadOutcome::Abandoned { reason } => {
            eprintln!("Download failed ({}) and the link could not be opened", reason)
        }
        DownloadOutcome::Skipped => eprintln!("Lesson {} has no media to download", id),
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Catalog:");
    println!("  Endpoint: {}", cfg.catalog.endpoint);
    println!("  Timeout:  {}s", cfg.catalog.timeout_seconds);
    println!();
    println!("Query:");
    println!("  Page size: {}", cfg.page_size);
    println!();
    println!("Playback:");
    println!("  Default volume: {}", cfg.playback.volume);
    println!("  Autoplay:       {}", cfg.playback.autoplay);
    println!();
    println!("Downloads:");
    println!("  Directory: {}", cfg.download_dir.display());
    println!();
    println!("Category rewrites:");
    let normalizer = cfg.normalizer();
    println!("  {} entries (built-in + configured)", normalizer.rewrites().len());
    for (from, to) in &cfg.category_rewrites {
        println!("  {} -> {}", from, to);
    }

    Ok(())
}
