//! Media downloads.
//!
//! Fetches the full payload and writes it to the download directory. If
//! anything goes wrong the raw URL is handed to the system opener instead.
//! No retries. Callers that must not wait use `Downloader::spawn`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// File name used when the lesson has no title
pub const DEFAULT_FILENAME: &str = "kirtan-lesson.m4a";

/// Extension appended to title-based file names
pub const FILE_EXTENSION: &str = "m4a";

/// Download failures (all recovered locally)
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server returned HTTP {0}")]
    Status(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not open link: {0}")]
    Open(String),
}

/// What happened to a download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Payload written to this path
    Saved(PathBuf),

    /// Retrieval failed; the raw URL was handed to the opener
    OpenedDirect { reason: String },

    /// Retrieval failed and the opener failed too
    Abandoned { reason: String },

    /// Nothing to download (empty URL)
    Skipped,
}

/// Opens a URL outside the application (browser, OS handler)
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), DownloadError>;
}

/// Opens links with the platform's default handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), DownloadError> {
        let mut command = if cfg!(target_os = "macos") {
            std::process::Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut c = std::process::Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            std::process::Command::new("xdg-open")
        };

        command.arg(url);
        launch(command).map(|_| ())
    }
}

/// Start `command` and reap it on a background thread so the handler
/// does not linger as a zombie. The handle yields the exit status.
fn launch(
    mut command: std::process::Command,
) -> Result<std::thread::JoinHandle<Option<std::process::ExitStatus>>, DownloadError> {
    let mut child = command
        .spawn()
        .map_err(|e| DownloadError::Open(e.to_string()))?;

    Ok(std::thread::spawn(move || match child.wait() {
        Ok(status) => Some(status),
        Err(e) => {
            warn!("Failed to wait on link opener: {}", e);
            None
        }
    }))
}

/// Derive the saved file name from an optional lesson title
pub fn filename_for(title: Option<&str>) -> String {
    let Some(title) = title else {
        return DEFAULT_FILENAME.to_string();
    };

    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.');

    if cleaned.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        format!("{}.{}", cleaned, FILE_EXTENSION)
    }
}

/// Downloads media into a directory
#[derive(Clone)]
pub struct Downloader {
    /// Target directory
    dir: PathBuf,
    /// HTTP client
    client: reqwest::Client,
    /// Fallback for failed retrievals
    opener: Arc<dyn LinkOpener>,
}

impl Downloader {
    /// Create a downloader that falls back to the system opener
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_opener(dir, Arc::new(SystemOpener))
    }

    /// Create a downloader with a custom fallback opener
    pub fn with_opener(dir: impl Into<PathBuf>, opener: Arc<dyn LinkOpener>) -> Self {
        Self {
            dir: dir.into(),
            client: reqwest::Client::new(),
            opener,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Download `url`, falling back to opening it directly. Never fails.
    pub async fn download(&self, url: &str, title: Option<&str>) -> DownloadOutcome {
        if url.trim().is_empty() {
            return DownloadOutcome::Skipped;
        }

        let target = self.dir.join(filename_for(title));

        match self.fetch_to_file(url, &target).await {
            Ok(()) => {
                info!(path = %target.display(), "Download saved");
                DownloadOutcome::Saved(target)
            }
            Err(e) => {
                warn!(%url, "Download failed, opening link directly: {}", e);
                let reason = e.to_string();
                match self.opener.open(url) {
                    Ok(()) => DownloadOutcome::OpenedDirect { reason },
                    Err(open_err) => {
                        warn!(%url, "Could not open link: {}", open_err);
                        DownloadOutcome::Abandoned { reason }
                    }
                }
            }
        }
    }

    /// Run a download in the background
    pub fn spawn(&self, url: String, title: Option<String>) -> JoinHandle<DownloadOutcome> {
        let downloader = self.clone();
        tokio::spawn(async move { downloader.download(&url, title.as_deref()).await })
    }

    /// Stream the response body to `<target>.part`, then rename into place
    async fn fetch_to_file(&self, url: &str, target: &Path) -> Result<(), DownloadError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }

        fs::create_dir_all(&self.dir).await?;

        let partial = target.with_extension("part");
        let result = async {
            let mut file = fs::File::create(&partial).await?;
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| DownloadError::Http(e.to_string()))?
            {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            fs::rename(&partial, target).await?;
            Ok::<(), DownloadError>(())
        }
        .await;

        if result.is_err() {
            let _ = fs::remove_file(&partial).await;
        }
        result
    }
}
