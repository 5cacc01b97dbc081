//! Media acquisition: staging local uploads and fetching remote audio.
//!
//! Every run gets its own timestamped scratch directory so concurrent runs
//! never collide on filenames.

mod remote;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::info;

/// Disambiguates sessions created within the same millisecond
static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Input file has no usable filename: {}", .0.display())]
    BadFilename(PathBuf),
    #[error("Unsupported URL scheme, expected http or https: {0}")]
    UnsupportedScheme(String),
    #[error("yt-dlp not found on PATH; install it to transcribe remote URLs")]
    DownloaderMissing,
    #[error("yt-dlp failed: {0}")]
    DownloadFailed(String),
    #[error("Download produced no audio file in {}", .0.display())]
    NothingDownloaded(PathBuf),
}

/// Per-run scratch namespace on disk.
///
/// Holds the staged source audio and, later, the exported documents.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    dir: PathBuf,
}

impl Session {
    /// Create a fresh session directory under `work_dir`.
    pub fn create(work_dir: &Path) -> Result<Self, AcquireError> {
        let seq = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        let id = format!(
            "{}_{:03}",
            chrono::Utc::now().format("%Y%m%d_%H%M%S_%3f"),
            seq
        );
        let dir = work_dir.join(&id);
        fs::create_dir_all(&dir)?;
        info!(session = %id, dir = %dir.display(), "session created");
        Ok(Self { id, dir })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy a local audio file into the session directory.
    ///
    /// Returns the staged path; the staged bytes equal the source bytes.
    pub fn stage_local(&self, source: &Path) -> Result<PathBuf, AcquireError> {
        if !source.is_file() {
            return Err(AcquireError::SourceNotFound(source.to_path_buf()));
        }
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AcquireError::BadFilename(source.to_path_buf()))?;
        let bytes = fs::read(source)?;
        let dest = self.stage_bytes(name, &bytes)?;
        info!(from = %source.display(), to = %dest.display(), "staged local file");
        Ok(dest)
    }

    /// Write raw uploaded bytes into the session directory under `name`.
    pub fn stage_bytes(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, AcquireError> {
        let dest = self.dir.join(sanitize_filename(name));
        fs::write(&dest, bytes)?;
        info!(to = %dest.display(), len = bytes.len(), "staged uploaded bytes");
        Ok(dest)
    }

    /// Download the audio track of a remote URL into the session directory.
    pub async fn fetch_remote(&self, url: &str) -> Result<PathBuf, AcquireError> {
        remote::fetch_remote(url, &self.dir).await
    }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | '"' | '\n' | '\r' | '\t' | '<' | '>' | '|' | ':' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect()
}
