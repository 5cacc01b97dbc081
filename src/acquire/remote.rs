//! Remote acquisition by shelling out to yt-dlp.

use super::AcquireError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

/// External downloader binary; protocol handling stays its problem.
pub const DOWNLOADER_BIN: &str = "yt-dlp";

/// Extensions the downloader is expected to leave behind.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "opus", "ogg", "webm", "flac", "aac"];

/// Download the best available audio for `url` into `dest_dir`.
///
/// Returns the path of the produced file. Any downloader failure surfaces
/// its stderr; there is no retry.
pub async fn fetch_remote(url: &str, dest_dir: &Path) -> Result<PathBuf, AcquireError> {
    if !supported_scheme(url) {
        return Err(AcquireError::UnsupportedScheme(url.to_string()));
    }

    let template = dest_dir.join("source.%(ext)s");

    info!(url, dest = %dest_dir.display(), "fetching remote audio via {}", DOWNLOADER_BIN);

    let output = Command::new(DOWNLOADER_BIN)
        .arg("--no-playlist")
        .arg("-f")
        .arg("bestaudio/best")
        .arg("-x")
        .arg("-o")
        .arg(&template)
        .arg("--print")
        .arg("after_move:filepath")
        .arg("--no-simulate")
        .arg("-q")
        .arg(url)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AcquireError::DownloaderMissing
            } else {
                AcquireError::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AcquireError::DownloadFailed(stderr.trim().to_string()));
    }

    // yt-dlp prints the final path of the extracted audio file
    let printed = String::from_utf8_lossy(&output.stdout);
    if let Some(line) = printed.lines().rev().find(|l| !l.trim().is_empty()) {
        let path = PathBuf::from(line.trim());
        if path.is_file() {
            info!(path = %path.display(), "download complete");
            return Ok(path);
        }
        warn!(reported = %path.display(), "downloader-reported path missing, scanning dir");
    }

    find_downloaded_audio(dest_dir)
        .ok_or_else(|| AcquireError::NothingDownloaded(dest_dir.to_path_buf()))
}

fn find_downloaded_audio(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| {
            p.file_stem().and_then(|s| s.to_str()) == Some("source")
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
}

/// Scheme comparison is case-insensitive per RFC 3986.
fn supported_scheme(url: &str) -> bool {
    let scheme = url
        .split("://")
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    scheme == "http" || scheme == "https"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_http_schemes() {
        let dir = tempfile::tempdir().unwrap();
        let err = fetch_remote("ftp://example.com/a.mp3", dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquireError::UnsupportedScheme(_)));

        let err = fetch_remote("not a url", dir.path()).await.unwrap_err();
        assert!(matches!(err, AcquireError::UnsupportedScheme(_)));
    }

    #[test]
    fn test_scheme_check_is_case_insensitive() {
        assert!(supported_scheme("https://example.com/v"));
        assert!(supported_scheme("HTTPS://example.com/v"));
        assert!(supported_scheme("Http://example.com/v"));
        assert!(!supported_scheme("ftp://example.com/v"));
        assert!(!supported_scheme("no scheme"));
    }

    #[test]
    fn test_find_downloaded_audio_matches_stem_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("source.description"), b"x").unwrap();
        std::fs::write(dir.path().join("other.mp3"), b"x").unwrap();
        assert!(find_downloaded_audio(dir.path()).is_none());

        std::fs::write(dir.path().join("source.m4a"), b"x").unwrap();
        let found = find_downloaded_audio(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "source.m4a");
    }
}
