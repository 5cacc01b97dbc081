//! Whisper model files: naming, lookup, and download from Hugging Face.

use super::WhisperError;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Available Whisper model sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperModel {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl WhisperModel {
    /// Get the Hugging Face URL for this model
    pub fn hf_url(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin",
            WhisperModel::Base => "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin",
            WhisperModel::Small => "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin",
            WhisperModel::Medium => "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-medium.bin",
            WhisperModel::Large => "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin",
        }
    }

    /// Get the filename for this model
    pub fn filename(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "ggml-tiny.bin",
            WhisperModel::Base => "ggml-base.bin",
            WhisperModel::Small => "ggml-small.bin",
            WhisperModel::Medium => "ggml-medium.bin",
            WhisperModel::Large => "ggml-large-v3.bin",
        }
    }

    /// Get approximate model size in MB
    pub fn size_mb(&self) -> u64 {
        match self {
            WhisperModel::Tiny => 75,
            WhisperModel::Base => 142,
            WhisperModel::Small => 466,
            WhisperModel::Medium => 1500,
            WhisperModel::Large => 3100,
        }
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WhisperModel::Tiny => write!(f, "tiny"),
            WhisperModel::Base => write!(f, "base"),
            WhisperModel::Small => write!(f, "small"),
            WhisperModel::Medium => write!(f, "medium"),
            WhisperModel::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for WhisperModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(WhisperModel::Tiny),
            "base" => Ok(WhisperModel::Base),
            "small" => Ok(WhisperModel::Small),
            "medium" => Ok(WhisperModel::Medium),
            "large" => Ok(WhisperModel::Large),
            _ => Err(format!(
                "Unknown model: {}. Use tiny, base, small, medium, or large",
                s
            )),
        }
    }
}

/// Get the path to a specific model file under `models_dir`
pub fn model_path(model: WhisperModel, models_dir: &Path) -> PathBuf {
    models_dir.join(model.filename())
}

/// Check if a model is already downloaded
pub fn is_model_downloaded(model: WhisperModel, models_dir: &Path) -> bool {
    let path = model_path(model, models_dir);
    if !path.exists() {
        return false;
    }

    // Check if file size is reasonable (at least 50% of expected)
    if let Ok(metadata) = fs::metadata(&path) {
        let expected_bytes = model.size_mb() * 1024 * 1024;
        return metadata.len() >= expected_bytes / 2;
    }

    false
}

/// Download a Whisper model from Hugging Face into `models_dir`.
///
/// Already-downloaded models are reused. The file is written to a `.tmp`
/// sidecar and renamed on completion, so an interrupted download never
/// leaves a truncated model behind.
pub fn download_model(model: WhisperModel, models_dir: &Path) -> Result<PathBuf, WhisperError> {
    let path = model_path(model, models_dir);

    if is_model_downloaded(model, models_dir) {
        info!("Model {} already downloaded at {:?}", model, path);
        return Ok(path);
    }

    fs::create_dir_all(models_dir)?;

    info!(
        "Downloading Whisper {} model (~{}MB)...",
        model,
        model.size_mb()
    );

    let url = model.hf_url();

    let mut response = reqwest::blocking::Client::new()
        .get(url)
        .send()
        .map_err(|e| WhisperError::Download(format!("HTTP request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(WhisperError::Download(format!(
            "HTTP {} from {}",
            response.status(),
            url
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = indicatif::ProgressBar::new(total_size);
    pb.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let temp_path = path.with_extension("bin.tmp");
    let mut file = File::create(&temp_path)?;
    let mut downloaded: u64 = 0;
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = response
            .read(&mut buf)
            .map_err(|e| WhisperError::Download(format!("Failed to read response: {}", e)))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        downloaded += n as u64;
        pb.set_position(downloaded);
    }

    pb.finish_with_message("Download complete");

    fs::rename(&temp_path, &path)?;

    info!("Model downloaded to {:?}", path);

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_parsing() {
        assert_eq!("tiny".parse::<WhisperModel>().unwrap(), WhisperModel::Tiny);
        assert_eq!("SMALL".parse::<WhisperModel>().unwrap(), WhisperModel::Small);
        assert!("invalid".parse::<WhisperModel>().is_err());
    }

    #[test]
    fn test_model_paths() {
        let dir = Path::new("models");
        assert!(model_path(WhisperModel::Tiny, dir)
            .to_str()
            .unwrap()
            .contains("ggml-tiny.bin"));
    }

    #[test]
    fn test_missing_model_not_reported_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_model_downloaded(WhisperModel::Tiny, dir.path()));
    }

    #[test]
    fn test_undersized_model_not_reported_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = model_path(WhisperModel::Tiny, dir.path());
        fs::write(&path, b"too small to be a model").unwrap();
        assert!(!is_model_downloaded(WhisperModel::Tiny, dir.path()));
    }
}
