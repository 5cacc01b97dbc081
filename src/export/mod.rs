//! Exporting transcripts to documents on disk.

mod docx;

pub use docx::{write_docx, DOC_HEADING};

use crate::transcribe::Transcript;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Fixed filename stem for exported documents inside a session directory
pub const EXPORT_STEM: &str = "transcript";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to build document: {0}")]
    Docx(String),
    #[error("Failed to serialize transcript: {0}")]
    Json(#[from] serde_json::Error),
}

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Word document with a heading and the transcript paragraph
    Docx,
    /// Plain text with per-segment timestamps
    Text,
    /// Pretty-printed JSON with metadata and segments
    Json,
}

impl ExportFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}

/// Write `transcript` into `dir` as `transcript.<ext>`, overwriting any
/// prior export of the same format.
pub fn export_transcript(
    transcript: &Transcript,
    dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{}.{}", EXPORT_STEM, format.extension()));

    match format {
        ExportFormat::Docx => write_docx(&transcript.full_text(), &path)?,
        ExportFormat::Text => std::fs::write(&path, transcript.to_text())?,
        ExportFormat::Json => std::fs::write(&path, transcript.to_json_pretty()?)?,
    }

    info!(path = %path.display(), "exported transcript");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::TranscriptSegment;

    fn sample() -> Transcript {
        let mut t = Transcript::new("clip.wav".to_string(), 3.0);
        t.add_segment(TranscriptSegment {
            start: 0.0,
            end: 3.0,
            text: "hello world".to_string(),
        });
        t
    }

    #[test]
    fn test_export_uses_fixed_stem() {
        let dir = tempfile::tempdir().unwrap();
        let t = sample();

        let docx = export_transcript(&t, dir.path(), ExportFormat::Docx).unwrap();
        let text = export_transcript(&t, dir.path(), ExportFormat::Text).unwrap();
        let json = export_transcript(&t, dir.path(), ExportFormat::Json).unwrap();

        assert_eq!(docx.file_name().unwrap(), "transcript.docx");
        assert_eq!(text.file_name().unwrap(), "transcript.txt");
        assert_eq!(json.file_name().unwrap(), "transcript.json");
        assert!(docx.exists() && text.exists() && json.exists());
    }

    #[test]
    fn test_text_export_contains_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_transcript(&sample(), dir.path(), ExportFormat::Text).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("hello world"));
    }

    #[test]
    fn test_json_export_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_transcript(&sample(), dir.path(), ExportFormat::Json).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let back: Transcript = serde_json::from_str(&content).unwrap();
        assert_eq!(back.full_text(), "hello world");
    }
}
