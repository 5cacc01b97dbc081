//! Speech-to-text: audio decoding, model management, and Whisper inference.

mod audio;
mod model;
mod transcript;
mod whisper;

pub use audio::{load_audio, AudioError, WHISPER_SAMPLE_RATE};
pub use model::{download_model, is_model_downloaded, model_path, WhisperModel};
pub use transcript::{Transcript, TranscriptMetadata, TranscriptSegment};
pub use whisper::{TranscribeOptions, Transcriber};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhisperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to download model: {0}")]
    Download(String),
    #[error("Failed to initialize Whisper: {0}")]
    Init(String),
    #[error("Transcription failed: {0}")]
    Transcription(String),
    #[error("Model produced an empty transcript")]
    EmptyTranscript,
}

/// Raw result of one inference pass, before transcript metadata is attached
#[derive(Debug, Clone)]
pub struct Transcription {
    pub segments: Vec<TranscriptSegment>,
    /// Language the model detected (or was told)
    pub language: Option<String>,
    pub processing_time_secs: f64,
}

/// Seam over the speech engine so the pipeline can run against a stub in tests.
pub trait SpeechToText {
    /// Transcribe 16 kHz mono f32 samples in one blocking call.
    fn transcribe(&self, samples: &[f32]) -> Result<Transcription, WhisperError>;
}
