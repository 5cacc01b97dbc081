//! Whisper.cpp integration via whisper-rs.

use super::transcript::TranscriptSegment;
use super::{SpeechToText, Transcription, WhisperError};
use std::path::Path;
use tracing::info;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Language and task configuration for a transcription run
#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    /// Language hint (None = auto-detect)
    pub language: Option<String>,
    /// Translate the speech to English instead of transcribing verbatim
    pub translate: bool,
}

/// Whisper transcriber; loads the model once and runs blocking inference.
pub struct Transcriber {
    ctx: WhisperContext,
    options: TranscribeOptions,
    n_threads: i32,
}

impl Transcriber {
    /// Load a transcriber from an already-present ggml model file.
    pub fn from_model_file(path: &Path, options: TranscribeOptions) -> Result<Self, WhisperError> {
        info!("Loading Whisper model from {:?}...", path);

        let path_str = path
            .to_str()
            .ok_or_else(|| WhisperError::Init(format!("non-UTF-8 model path: {:?}", path)))?;
        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| WhisperError::Init(format!("Failed to load model: {}", e)))?;

        // Use available CPU threads (leave 1 for system)
        let n_threads = std::thread::available_parallelism()
            .map(|p| (p.get() as i32 - 1).max(1))
            .unwrap_or(4);

        info!("Whisper model loaded (using {} threads)", n_threads);

        Ok(Self {
            ctx,
            options,
            n_threads,
        })
    }
}

impl SpeechToText for Transcriber {
    /// Run a single blocking inference pass over 16 kHz mono samples.
    fn transcribe(&self, samples: &[f32]) -> Result<Transcription, WhisperError> {
        let start_time = std::time::Instant::now();
        let audio_secs = samples.len() as f32 / super::WHISPER_SAMPLE_RATE as f32;

        info!("Transcribing {:.2}s of audio", audio_secs);

        // Greedy sampling: beam search is 2-3x slower for marginal gains here
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.n_threads);
        params.set_translate(self.options.translate);
        match &self.options.language {
            Some(lang) => params.set_language(Some(lang.as_str())),
            None => params.set_language(Some("auto")),
        }

        // Segment-level timestamps are enough
        params.set_token_timestamps(false);
        // Don't carry context between windows; prevents hallucination propagation
        params.set_no_context(true);
        params.set_suppress_non_speech_tokens(true);

        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_print_special(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| WhisperError::Transcription(format!("Failed to create state: {}", e)))?;

        state
            .full(params, samples)
            .map_err(|e| WhisperError::Transcription(format!("Inference failed: {}", e)))?;

        let num_segments = state
            .full_n_segments()
            .map_err(|e| WhisperError::Transcription(format!("Failed to get segments: {}", e)))?;

        let mut segments = Vec::new();
        for i in 0..num_segments {
            let start_ts = state.full_get_segment_t0(i).map_err(|e| {
                WhisperError::Transcription(format!("Failed to get start time: {}", e))
            })?;
            let end_ts = state.full_get_segment_t1(i).map_err(|e| {
                WhisperError::Transcription(format!("Failed to get end time: {}", e))
            })?;
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| WhisperError::Transcription(format!("Failed to get text: {}", e)))?;

            let text = text.trim().to_string();
            if text.is_empty() {
                continue;
            }

            // Timestamps are in centiseconds
            segments.push(TranscriptSegment {
                start: start_ts as f64 / 100.0,
                end: end_ts as f64 / 100.0,
                text,
            });
        }

        if segments.is_empty() {
            return Err(WhisperError::EmptyTranscript);
        }

        let language = state
            .full_lang_id_from_state()
            .ok()
            .and_then(|id| whisper_rs::get_lang_str(id).map(|s| s.to_string()));

        let elapsed = start_time.elapsed();
        info!(
            "Transcribed {:.1}s of audio in {:.1}s ({:.1}x realtime): {} segments",
            audio_secs,
            elapsed.as_secs_f32(),
            audio_secs / elapsed.as_secs_f32(),
            segments.len()
        );

        Ok(Transcription {
            segments,
            language,
            processing_time_secs: elapsed.as_secs_f64(),
        })
    }
}
