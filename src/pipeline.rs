//! Pipeline orchestration: acquire, decode, transcribe, analyze, export.

use crate::acquire::Session;
use crate::analyze::{word_frequency, WordCount};
use crate::export::{export_transcript, ExportFormat};
use crate::transcribe::{
    download_model, load_audio, SpeechToText, TranscribeOptions, Transcriber, Transcript,
    WhisperModel, WHISPER_SAMPLE_RATE,
};
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Where the audio comes from
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// A file already on local disk ("upload" case)
    LocalFile(PathBuf),
    /// A remote video/audio URL resolved through the external downloader
    RemoteUrl(String),
}

impl MediaSource {
    fn label(&self) -> String {
        match self {
            MediaSource::LocalFile(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            MediaSource::RemoteUrl(u) => u.clone(),
        }
    }
}

/// One pipeline run, fully specified.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub source: MediaSource,
    pub model: WhisperModel,
    pub language: Option<String>,
    pub translate: bool,
    /// Compute a top-N word frequency table (None = skip)
    pub word_freq: Option<usize>,
    pub formats: Vec<ExportFormat>,
    pub work_dir: PathBuf,
    pub models_dir: PathBuf,
}

/// Everything a front end needs to render the result.
#[derive(Debug)]
pub struct PipelineOutput {
    pub session_id: String,
    pub audio_path: PathBuf,
    pub transcript: Transcript,
    pub word_frequency: Option<Vec<WordCount>>,
    pub exported: Vec<PathBuf>,
    pub processing_time_secs: f64,
}

/// Run the whole pipeline with a real Whisper engine.
pub async fn run(request: PipelineRequest) -> Result<PipelineOutput> {
    let started = Instant::now();

    let session =
        Session::create(&request.work_dir).context("failed to create session directory")?;

    let audio_path = match &request.source {
        MediaSource::LocalFile(path) => session
            .stage_local(path)
            .context("failed to stage local audio file")?,
        MediaSource::RemoteUrl(url) => session
            .fetch_remote(url)
            .await
            .context("failed to download remote audio")?,
    };

    let model_path = ensure_model(request.model, request.models_dir.clone()).await?;

    let options = TranscribeOptions {
        language: request.language.clone(),
        translate: request.translate,
    };
    let engine =
        tokio::task::spawn_blocking(move || Transcriber::from_model_file(&model_path, options))
            .await
            .context("model load task failed")?
            .context("failed to load the Whisper model")?;

    // Decoding and inference are CPU-bound; keep them off the runtime workers
    tokio::task::spawn_blocking(move || finish(session, audio_path, &engine, &request, started))
        .await
        .context("transcription task failed")?
}

/// Resolve the model file off the async runtime.
///
/// The download uses a blocking HTTP client, which aborts the process when
/// driven from a runtime worker thread.
async fn ensure_model(model: WhisperModel, models_dir: PathBuf) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || download_model(model, &models_dir))
        .await
        .context("model download task failed")?
        .context("failed to download the Whisper model")
}

/// Decode, transcribe, analyze and export a staged audio file.
///
/// Split out from [run] so tests can drive the pipeline with a stub engine.
fn finish<E: SpeechToText>(
    session: Session,
    audio_path: PathBuf,
    engine: &E,
    request: &PipelineRequest,
    started: Instant,
) -> Result<PipelineOutput> {
    let samples = load_audio(&audio_path).context("failed to decode audio")?;
    let duration_secs = samples.len() as f64 / WHISPER_SAMPLE_RATE as f64;

    let result = engine.transcribe(&samples).context("transcription failed")?;

    let mut transcript = Transcript::new(request.source.label(), duration_secs);
    transcript.metadata.model = Some(request.model.to_string());
    transcript.metadata.language = result.language.clone().or_else(|| request.language.clone());
    transcript.metadata.translated = request.translate;
    transcript.segments = result.segments;

    let word_frequency_table = request
        .word_freq
        .map(|n| word_frequency(&transcript.full_text(), n));

    let mut exported = Vec::with_capacity(request.formats.len());
    for format in &request.formats {
        let path = export_transcript(&transcript, session.dir(), *format)
            .with_context(|| format!("failed to export {} document", format.extension()))?;
        exported.push(path);
    }

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        session = session.id(),
        secs = elapsed,
        transcribe_secs = result.processing_time_secs,
        segments = transcript.segments.len(),
        "pipeline run complete"
    );

    Ok(PipelineOutput {
        session_id: session.id().to_string(),
        audio_path,
        transcript,
        word_frequency: word_frequency_table,
        exported,
        processing_time_secs: elapsed,
    })
}
