use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod acquire;
mod analyze;
mod export;
mod pipeline;
mod transcribe;

use export::ExportFormat;
use pipeline::{MediaSource, PipelineRequest};
use transcribe::WhisperModel;

#[derive(Parser, Debug)]
#[command(
    name = "audioscribe",
    about = "Transcribe local or remote audio with Whisper",
    version
)]
struct Cli {
    #[command(subcommand)]
    source: SourceCommand,

    /// Whisper model size (tiny|base|small|medium|large)
    #[arg(long, global = true, default_value = "tiny")]
    model: WhisperModel,

    /// Language spoken in the audio; auto-detected when omitted
    #[arg(long, global = true)]
    language: Option<String>,

    /// Translate the speech to English
    #[arg(long, global = true)]
    translate: bool,

    /// Show the most frequent words of the transcript
    #[arg(long, global = true)]
    word_freq: bool,

    /// How many words the frequency table holds
    #[arg(long, global = true, default_value_t = analyze::DEFAULT_TOP_N)]
    top: usize,

    /// Document format(s) to export (repeatable)
    #[arg(long = "format", global = true, value_enum, default_values = ["docx"])]
    formats: Vec<ExportFormat>,

    /// Scratch directory for staged audio and exports
    #[arg(long, global = true, env = "AUDIOSCRIBE_WORK_DIR", default_value = "scratch")]
    work_dir: PathBuf,

    /// Directory holding downloaded Whisper models
    #[arg(long, global = true, env = "AUDIOSCRIBE_MODEL_DIR", default_value = "models")]
    models_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum SourceCommand {
    /// Transcribe a local audio file (mp3/wav/m4a/...)
    File {
        /// Path to the audio file
        path: PathBuf,
    },
    /// Download the audio of a video URL and transcribe it
    Url {
        /// Video or audio page URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let source = match &cli.source {
        SourceCommand::File { path } => MediaSource::LocalFile(path.clone()),
        SourceCommand::Url { url } => MediaSource::RemoteUrl(url.clone()),
    };

    let request = PipelineRequest {
        source,
        model: cli.model,
        language: cli.language,
        translate: cli.translate,
        word_freq: cli.word_freq.then_some(cli.top),
        formats: cli.formats,
        work_dir: cli.work_dir,
        models_dir: cli.models_dir,
    };

    let output = pipeline::run(request).await?;

    println!("{}", output.transcript.full_text());

    if let Some(freq) = &output.word_frequency {
        println!("\nMost frequent words:");
        for entry in freq {
            println!("{:>6}  {}", entry.count, entry.word);
        }
    }

    println!();
    for path in &output.exported {
        println!("saved {}", path.display());
    }

    info!(
        session = output.session_id,
        elapsed_secs = output.processing_time_secs,
        "done"
    );

    Ok(())
}
