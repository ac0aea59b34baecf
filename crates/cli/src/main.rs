use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use clipwright_core::llm::infrastructure::provider_selector::{
    create_text_backend, media_backend_config, ProviderSources,
};
use clipwright_core::pipeline::parse_clip_request_use_case::ParseClipRequestUseCase;
use clipwright_core::pipeline::transcribe_video_use_case::{
    ProgressFn, TranscribeVideoUseCase, TranscriptionRequest,
};
use clipwright_core::shared::cancellation::CancellationToken;
use clipwright_core::shared::constants::BODY_EXCERPT_CHARS;
use clipwright_core::shared::diagnostics::{Diagnostics, LogDiagnostics, NullDiagnostics};
use clipwright_core::transcription::infrastructure::gemini_media_client::GeminiMediaClient;
use clipwright_core::video::domain::duration_probe::DurationProbe;
use clipwright_core::video::infrastructure::ffmpeg_duration_probe::FfmpegDurationProbe;

/// Natural-language video clipping and transcription backed by LLMs.
#[derive(Parser)]
#[command(name = "clipwright")]
struct Cli {
    #[command(flatten)]
    backends: BackendArgs,

    /// Log every backend request and response.
    #[arg(long, env = "DEBUG", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct BackendArgs {
    /// Self-hosted OpenAI-compatible server, e.g. http://localhost:11434.
    #[arg(long, env = "LOCAL_LLM_ENDPOINT", global = true)]
    local_endpoint: Option<String>,

    /// Model name sent to the self-hosted server.
    #[arg(long, env = "LOCAL_LLM_MODEL", global = true)]
    local_model: Option<String>,

    /// Azure OpenAI resource endpoint.
    #[arg(long, env = "AZURE_OPENAI_ENDPOINT", global = true)]
    azure_endpoint: Option<String>,

    #[arg(long, env = "AZURE_OPENAI_API_KEY", hide_env_values = true, global = true)]
    azure_api_key: Option<String>,

    /// Azure OpenAI deployment name.
    #[arg(long, env = "AZURE_OPENAI_MODEL", global = true)]
    azure_model: Option<String>,

    #[arg(long, env = "AZURE_OPENAI_API_VERSION", global = true)]
    azure_api_version: Option<String>,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    gemini_api_key: Option<String>,

    /// Gemini model used for transcription.
    #[arg(long, env = "GEMINI_MODEL", global = true)]
    gemini_model: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Find the segment of a video described in plain language.
    Clip {
        /// Input video file.
        input: PathBuf,

        /// What to clip, e.g. "the last thirty seconds".
        #[arg(required = true, num_args = 1..)]
        request: Vec<String>,

        /// Video length in seconds (probed from the file when omitted).
        #[arg(long)]
        duration: Option<f64>,

        /// Reject answers that are malformed or outside the video.
        #[arg(long)]
        strict: bool,
    },
    /// Transcribe the spoken content of a video.
    Transcribe {
        /// Input video file.
        input: PathBuf,

        /// Write the transcript here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Spoken language hint, e.g. "en" or "German".
        #[arg(long)]
        language: Option<String>,
    },
}

impl BackendArgs {
    fn provider_sources(&self) -> ProviderSources {
        ProviderSources {
            local_endpoint: self.local_endpoint.clone(),
            local_model: self.local_model.clone(),
            cloud_endpoint: self.azure_endpoint.clone(),
            cloud_api_key: self.azure_api_key.clone(),
            cloud_model: self.azure_model.clone(),
            cloud_api_version: self.azure_api_version.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let diagnostics: Arc<dyn Diagnostics> = if cli.debug {
        Arc::new(LogDiagnostics::new(BODY_EXCERPT_CHARS))
    } else {
        Arc::new(NullDiagnostics)
    };
    let cancel = CancellationToken::new();

    match cli.command {
        Command::Clip {
            input,
            request,
            duration,
            strict,
        } => run_clip(
            &input,
            &request.join(" "),
            duration,
            strict,
            &cli.backends,
            diagnostics,
            &cancel,
        ),
        Command::Transcribe {
            input,
            output,
            language,
        } => run_transcribe(
            &input,
            output.as_deref(),
            language,
            &cli.backends,
            diagnostics,
            &cancel,
        ),
    }
}

fn run_clip(
    input: &Path,
    request: &str,
    duration: Option<f64>,
    strict: bool,
    backends: &BackendArgs,
    diagnostics: Arc<dyn Diagnostics>,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let duration = match duration {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs,
        Some(secs) => return Err(format!("--duration must be positive, got {secs}").into()),
        None => FfmpegDurationProbe::new().duration_secs(input)?,
    };
    log::info!("{} is {duration:.1}s long", input.display());

    let (_config, client) = create_text_backend(&backends.provider_sources(), diagnostics)?;
    let use_case = ParseClipRequestUseCase::new(Box::new(client)).with_strict_bounds(strict);
    let range = use_case.execute(request, duration, cancel)?;

    println!("start_time: {}", range.start_time);
    println!("end_time: {}", range.end_time);
    Ok(())
}

fn run_transcribe(
    input: &Path,
    output: Option<&Path>,
    language: Option<String>,
    backends: &BackendArgs,
    diagnostics: Arc<dyn Diagnostics>,
    cancel: &CancellationToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = media_backend_config(
        backends.gemini_api_key.as_deref(),
        backends.gemini_model.as_deref(),
    )?;
    let backend = GeminiMediaClient::new(&config, diagnostics)?;

    let progress: ProgressFn = Box::new(|phase| eprintln!("{phase}..."));
    let use_case = TranscribeVideoUseCase::new(Box::new(backend), Some(progress));
    let request = TranscriptionRequest::new(input).with_language(language);
    let transcript = use_case.execute(&request, cancel)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", transcript.text))?;
            log::info!(
                "Transcript ({} words) written to {}",
                transcript.word_count(),
                path.display()
            );
        }
        None => println!("{}", transcript.text),
    }
    Ok(())
}
