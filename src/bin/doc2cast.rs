//! CLI binary for doc2cast.
//!
//! `doc2cast serve` runs the HTTP service; `doc2cast convert` runs one
//! conversion locally and prints the JSON response. Both map CLI flags
//! (with environment fallbacks) onto `ServiceConfig`.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use doc2cast::{ConversionRequest, ConvertResponse, Converter, ServiceConfig, UploadedFile};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the HTTP service on port 3000
  doc2cast serve

  # Summarize a PDF (default mode)
  doc2cast convert lecture.pdf

  # Narrate a slide deck exported to PDF, also write a .docx
  doc2cast convert slides.pdf --mode "produce a podcast script" --document

  # Free-text mode on pasted text
  doc2cast convert --text "Ownership rules in Rust..." --mode "explain like I'm five"

MODES:
  summarize concisely (default)   structure for comprehension
  turn into a story               produce a podcast script
  describe as an image            <anything else: used as an instruction prefix>

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI key (speech, images, and completions by default)
  ANTHROPIC_API_KEY       Anthropic key for completions
  EDGEQUAKE_LLM_PROVIDER  Override completion provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override completion model ID
  PORT                    Listen port for `serve`
  RUST_LOG                Log filter (overrides --verbose / --quiet)

  A `.env` file in the working directory is loaded on startup.
"#;

/// Turn text and PDF/Word documents into summaries, stories and podcasts.
#[derive(Parser, Debug)]
#[command(
    name = "doc2cast",
    version,
    about = "Turn text and PDF/Word documents into summaries, stories and podcasts",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    service: ServiceArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DOC2CAST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DOC2CAST_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Socket address to bind (overrides --port).
        #[arg(long, env = "DOC2CAST_BIND")]
        bind: Option<String>,

        /// Port to listen on, all interfaces.
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },

    /// Convert one document or text and print the JSON response.
    Convert {
        /// Local PDF or Word file.
        input: Option<PathBuf>,

        /// Pasted text instead of a file.
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,

        /// Conversion mode label.
        #[arg(short, long)]
        mode: Option<String>,

        /// Also write a .docx of the result.
        #[arg(long)]
        document: bool,
    },
}

/// Settings shared by both subcommands.
#[derive(Args, Debug)]
struct ServiceArgs {
    /// Completion model ID (default: gpt-3.5-turbo).
    #[arg(long, global = true, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Completion provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, global = true, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// OpenAI key for speech and image generation.
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible speech/image API.
    #[arg(long, global = true, env = "DOC2CAST_OPENAI_BASE_URL")]
    openai_base_url: Option<String>,

    /// Speech voice.
    #[arg(long, global = true, env = "DOC2CAST_VOICE")]
    voice: Option<String>,

    /// Mode used when a request does not name one.
    #[arg(long, global = true, env = "DOC2CAST_DEFAULT_MODE")]
    default_mode: Option<String>,

    /// Directory for generated audio.
    #[arg(long, global = true, env = "DOC2CAST_AUDIO_DIR")]
    audio_dir: Option<PathBuf>,

    /// Directory for generated documents.
    #[arg(long, global = true, env = "DOC2CAST_DOCUMENT_DIR")]
    document_dir: Option<PathBuf>,

    /// Public origin prepended to artifact URLs (e.g. https://cast.example.com).
    #[arg(long, global = true, env = "DOC2CAST_PUBLIC_URL")]
    public_url: Option<String>,

    /// Generate a .docx for every request unless it opts out.
    #[arg(long, global = true, env = "DOC2CAST_GENERATE_DOCUMENT")]
    generate_document: bool,

    /// Per-call timeout for remote providers, in seconds.
    #[arg(long, global = true, env = "DOC2CAST_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Retries per remote call.
    #[arg(long, global = true, env = "DOC2CAST_MAX_RETRIES", default_value_t = 0)]
    max_retries: u32,

    /// Completion temperature (0.0–2.0).
    #[arg(long, global = true, env = "DOC2CAST_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max completion tokens.
    #[arg(long, global = true, env = "DOC2CAST_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// Maximum request body in MiB.
    #[arg(long, global = true, env = "DOC2CAST_MAX_UPLOAD_MB", default_value_t = 25)]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve { ref bind, port } => {
            let bind = match (bind, port) {
                (Some(addr), _) => Some(addr.clone()),
                (None, Some(port)) => Some(format!("0.0.0.0:{port}")),
                (None, None) => None,
            };
            let config = build_config(&cli.service, bind)?;
            serve(config).await
        }
        Command::Convert {
            ref input,
            ref text,
            ref mode,
            document,
        } => {
            let request = build_request(input.as_ref(), text.as_deref(), mode.as_deref(), document)
                .await?;
            let config = build_config(&cli.service, None)?;
            let response = convert_once(config, request, cli.quiet).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
    }
}

async fn serve(config: ServiceConfig) -> Result<()> {
    let bind = config.bind.clone();
    let converter = Converter::from_config(config)
        .await
        .context("Failed to initialise the converter")?;
    let app = doc2cast::server::router(Arc::new(converter));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("Listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutting down");
    }
}

async fn convert_once(
    config: ServiceConfig,
    request: ConversionRequest,
    quiet: bool,
) -> Result<ConvertResponse> {
    let converter = Converter::from_config(config)
        .await
        .context("Failed to initialise the converter")?;

    let spinner = (!quiet).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(format!(
            "Converting ({})…",
            request
                .mode
                .as_deref()
                .unwrap_or(converter.config().default_mode.as_str())
        ));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let start = Instant::now();
    let result = converter.convert(&request).await;

    if let Some(bar) = spinner {
        match result {
            Ok(_) => bar.finish_with_message(format!(
                "{} done {}",
                green("✓"),
                dim(&format!("{:.1}s", start.elapsed().as_secs_f64()))
            )),
            Err(ref e) => bar.abandon_with_message(format!("{} {}", red("✗"), e)),
        }
    }

    Ok(result?)
}

/// Map CLI args to `ServiceConfig`.
fn build_config(args: &ServiceArgs, bind: Option<String>) -> Result<ServiceConfig> {
    let mut builder = ServiceConfig::builder()
        .generate_document(args.generate_document)
        .api_timeout_secs(args.api_timeout)
        .max_retries(args.max_retries)
        .temperature(args.temperature)
        .max_tokens(args.max_tokens)
        .max_upload_mb(args.max_upload_mb);

    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref key) = args.openai_api_key {
        builder = builder.openai_api_key(key);
    }
    if let Some(ref url) = args.openai_base_url {
        builder = builder.openai_base_url(url);
    }
    if let Some(ref voice) = args.voice {
        builder = builder.voice(voice);
    }
    if let Some(ref mode) = args.default_mode {
        builder = builder.default_mode(mode);
    }
    if let Some(ref dir) = args.audio_dir {
        builder = builder.audio_dir(dir);
    }
    if let Some(ref dir) = args.document_dir {
        builder = builder.document_dir(dir);
    }
    if let Some(ref url) = args.public_url {
        builder = builder.public_base_url(url);
    }
    if let Some(addr) = bind {
        builder = builder.bind(addr);
    }

    builder.build().context("Invalid configuration")
}

/// Build a request from `--text` or a local file.
async fn build_request(
    input: Option<&PathBuf>,
    text: Option<&str>,
    mode: Option<&str>,
    document: bool,
) -> Result<ConversionRequest> {
    let mut request = match (input, text) {
        (_, Some(text)) => ConversionRequest::text(text),
        (Some(path), None) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path.file_name().and_then(|n| n.to_str());
            ConversionRequest::file(UploadedFile::new(bytes, None, name))
        }
        (None, None) => bail!("Provide an input file or --text"),
    };

    if let Some(mode) = mode {
        request = request.with_mode(mode);
    }
    if document {
        request = request.with_document(true);
    }
    Ok(request)
}
