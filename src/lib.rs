//! # doc2cast
//!
//! Turn pasted text or PDF/Word uploads into summaries, study notes, stories,
//! narrated podcasts and illustrations using hosted LLMs.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text or upload
//!  │
//!  ├─ 1. Input      pasted text wins; uploads detected as PDF or Word
//!  ├─ 2. Extract    pdf-extract / OOXML text runs (spawn_blocking, temp file)
//!  ├─ 3. Normalize  trim, reject empty, bound to 4000 chars
//!  ├─ 4. Route      mode label → strategy + prompt template
//!  ├─ 5. Transform  completion, slide rewrite + speech, or image generation
//!  ├─ 6. Document   optional single-paragraph .docx
//!  └─ 7. Store      audio / document artifacts with unique names
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc2cast::{ConversionRequest, Converter, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Completion provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = ServiceConfig::builder()
//!         .openai_api_key(std::env::var("OPENAI_API_KEY")?)
//!         .build()?;
//!     let converter = Converter::from_config(config).await?;
//!
//!     let request = ConversionRequest::text("Rust is a systems language…")
//!         .with_mode("turn into a story");
//!     let response = converter.convert(&request).await?;
//!     println!("{}", response.completion);
//!     Ok(())
//! }
//! ```
//!
//! ## Modes
//!
//! | Label | Output |
//! |-------|--------|
//! | `summarize concisely` (default) | short summary |
//! | `structure for comprehension` | headings, bullets, recap |
//! | `turn into a story` | short story |
//! | `produce a podcast script` | narration + MP3 (slides are rewritten first) |
//! | `describe as an image` | image URL |
//! | anything else | used verbatim as `"<label>: <content>"` |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `server` | on     | [`server::router`] (axum + tower-http) |
//! | `cli`    | on     | Enables the `doc2cast` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod config;
pub mod convert;
pub mod error;
pub mod mode;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod provider;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::{ArtifactKind, ArtifactStore, LocalArtifactStore};
pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use convert::Converter;
pub use error::{ConvertError, ProviderError};
pub use mode::{Mode, ModeDecision, Strategy};
pub use output::{ConvertResponse, ExtractedContent, SourceKind, TransformationResult};
pub use pipeline::input::{ConversionRequest, DocumentFormat, UploadedFile};
