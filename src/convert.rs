//! Conversion entry points.
//!
//! [`Converter`] owns the injected collaborators (completion, speech and
//! image clients, the text extractor and the artifact store) and runs one
//! request through the pipeline:
//!
//! ```text
//! resolve source ─▶ extract ─▶ normalize ─▶ route ─▶ remote call(s)
//!                                                        │
//!                      response ◀── store artifacts ◀── document
//! ```
//!
//! [`Converter::transform`] stops before persistence and returns bytes in
//! memory; [`Converter::convert`] also stores artifacts and assembles the
//! wire response. Artifacts are stored only after every remote call has
//! succeeded, and an audio file is removed again when the document that
//! follows it cannot be stored, so a failed request never leaves files
//! behind.
//!
//! The converter holds nothing but `Arc`s to immutable state and is shared
//! across concurrent requests.

use crate::artifact::{ArtifactKind, ArtifactStore, LocalArtifactStore};
use crate::config::ServiceConfig;
use crate::error::{ConvertError, ProviderError};
use crate::mode::{self, Strategy};
use crate::output::{ConvertResponse, ExtractedContent, SourceKind, TransformationResult};
use crate::pipeline::extract::{self, DocumentExtractor, TextExtractor};
use crate::pipeline::input::{ConversionRequest, Source};
use crate::pipeline::llm::{self, CallPolicy};
use crate::pipeline::normalize::{bound_for_speech, normalize};
use crate::pipeline::document;
use crate::pipeline::speech::{is_slide_like, LineStats, SlideThresholds};
use crate::provider::{
    CompletionClient, ImageClient, LlmCompletionClient, OpenAiImageClient, OpenAiSpeechClient,
    SpeechClient,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs conversion requests against injected providers.
#[derive(Clone)]
pub struct Converter {
    completion: Arc<dyn CompletionClient>,
    speech: Option<Arc<dyn SpeechClient>>,
    image: Option<Arc<dyn ImageClient>>,
    extractor: Arc<dyn TextExtractor>,
    store: Arc<dyn ArtifactStore>,
    config: Arc<ServiceConfig>,
    policy: CallPolicy,
}

impl Converter {
    /// Converter with a completion client and an artifact store.
    ///
    /// Speech and image clients are optional; without them the podcast and
    /// image modes fail as [`ConvertError::Upstream`]. Extraction defaults
    /// to [`DocumentExtractor`].
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        store: Arc<dyn ArtifactStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            completion,
            speech: None,
            image: None,
            extractor: Arc::new(DocumentExtractor),
            store,
            policy: CallPolicy::from_config(&config),
            config: Arc::new(config),
        }
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechClient>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_image(mut self, image: Arc<dyn ImageClient>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Build every collaborator from `config`.
    ///
    /// The completion provider is resolved with
    /// [`crate::provider::resolve_llm_provider`]. Speech and image clients
    /// need `openai_api_key`; when it is missing they are left out and a
    /// warning is logged.
    pub async fn from_config(config: ServiceConfig) -> Result<Self, ConvertError> {
        let completion = Arc::new(LlmCompletionClient::from_config(&config)?);
        let store = Arc::new(LocalArtifactStore::from_config(&config).await?);
        let mut converter = Self::new(completion, store, config);

        if converter.config.openai_api_key.is_some() {
            let speech = OpenAiSpeechClient::from_config(&converter.config)?;
            let image = OpenAiImageClient::from_config(&converter.config)?;
            converter = converter
                .with_speech(Arc::new(speech))
                .with_image(Arc::new(image));
        } else {
            warn!("OPENAI_API_KEY not set: podcast and image modes are unavailable");
        }
        Ok(converter)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the pipeline up to, but excluding, artifact persistence.
    pub async fn transform(
        &self,
        request: &ConversionRequest,
    ) -> Result<TransformationResult, ConvertError> {
        let start = Instant::now();

        // ── Step 1: Resolve and extract ──────────────────────────────────
        let extracted = match request.source()? {
            Source::Text(text) => ExtractedContent::new(text, SourceKind::PastedText),
            Source::Upload { file, format } => {
                info!(
                    "Extracting {} upload ({} bytes)",
                    format.name(),
                    file.bytes.len()
                );
                extract::extract_upload(self.extractor.clone(), file, format).await?
            }
        };

        // ── Step 2: Normalize ────────────────────────────────────────────
        let bounded = normalize(&extracted, self.config.max_prompt_chars)?;
        if bounded.was_truncated() {
            debug!(
                "Content truncated to {} chars",
                self.config.max_prompt_chars
            );
        }

        // ── Step 3: Route ────────────────────────────────────────────────
        let decision = mode::route(request.mode.as_deref(), &self.config.default_mode);
        info!(
            "Mode '{}' → {:?} ({:?}, {} chars)",
            decision.mode,
            decision.strategy,
            bounded.source_kind(),
            bounded.as_str().chars().count()
        );

        // ── Step 4: Dispatch ─────────────────────────────────────────────
        let mut result = TransformationResult {
            primary_text: String::new(),
            audio: None,
            document: None,
            image_url: None,
            strategy: decision.strategy,
            source_kind: bounded.source_kind(),
        };

        match decision.strategy {
            Strategy::PlainCompletion
            | Strategy::StructuredRewrite
            | Strategy::NarrativeRewrite => {
                let prompt = decision.template.render(bounded.as_str());
                result.primary_text =
                    llm::complete(self.completion.as_ref(), &prompt, &self.policy).await?;
            }
            Strategy::SpeechSynthesis => {
                let speech = self
                    .speech
                    .as_deref()
                    .ok_or_else(|| not_configured(llm::SPEECH))?;

                let stats = LineStats::of(bounded.as_str());
                let slide_like = is_slide_like(stats, self.slide_thresholds());
                debug!(
                    "Slide heuristic: {} lines, avg {:.1} chars → {}",
                    stats.line_count,
                    stats.avg_line_len,
                    if slide_like { "rewrite" } else { "narrate" }
                );

                let narration = if slide_like {
                    let prompt = decision.template.render(bounded.as_str());
                    llm::complete(self.completion.as_ref(), &prompt, &self.policy).await?
                } else {
                    bounded.into_string()
                };

                let spoken = bound_for_speech(&narration, self.config.max_speech_chars);
                result.audio = Some(llm::synthesize(speech, spoken, &self.policy).await?);
                result.primary_text = narration;
            }
            Strategy::ImageGeneration => {
                let image = self.image.as_deref().ok_or_else(|| not_configured(llm::IMAGE))?;
                let prompt = decision.template.render(bounded.as_str());
                result.image_url =
                    Some(llm::generate_image(image, &prompt, &self.policy).await?);
                result.primary_text = prompt;
            }
        }

        // ── Step 5: Optional document ────────────────────────────────────
        if request
            .generate_document
            .unwrap_or(self.config.generate_document)
        {
            result.document = Some(document::build_docx(&result.primary_text)?);
        }

        info!(
            "Transformed in {:?} ({} chars out, audio: {}, document: {}, image: {})",
            start.elapsed(),
            result.primary_text.chars().count(),
            result.audio.is_some(),
            result.document.is_some(),
            result.image_url.is_some()
        );
        Ok(result)
    }

    /// Transform, persist artifacts and assemble the response.
    pub async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConvertResponse, ConvertError> {
        let result = self.transform(request).await?;

        let audio_url = match result.audio {
            Some(ref bytes) => Some(self.store.store(bytes, ArtifactKind::Audio).await?),
            None => None,
        };
        let download_url = match result.document {
            Some(ref bytes) => match self.store.store(bytes, ArtifactKind::Document).await {
                Ok(location) => Some(location),
                Err(e) => {
                    if let Some(ref audio) = audio_url {
                        self.discard(audio, ArtifactKind::Audio).await;
                    }
                    return Err(e);
                }
            },
            None => None,
        };

        Ok(ConvertResponse {
            completion: result.primary_text,
            download_url,
            audio_url,
            image_url: result.image_url,
        })
    }

    /// Best-effort removal of an artifact stored earlier in a failed request.
    async fn discard(&self, location: &str, kind: ArtifactKind) {
        if let Err(e) = self.store.remove(location, kind).await {
            warn!("Could not remove partial artifact {}: {}", location, e);
        }
    }

    fn slide_thresholds(&self) -> SlideThresholds {
        SlideThresholds {
            min_lines: self.config.slide_min_lines,
            max_avg_line_len: self.config.slide_max_avg_line_len,
        }
    }
}

fn not_configured(provider: &'static str) -> ConvertError {
    ConvertError::Upstream {
        provider,
        source: ProviderError::NotConfigured(format!("no {provider} client configured")),
    }
}
