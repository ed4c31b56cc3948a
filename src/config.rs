//! Configuration types for the conversion service.
//!
//! All pipeline behaviour is controlled through [`ServiceConfig`], built via
//! its [`ServiceConfigBuilder`]. The HTTP layer, the CLI and tests share the
//! same struct, so a deployment can be reproduced by diffing two configs.
//!
//! # Design choice: builder over constructor
//! Most callers only care about two or three knobs (API key, storage
//! directories, public URL). The builder lets them set those and rely on the
//! documented defaults for the rest.

use crate::error::ConvertError;
use crate::mode::DEFAULT_MODE_LABEL;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for the conversion service.
///
/// # Example
/// ```rust
/// use doc2cast::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .audio_dir("/srv/doc2cast/audio")
///     .public_base_url("https://cast.example.com")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_prompt_chars, 4000);
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Mode label used when a request does not name one. Default: `"summarize concisely"`.
    pub default_mode: String,

    /// Maximum characters of content placed into a completion prompt. Default: 4000.
    pub max_prompt_chars: usize,

    /// Maximum characters sent to the speech provider. Default: 4096.
    ///
    /// Independent of `max_prompt_chars`: a slide rewrite may return narration
    /// longer than its input, and the speech endpoint rejects anything above
    /// its own input cap.
    pub max_speech_chars: usize,

    /// Minimum line count for content to be considered slide-like. Default: 8.
    pub slide_min_lines: usize,

    /// Average line length (characters) below which content is slide-like. Default: 80.
    pub slide_max_avg_line_len: usize,

    /// Generate a `.docx` of the primary text unless the request overrides it. Default: false.
    pub generate_document: bool,

    /// Per-remote-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Retry attempts on a failed remote call. Default: 0.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Sampling temperature for completions. Default: 0.7.
    pub temperature: f32,

    /// Maximum tokens generated per completion. Default: 2048.
    pub max_tokens: usize,

    /// Completion model identifier. If None, uses [`DEFAULT_COMPLETION_MODEL`].
    pub model: Option<String>,

    /// Completion provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed completion provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// API key for the OpenAI speech and image endpoints.
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible speech and image endpoints.
    pub openai_base_url: String,

    /// Speech model. Default: `tts-1`.
    pub speech_model: String,

    /// Speech voice. Default: `nova`.
    pub voice: String,

    /// Image model. Default: `dall-e-3`.
    pub image_model: String,

    /// Image size. Default: `1024x1024`.
    pub image_size: String,

    /// Directory receiving generated audio. Default: `uploads/audio`.
    pub audio_dir: PathBuf,

    /// Directory receiving generated documents. Default: `uploads/documents`.
    pub document_dir: PathBuf,

    /// Public origin prepended to artifact locations, e.g.
    /// `https://cast.example.com`. If None, locations are root-relative paths.
    pub public_base_url: Option<String>,

    /// Maximum accepted request body in MiB. Default: 25.
    pub max_upload_mb: usize,

    /// Socket address the HTTP service binds to. Default: `0.0.0.0:3000`.
    pub bind: String,
}

/// Completion model used when none is configured.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI API root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_mode: DEFAULT_MODE_LABEL.to_string(),
            max_prompt_chars: 4000,
            max_speech_chars: 4096,
            slide_min_lines: 8,
            slide_max_avg_line_len: 80,
            generate_document: false,
            api_timeout_secs: 60,
            max_retries: 0,
            retry_backoff_ms: 500,
            temperature: 0.7,
            max_tokens: 2048,
            model: None,
            provider_name: None,
            provider: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            speech_model: "tts-1".to_string(),
            voice: "nova".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            audio_dir: PathBuf::from("uploads/audio"),
            document_dir: PathBuf::from("uploads/documents"),
            public_base_url: None,
            max_upload_mb: 25,
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("default_mode", &self.default_mode)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .field("max_speech_chars", &self.max_speech_chars)
            .field("slide_min_lines", &self.slide_min_lines)
            .field("slide_max_avg_line_len", &self.slide_max_avg_line_len)
            .field("generate_document", &self.generate_document)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("speech_model", &self.speech_model)
            .field("voice", &self.voice)
            .field("image_model", &self.image_model)
            .field("audio_dir", &self.audio_dir)
            .field("document_dir", &self.document_dir)
            .field("public_base_url", &self.public_base_url)
            .field("bind", &self.bind)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Completion model, falling back to [`DEFAULT_COMPLETION_MODEL`].
    pub fn completion_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_COMPLETION_MODEL)
    }

    /// Maximum request body size in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn default_mode(mut self, label: impl Into<String>) -> Self {
        self.config.default_mode = label.into();
        self
    }

    pub fn max_prompt_chars(mut self, n: usize) -> Self {
        self.config.max_prompt_chars = n;
        self
    }

    pub fn max_speech_chars(mut self, n: usize) -> Self {
        self.config.max_speech_chars = n;
        self
    }

    pub fn slide_min_lines(mut self, n: usize) -> Self {
        self.config.slide_min_lines = n.max(1);
        self
    }

    pub fn slide_max_avg_line_len(mut self, n: usize) -> Self {
        self.config.slide_max_avg_line_len = n;
        self
    }

    pub fn generate_document(mut self, v: bool) -> Self {
        self.config.generate_document = v;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.openai_api_key = Some(key.into());
        self
    }

    pub fn openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.openai_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn speech_model(mut self, model: impl Into<String>) -> Self {
        self.config.speech_model = model.into();
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.config.voice = voice.into();
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.config.image_model = model.into();
        self
    }

    pub fn image_size(mut self, size: impl Into<String>) -> Self {
        self.config.image_size = size.into();
        self
    }

    pub fn audio_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.audio_dir = dir.into();
        self
    }

    pub fn document_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.document_dir = dir.into();
        self
    }

    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.public_base_url = Some(url.into());
        self
    }

    pub fn max_upload_mb(mut self, mb: usize) -> Self {
        self.config.max_upload_mb = mb.max(1);
        self
    }

    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind = addr.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, ConvertError> {
        let c = &self.config;
        if c.max_prompt_chars == 0 {
            return Err(ConvertError::InvalidConfig(
                "max_prompt_chars must be ≥ 1".into(),
            ));
        }
        if c.max_speech_chars == 0 {
            return Err(ConvertError::InvalidConfig(
                "max_speech_chars must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(ConvertError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.default_mode.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "default_mode must not be empty".into(),
            ));
        }
        if let Some(ref url) = c.public_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConvertError::InvalidConfig(format!(
                    "public_base_url must be an http(s) URL, got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_provider_limits() {
        let c = ServiceConfig::default();
        assert_eq!(c.default_mode, "summarize concisely");
        assert_eq!(c.max_prompt_chars, 4000);
        assert_eq!(c.max_speech_chars, 4096);
        assert_eq!(c.slide_min_lines, 8);
        assert_eq!(c.slide_max_avg_line_len, 80);
        assert!(!c.generate_document);
        assert_eq!(c.completion_model(), "gpt-3.5-turbo");
    }

    #[test]
    fn rejects_relative_public_url() {
        let err = ServiceConfig::builder()
            .public_base_url("cast.example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(ServiceConfig::builder().api_timeout_secs(0).build().is_err());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let c = ServiceConfig::builder()
            .openai_base_url("http://localhost:8080/v1/")
            .build()
            .unwrap();
        assert_eq!(c.openai_base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = ServiceConfig::builder()
            .openai_api_key("sk-secret")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
