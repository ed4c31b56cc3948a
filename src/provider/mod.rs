//! Remote transformation providers.
//!
//! The pipeline only talks to the three traits below. Concrete clients are
//! built once at startup and handed to [`crate::convert::Converter::new`],
//! so tests can substitute recording doubles and a deployment can mix
//! providers (e.g. Anthropic for text, OpenAI for speech).
//!
//! | Trait | Adapter | Backend |
//! |-------|---------|---------|
//! | [`CompletionClient`] | [`LlmCompletionClient`] | any `edgequake_llm` provider |
//! | [`SpeechClient`] | [`OpenAiSpeechClient`] | `POST /audio/speech` |
//! | [`ImageClient`] | [`OpenAiImageClient`] | `POST /images/generations` |

mod llm;
mod openai;

pub use llm::{resolve_llm_provider, LlmCompletionClient};
pub use openai::{OpenAiImageClient, OpenAiSpeechClient};

use crate::error::ProviderError;
use async_trait::async_trait;

/// Text completion: one prompt in, one reply out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Text-to-speech: text in, encoded audio (MP3) out.
#[async_trait]
pub trait SpeechClient: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Image generation: prompt in, fetchable image URL out.
#[async_trait]
pub trait ImageClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
