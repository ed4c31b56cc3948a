//! OpenAI-compatible speech and image clients.
//!
//! `edgequake_llm` covers chat completions only, so text-to-speech and image
//! generation call the REST endpoints directly with `reqwest`. Any server
//! exposing the same routes (LocalAI, a proxy, …) works via
//! [`ServiceConfig::openai_base_url`].

use super::{ImageClient, SpeechClient};
use crate::config::ServiceConfig;
use crate::error::{ConvertError, ProviderError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

fn build_http_client(config: &ServiceConfig) -> Result<reqwest::Client, ConvertError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| ConvertError::Internal(format!("Failed to build HTTP client: {e}")))
}

fn require_key(config: &ServiceConfig) -> Result<String, ConvertError> {
    config
        .openai_api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            ConvertError::InvalidConfig(
                "OPENAI_API_KEY is required for speech and image generation".into(),
            )
        })
}

/// Turn a non-success response into [`ProviderError::Status`], preferring
/// the `error.message` field of OpenAI's error envelope over the raw body.
async fn status_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(body);

    ProviderError::Status {
        status,
        body: message,
    }
}

// ── Speech ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// [`SpeechClient`] for `POST {base}/audio/speech`.
pub struct OpenAiSpeechClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    voice: String,
}

impl OpenAiSpeechClient {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConvertError> {
        Ok(Self {
            http: build_http_client(config)?,
            api_key: require_key(config)?,
            endpoint: format!("{}/audio/speech", config.openai_base_url),
            model: config.speech_model.clone(),
            voice: config.voice.clone(),
        })
    }
}

#[async_trait]
impl SpeechClient for OpenAiSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let body = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
            response_format: "mp3",
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ProviderError::InvalidResponse("speech returned no audio".into()));
        }

        debug!("Speech: {} chars → {} bytes audio", text.chars().count(), bytes.len());
        Ok(bytes.to_vec())
    }
}

// ── Image ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

/// [`ImageClient`] for `POST {base}/images/generations`.
pub struct OpenAiImageClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    size: String,
}

impl OpenAiImageClient {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConvertError> {
        Ok(Self {
            http: build_http_client(config)?,
            api_key: require_key(config)?,
            endpoint: format!("{}/images/generations", config.openai_base_url),
            model: config.image_model.clone(),
            size: config.image_size.clone(),
        })
    }
}

#[async_trait]
impl ImageClient for OpenAiImageClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parsed
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| ProviderError::InvalidResponse("image response carried no URL".into()))
    }
}
