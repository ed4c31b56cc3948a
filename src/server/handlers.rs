//! Request handlers.
//!
//! `POST /api/convert` accepts either `multipart/form-data` (fields `text`,
//! `file`, `mode`, `document`) or a JSON body `{text?, mode?, document?}`.
//! Both are reduced to a [`ConversionRequest`] before the converter runs.

use super::error::ApiError;
use super::state::AppState;
use crate::error::ConvertError;
use crate::output::ConvertResponse;
use crate::pipeline::input::{ConversionRequest, UploadedFile};
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// JSON form of a conversion request.
#[derive(Debug, Default, Deserialize)]
pub struct ConvertBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub document: Option<bool>,
}

impl From<ConvertBody> for ConversionRequest {
    fn from(body: ConvertBody) -> Self {
        ConversionRequest {
            raw_text: body.text,
            uploaded_file: None,
            mode: body.mode,
            generate_document: body.document,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

#[tracing::instrument(skip(state, request))]
pub async fn convert_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ConvertResponse>, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let conversion = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;
        read_multipart(multipart).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<ConvertBody>::from_request(request, &state)
            .await
            .map_err(|e| body_error(e.status(), e.body_text()))?;
        ConversionRequest::from(body)
    } else {
        return Err(ConvertError::InvalidRequest(
            "expected a multipart/form-data or application/json body".to_string(),
        )
        .into());
    };

    let response = state.converter.convert(&conversion).await?;
    Ok(Json(response))
}

async fn read_multipart(mut multipart: Multipart) -> Result<ConversionRequest, ConvertError> {
    let mut request = ConversionRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let mime = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid_multipart)?;

                // browsers send an empty part when no file was picked
                if bytes.is_empty() && file_name.as_deref().unwrap_or_default().is_empty() {
                    continue;
                }
                debug!(
                    bytes = bytes.len(),
                    mime = mime.as_deref().unwrap_or("-"),
                    file_name = file_name.as_deref().unwrap_or("-"),
                    "Received upload"
                );
                request.uploaded_file = Some(UploadedFile::new(
                    bytes.to_vec(),
                    mime.as_deref(),
                    file_name.as_deref(),
                ));
            }
            "text" => request.raw_text = Some(field.text().await.map_err(invalid_multipart)?),
            "mode" => request.mode = Some(field.text().await.map_err(invalid_multipart)?),
            "document" => {
                let value = field.text().await.map_err(invalid_multipart)?;
                request.generate_document = Some(parse_flag(&value));
            }
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }

    Ok(request)
}

fn invalid_multipart(e: MultipartError) -> ConvertError {
    body_error(e.status(), e.body_text())
}

/// Body rejections are 400, except the upload limit which stays 413.
fn body_error(status: StatusCode, detail: String) -> ConvertError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ConvertError::PayloadTooLarge(detail)
    } else {
        ConvertError::InvalidRequest(detail)
    }
}

/// HTML-form style boolean: `true`, `1`, `on`, `yes`.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        for v in ["true", "TRUE", " 1", "on", "yes"] {
            assert!(parse_flag(v), "{v:?}");
        }
        for v in ["", "false", "0", "off", "nope"] {
            assert!(!parse_flag(v), "{v:?}");
        }
    }

    #[test]
    fn body_limit_rejection_is_payload_too_large() {
        assert!(matches!(
            body_error(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into()),
            ConvertError::PayloadTooLarge(_)
        ));
        assert!(matches!(
            body_error(StatusCode::BAD_REQUEST, "bad boundary".into()),
            ConvertError::InvalidRequest(_)
        ));
    }

    #[test]
    fn json_body_maps_to_request() {
        let body: ConvertBody =
            serde_json::from_str(r#"{"text":"Hello world","document":true}"#).unwrap();
        let req = ConversionRequest::from(body);
        assert_eq!(req.raw_text.as_deref(), Some("Hello world"));
        assert_eq!(req.mode, None);
        assert_eq!(req.generate_document, Some(true));
        assert!(req.uploaded_file.is_none());
    }
}
