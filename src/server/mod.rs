//! HTTP surface (feature `server`).
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /api/convert` | [`handlers::convert_handler`] |
//! | `GET /audio/{file}` | generated MP3s (`ServeDir` over `audio_dir`) |
//! | `GET /documents/{file}` | generated `.docx` (`ServeDir` over `document_dir`) |
//! | `GET /health` | `{"status":"ok"}` |
//!
//! Every route carries a permissive CORS layer and a `TraceLayer` span.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use crate::artifact::{AUDIO_ROUTE, DOCUMENT_ROUTE};
use crate::convert::Converter;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use handlers::{convert_handler, health_handler};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the service router. Artifact directories and the body limit are
/// taken from the converter's configuration.
pub fn router(converter: Arc<Converter>) -> Router {
    let config = converter.config();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/api/convert", post(convert_handler))
        .route("/health", get(health_handler))
        .nest_service(AUDIO_ROUTE, ServeDir::new(&config.audio_dir))
        .nest_service(DOCUMENT_ROUTE, ServeDir::new(&config.document_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(trace_layer)
        .layer(cors)
        .with_state(AppState::new(converter))
}
