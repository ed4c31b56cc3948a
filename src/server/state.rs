use crate::convert::Converter;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<Converter>,
}

impl AppState {
    pub fn new(converter: Arc<Converter>) -> Self {
        Self { converter }
    }
}
