//! HTTP surface: router assembly and shared application context

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::extractor::{ExtractorConfig, MediaExtractor};
use crate::probe::MediaProber;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    /// Extraction Collaborator; a stub in handler tests
    pub extractor: Arc<dyn MediaExtractor>,
    /// Size/image prober; also a stub in handler tests
    pub prober: Arc<dyn MediaProber>,
    pub extractor_config: Arc<ExtractorConfig>,
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/download/:platform", get(handlers::download))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
