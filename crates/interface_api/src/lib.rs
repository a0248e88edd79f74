//! HTTP API Layer
//!
//! The REST surface of the posting engine, using Axum. The API is
//! deliberately small: health probes plus the dispatch trigger that runs
//! one posting batch. Event creation belongs to the upstream system and
//! ledger reporting to its query services.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use interface_api::{create_router, config::ApiConfig};
//!
//! let app = create_router(Arc::new(store), ApiConfig::default());
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_posting::PostingStore;

use crate::config::ApiConfig;
use crate::handlers::{dispatch, health};

/// Application state shared across handlers
pub struct AppState<S: PostingStore> {
    pub store: Arc<S>,
    pub config: ApiConfig,
}

impl<S: PostingStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

/// Creates the main API router
///
/// Generic over the store so tests can run the full HTTP surface against
/// an in-memory store.
pub fn create_router<S: PostingStore + 'static>(store: Arc<S>, config: ApiConfig) -> Router {
    let state = AppState { store, config };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check::<S>));

    let api_routes = Router::new().route("/ledger/dispatch", post(dispatch::run_batch::<S>));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
