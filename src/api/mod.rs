use std::sync::Arc;

use axum::{
    http::{HeaderName, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::session::SessionStore;
use crate::upstream::Upstream;

pub mod handlers;

/// Header carrying the browser tab's session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Shared application state passed to handlers.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, upstream: Arc<Upstream>) -> Self {
        Self {
            config,
            sessions: SessionStore::new(upstream),
        }
    }
}

/// Page, health check and the JSON API behind the page.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/status", get(handlers::status))
        .route("/sample", get(handlers::sample))
        .route("/ask", post(handlers::ask))
        .route("/test-connection", post(handlers::test_connection))
        .fallback(fallback_404);

    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(|| async { "ok" }))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(|origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                }))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    HeaderName::from_static("content-type"),
                    HeaderName::from_static(SESSION_HEADER),
                ]),
        )
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
