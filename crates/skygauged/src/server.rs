//! HTTP exposition.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::warn;

use skygauge_metrics::{CONTENT_TYPE, Registry};

#[derive(Clone)]
pub struct ExpositionState {
    pub registry: Arc<Registry>,
    /// Scrapes running longer than this answer 504.
    pub scrape_timeout: Option<Duration>,
}

pub fn build_router(state: ExpositionState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// One gather per request. Any collector failure fails the whole scrape.
pub async fn metrics(State(state): State<ExpositionState>) -> Response {
    let render = state.registry.render();
    let outcome = match state.scrape_timeout {
        Some(limit) => tokio::time::timeout(limit, render).await.ok(),
        None => Some(render.await),
    };

    let (text, gathered) = match outcome {
        Some(Ok(rendered)) => rendered,
        Some(Err(e)) => {
            warn!(error = %e, "exposition encoding failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("{e}\n")).into_response();
        }
        None => {
            warn!("scrape timed out");
            return (StatusCode::GATEWAY_TIMEOUT, "scrape timed out\n").into_response();
        }
    };

    if !gathered.is_success() {
        return (StatusCode::INTERNAL_SERVER_ERROR, gathered.failure_report()).into_response();
    }

    (StatusCode::OK, [("content-type", CONTENT_TYPE)], text).into_response()
}

pub async fn healthz() -> &'static str {
    "ok\n"
}
