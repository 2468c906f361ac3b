//! HTTP handlers for the exporter
//!
//! This module defines the routes: the landing page, the metrics endpoint
//! and a JSON health check.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::metrics;

use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub last_scrape_records: usize,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the exporter router
pub fn create_router(state: AppState) -> Router {
    let metrics_path = state.config.server.metrics_path.clone();

    Router::new()
        .route("/", get(landing_page))
        .route("/health", get(health_check))
        .route(&metrics_path, get(metrics_handler))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Static landing page linking to the metrics path
async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(landing_html(&state.config.server.metrics_path))
}

pub(crate) fn landing_html(metrics_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>Cronjob exporter</title></head>\n\
         <body>\n\
         <h1>Cronjob exporter</h1>\n\
         <p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        html_escape::encode_double_quoted_attribute(metrics_path)
    )
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        last_scrape_records: state.trigger.store().read().records.len(),
    })
}

/// Run a scrape and expose its snapshot
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let snapshot = state.trigger.snapshot().await;

    match metrics::encode_snapshot(&snapshot) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, metrics::content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_links_metrics_path() {
        let html = landing_html("/metrics");
        assert!(html.contains("<title>Cronjob exporter</title>"));
        assert!(html.contains(r#"<a href="/metrics">Metrics</a>"#));
    }

    #[test]
    fn test_landing_escapes_path() {
        let html = landing_html(r#"/m"><script>"#);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&quot;"));
    }
}
