use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregator::SessionDetailsAggregator;
use crate::error::AggregateError;
use crate::models::SessionDetailsResponse;

pub fn router(aggregator: Arc<SessionDetailsAggregator>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/v1/session-details/{id}", get(get_session_details))
        .with_state(aggregator)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Handler for GET /v1/session-details/{id}
pub async fn get_session_details(
    State(aggregator): State<Arc<SessionDetailsAggregator>>,
    Path(id): Path<String>,
) -> Result<Json<SessionDetailsResponse>, AggregateError> {
    aggregator.get_composite_view(&id).await.map(Json)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "module": "bff",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
