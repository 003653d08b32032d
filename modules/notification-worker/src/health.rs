use axum::{routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};

pub fn router() -> Router {
    Router::new().route("/api/health", get(health)).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "module": "notification-worker",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
