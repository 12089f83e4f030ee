//! Route table and cross-cutting HTTP middleware

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod db;
pub mod getter;
pub mod plot_shares;
pub mod setter;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .nest("/api/setter", setter::routes())
        .nest("/api/getter", getter::routes())
        .nest("/api/get_plot", plot_shares::routes())
        .nest("/api/db", db::routes())
        .layer(middleware::from_fn(stamp_error_endpoint))
        .layer(TraceLayer::new_for_http())
        // The registry API is served openly; auth lives upstream
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "service": "landchain-gateway",
        "status": "ok",
    }))
}

/// Fill the `error.endpoint` field of error envelopes with the request path.
async fn stamp_error_endpoint(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    if response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return (parts.status, Body::empty()).into_response(),
    };
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            if let Some(error) = value.get_mut("error") {
                error["endpoint"] = Value::String(path);
            }
            (parts.status, Json(value)).into_response()
        }
        // Not one of ours (e.g. a rejection body); pass through untouched
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}
