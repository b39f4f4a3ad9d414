pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod payload;
pub mod routes;
pub mod state;
pub mod validation;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Json;
use axum::Router;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::payload::upload;
use crate::state::{AppState, SharedState};

pub fn build_app(store: Arc<dyn Store>, config: Config) -> Router {
    let cors = cors_layer(&config.cors_origins);
    let body_limit = RequestBodyLimitLayer::new(config.max_body_size);
    let uploads = ServeDir::new(&config.upload_dir);

    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; login returns an unsigned placeholder token");
    }

    let state: SharedState = Arc::new(AppState { store, config });

    Router::new()
        .merge(routes::api_routes(state.clone()))
        .nest_service(upload::PUBLIC_PREFIX, uploads)
        .route("/", axum::routing::get(index))
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(body_limit)
        .layer(axum::middleware::from_fn(middleware::errors::json_errors))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Ignoring invalid CORS origin '{o}': {e}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn index() -> Json<Value> {
    Json(json!({ "status": true, "message": "Staffdesk API is running" }))
}

async fn health() -> &'static str {
    "ok"
}
