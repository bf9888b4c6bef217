use axum::http::{HeaderName, HeaderValue, Method, StatusCode, Uri, header};
use axum::{Router, middleware, routing::get};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;

use docket_config::CorsConfig;
use docket_core::Reply;
use docket_models::{Device, MediaList, User};

use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::access::RouteOptions;
use crate::middleware::auth::TOKEN_HEADER;
use crate::modules::auth::router::init_auth_router;
use crate::modules::resources::router::init_resource_router;
use crate::state::AppState;

async fn health() -> Reply<serde_json::Value> {
    Reply::success(json!({ "status": "ok" }))
}

async fn route_not_found(uri: Uri) -> Reply<serde_json::Value> {
    Reply::failure(StatusCode::NOT_FOUND, format!("{} not found", uri.path()))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(TOKEN_HEADER),
        ]);

    if config.allows_any() {
        return layer.allow_origin(Any);
    }

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    layer.allow_origin(allowed_origins).allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let owned = RouteOptions {
        is_protected: true,
        is_owned: true,
    };

    Router::new()
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest("/user", init_resource_router::<User>(state.clone(), owned))
                .nest("/device", init_resource_router::<Device>(state.clone(), owned))
                .nest("/media", init_resource_router::<MediaList>(state.clone(), owned)),
        )
        .fallback(route_not_found)
        .with_state(state.clone())
        .layer(cors_layer(&state.cors_config))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

/// Wraps the finished router so trailing slashes are trimmed before
/// routing: `/api/device/` and `/api/device` reach the same handler.
pub fn into_service(router: Router) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(router)
}
