//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the TubeDesk backend:
//! - Auth endpoints (register, login, OAuth)
//! - Channel, video and category endpoints
//! - Campaign and revenue endpoints
//! - Task and comment endpoints
//! - Admin endpoints
//! - OpenAPI documentation and static frontend hosting

pub mod admin;
pub mod auth;
pub mod campaigns;
pub mod categories;
pub mod channels;
pub mod docs;
pub mod middleware;
pub mod revenues;
pub mod static_files;
pub mod tasks;
pub mod videos;

use axum::{
    http::{header, HeaderValue, Method, Uri},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa_rapidoc::RapiDoc;

use crate::config::ServerConfig;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .nest("/categories", categories::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Manager routes (campaign and revenue mutation)
    let manager_routes = Router::new()
        .nest(
            "/campaigns",
            campaigns::manager_router().merge(revenues::manager_router()),
        )
        .route_layer(axum_middleware::from_fn(middleware::require_manager))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but no specific role)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/channels", channels::router())
        .nest("/videos", videos::router())
        .nest("/categories", categories::router())
        .nest("/campaigns", campaigns::router().merge(revenues::router()))
        .nest("/tasks", tasks::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/auth", auth::public_router())
        .merge(protected_routes)
        .merge(manager_routes)
        .merge(admin_routes)
}

/// Build the complete router with middleware, documentation and the
/// optional static frontend fallback.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Credentialed CORS for the configured frontend origins only
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let mut router = Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        // Documentation is reachable without a token
        .route(
            "/api/openapi.json",
            get(|| async { Json(docs::openapi_spec()) }),
        )
        .merge(RapiDoc::new("/api/openapi.json").path("/"));

    // Static frontend fallback, only when the bundle directory exists
    if config.static_dir.is_dir() {
        let dir = config.static_dir.clone();
        tracing::info!("Serving frontend bundle from {:?}", dir);
        router = router.fallback(move |uri: Uri| static_files::serve_spa(dir.clone(), uri));
    } else {
        tracing::info!(
            "No frontend bundle at {:?}, static hosting disabled",
            config.static_dir
        );
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
