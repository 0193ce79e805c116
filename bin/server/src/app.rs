//! HTTP routing for the gatehouse service.

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{self, AppState};

/// Route table without state or middleware.
///
/// Exposed separately so callers can merge additional protected routes
/// before the state is attached.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Auth routes
        .route("/api/auth/login", get(auth::login))
        .route("/api/auth/callback", get(auth::callback))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", get(auth::logout))
        // Public routes
        .route("/api/deals", get(auth::deals))
}

/// Attaches state, CORS, and request tracing to a route table.
pub fn finish_router(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    let cors = match HeaderValue::from_str(&state.frontend_origin()) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
        Err(e) => {
            tracing::warn!(error = %e, "frontend origin is not a valid header; CORS disabled");
            CorsLayer::new()
        }
    };

    routes
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the complete application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    finish_router(api_routes(), state)
}
