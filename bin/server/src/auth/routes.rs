//! Authentication routes for login, callback, current user, and logout.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use gatehouse_platform_access::{AuthenticatedUser, LoginError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::{AppState, RequireAuth};

/// Query parameters for starting a login.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    state: Option<String>,
}

/// Body returned by the login route.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    url: String,
}

/// Query parameters for the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    code: String,
    #[serde(default)]
    state: String,
}

/// Body returned by the current-user route.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    user: AuthenticatedUser,
}

/// Returns the provider authorization URL for the browser to visit.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
) -> Json<LoginResponse> {
    let url = state
        .login
        .authorization_url(state.login.redirect_uri(), query.state.as_deref());
    Json(LoginResponse { url })
}

/// Completes the handshake and sends the browser back to the frontend.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let result = state
        .login
        .handle_callback(&query.code, state.login.redirect_uri())
        .await;

    match result {
        Ok(credential) => state
            .frontend_redirect("token", &credential, &query.state)
            .into_response(),
        Err(LoginError::BadRequest) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": LoginError::BadRequest.summary() })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(stage = %e.stage(), error = %e, "login callback failed");
            state
                .frontend_redirect("error", e.summary(), &query.state)
                .into_response()
        }
    }
}

/// Returns the identity behind the request's credential.
pub async fn me(RequireAuth(user): RequireAuth) -> Json<MeResponse> {
    Json(MeResponse { user })
}

/// Credentials are self-contained; the client discards its copy.
pub async fn logout() -> impl IntoResponse {
    Json(json!({ "message": "logged out" }))
}

/// Public liveness check.
pub async fn deals() -> impl IntoResponse {
    Json(json!({ "message": "ok" }))
}

impl AppState {
    /// Builds the 307 redirect back to the frontend callback page.
    fn frontend_redirect(&self, key: &str, value: &str, csrf_state: &str) -> Redirect {
        let mut url = self.frontend_callback.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(key, value);
            if !csrf_state.is_empty() {
                query.append_pair("state", csrf_state);
            }
        }
        Redirect::temporary(url.as_str())
    }
}
