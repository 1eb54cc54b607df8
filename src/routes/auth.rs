/**
 * Authentication Routes
 * Cookie session login, logout and session check for the admin dashboard
 */
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;

    let username = payload.username.unwrap_or_default().trim().to_string();
    let password = payload.password.unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    if !auth::verify_admin(state.store.as_ref(), &username, &password).await {
        return Err(ApiError::Unauthorized);
    }

    let token = auth::issue_token(&username);
    let cookie = auth::session_cookie(&token, state.config.is_production());
    tracing::info!(username = %username, "admin logged in");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, auth::cookie_header(&cookie)?)],
        Json(LoginResponse {
            success: true,
            username,
        }),
    )
        .into_response())
}

/// POST /api/auth/logout
///
/// Only expires the cookie; a copied token stays valid until it ages out.
pub async fn logout(State(state): State<AppState>) -> Result<Response, ApiError> {
    let cookie = auth::clear_session_cookie(state.config.is_production());
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, auth::cookie_header(&cookie)?)],
        Json(LogoutResponse { success: true }),
    )
        .into_response())
}

/// GET /api/auth/session
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionResponse> {
    let username = auth::session_token(&headers).and_then(|token| {
        auth::session_username(&token, state.config.admin_username.as_deref())
    });

    Json(SessionResponse {
        authenticated: username.is_some(),
        username,
    })
}
