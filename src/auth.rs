//! Admin session gate.
//!
//! The session token is `base64("<username>:<issued-at epoch millis>")`
//! carried in the `admin-token` cookie. It is NOT signed: anyone who knows
//! the admin username can mint one. It only marks a session and expires it
//! after 24 hours. Logout clears the cookie but cannot revoke a token that
//! was copied elsewhere; it stays valid until it ages out.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;

use crate::db::{ContentStore, StoreError};
use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "admin-token";

/// Session lifetime, for both token age and cookie `Max-Age`.
pub const SESSION_MAX_AGE_SECS: i64 = 24 * 60 * 60;

const SESSION_MAX_AGE_MILLIS: i64 = SESSION_MAX_AGE_SECS * 1000;

// ============================================================================
// Tokens
// ============================================================================

pub fn issue_token(username: &str) -> String {
    issue_token_at(username, Utc::now().timestamp_millis())
}

pub fn issue_token_at(username: &str, issued_at_millis: i64) -> String {
    STANDARD.encode(format!("{}:{}", username, issued_at_millis))
}

/// Checks a token against the configured admin username at the current time.
pub fn verify_token(token: &str, admin_username: Option<&str>) -> bool {
    verify_token_at(token, admin_username, Utc::now().timestamp_millis())
}

/// Any decode or parse failure is simply "not authenticated".
pub fn verify_token_at(token: &str, admin_username: Option<&str>, now_millis: i64) -> bool {
    let Some(admin_username) = admin_username else {
        return false;
    };
    let Ok(bytes) = STANDARD.decode(token.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(bytes) else {
        return false;
    };
    // The timestamp is always the last segment; the username may contain ':'.
    let Some((username, issued_at)) = decoded.rsplit_once(':') else {
        return false;
    };
    let Ok(issued_at) = issued_at.parse::<i64>() else {
        return false;
    };

    let age = now_millis.saturating_sub(issued_at);
    age < SESSION_MAX_AGE_MILLIS && username == admin_username
}

/// Username carried by a token that passes [`verify_token`].
pub fn session_username(token: &str, admin_username: Option<&str>) -> Option<String> {
    if !verify_token(token, admin_username) {
        return None;
    }
    admin_username.map(str::to_string)
}

// ============================================================================
// Cookies
// ============================================================================

/// Reads the session token from any `Cookie` header on the request.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE, token, SESSION_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn cookie_header(cookie: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::Internal(format!("invalid cookie header: {}", e)))
}

// ============================================================================
// Credentials
// ============================================================================

/// Checks a username/password pair against the admin_users table.
///
/// Unknown users, wrong passwords, malformed hashes and store failures all
/// come back as `false`.
pub async fn verify_admin(store: &dyn ContentStore, username: &str, password: &str) -> bool {
    let user = match store.find_admin_user(username).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(username = %username, "login attempt for unknown user");
            return false;
        }
        Err(e) => {
            tracing::error!(error = %e, "credential lookup failed");
            return false;
        }
    };

    // bcrypt is CPU-bound; keep it off the async executor.
    let password = password.to_string();
    let password_hash = user.password_hash;
    let matches = tokio::task::spawn_blocking(move || {
        bcrypt::verify(&password, &password_hash).unwrap_or(false)
    })
    .await
    .unwrap_or(false);

    if !matches {
        tracing::warn!(username = %username, "failed login attempt");
    }
    matches
}

#[derive(Debug, thiserror::Error)]
pub enum AdminSetupError {
    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Creates the admin account unless one with this username already exists.
/// Returns whether a row was written.
pub async fn ensure_admin(
    store: &dyn ContentStore,
    username: &str,
    password: &str,
) -> Result<bool, AdminSetupError> {
    if store.find_admin_user(username).await?.is_some() {
        tracing::info!(username = %username, "admin user already exists");
        return Ok(false);
    }

    let password = password.to_string();
    let password_hash =
        tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
            .await??;

    store.insert_admin_user(username, &password_hash).await?;
    tracing::info!(username = %username, "admin user created");
    Ok(true)
}

// ============================================================================
// Middleware
// ============================================================================

/// Rejects the request with 401 before the wrapped handler runs unless it
/// carries a valid session cookie.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = session_token(request.headers())
        .map(|token| verify_token(&token, state.config.admin_username.as_deref()))
        .unwrap_or(false);

    if !authenticated {
        tracing::debug!(uri = %request.uri(), "rejecting unauthenticated admin request");
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}
