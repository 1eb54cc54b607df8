/**
 * Admin Routes
 * Session-protected CRUD over site content
 */
pub mod contact_links;
pub mod facebook_posts;
pub mod links;
pub mod quotes;
pub mod settings;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::auth::require_admin;
use crate::error::ApiError;
use crate::state::AppState;

/// Every route here sits behind [`require_admin`]; unknown methods on a known
/// path still get 405 from the method router.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(settings::get_settings).post(settings::save_settings),
        )
        .route("/quotes", get(quotes::list).post(quotes::create))
        .route("/quotes/{id}", put(quotes::update).delete(quotes::remove))
        .route("/links", get(links::list).post(links::create))
        .route("/links/{id}", put(links::update).delete(links::remove))
        .route(
            "/facebook-posts",
            get(facebook_posts::list).post(facebook_posts::create),
        )
        .route("/facebook-posts/convert", post(facebook_posts::convert))
        .route(
            "/facebook-posts/{id}",
            put(facebook_posts::update).delete(facebook_posts::remove),
        )
        .route(
            "/contact-links",
            get(contact_links::list).post(contact_links::create),
        )
        .route(
            "/contact-links/{id}",
            put(contact_links::update).delete(contact_links::remove),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// A trimmed, non-empty value or a 400 naming the field.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}

/// Blank strings are stored as NULL.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
