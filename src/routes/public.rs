/**
 * Public Routes
 * Unauthenticated read models behind the homepage, contact and learn-more pages
 */
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::state::AppState;

/// Short shared-cache lifetime for public read models.
pub const PUBLIC_CACHE_CONTROL: &str = "public, s-maxage=30, stale-while-revalidate=59";

fn cached<T: Serialize>(body: T) -> Response {
    ([(header::CACHE_CONTROL, PUBLIC_CACHE_CONTROL)], Json(body)).into_response()
}

/// GET /api/site-data
pub async fn site_data(State(state): State<AppState>) -> Response {
    cached(state.content.site_view().await)
}

/// GET /api/facebook-posts
pub async fn facebook_posts(State(state): State<AppState>) -> Response {
    cached(state.content.facebook_posts().await)
}

/// GET /api/links-data
pub async fn links_data(State(state): State<AppState>) -> Response {
    cached(state.content.raw_links().await)
}

/// GET /api/contact-links
pub async fn contact_links(State(state): State<AppState>) -> Response {
    cached(state.content.contact_links().await)
}

/// GET /api/link-previews
/// Active links resolved through the preview fetcher, in stored order.
pub async fn link_previews(State(state): State<AppState>) -> Response {
    let links = state.content.raw_links().await;
    let previews = state.previews.resolve_all(&links).await;
    tracing::debug!(count = previews.len(), "resolved link previews");
    cached(previews)
}
