use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::db::models::{deserialize_active_flag, encode_images, Link, LinkInput};
use crate::db::Visibility;
use crate::error::{ApiError, MessageResponse};
use crate::routes::admin::{optional, required};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayload {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Manual preview images; replaces whatever the page advertises.
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_active_flag")]
    pub is_active: Option<bool>,
}

impl LinkPayload {
    fn into_input(self) -> Result<LinkInput, ApiError> {
        let images: Vec<String> = self
            .images
            .unwrap_or_default()
            .into_iter()
            .map(|image| image.trim().to_string())
            .filter(|image| !image.is_empty())
            .collect();

        Ok(LinkInput {
            url: required(self.url, "url")?,
            title: optional(self.title),
            description: optional(self.description),
            images: if images.is_empty() {
                None
            } else {
                encode_images(&images)
            },
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Link not found".to_string())
}

/// GET /api/admin/links
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Link>>, ApiError> {
    Ok(Json(state.store.list_links(Visibility::All).await?))
}

/// POST /api/admin/links
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<LinkPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Link>), ApiError> {
    let Json(payload) = payload?;
    let link = state.store.insert_link(&payload.into_input()?).await?;
    tracing::info!(id = link.id, url = %link.url, "link created");
    Ok((StatusCode::CREATED, Json(link)))
}

/// PUT /api/admin/links/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<LinkPayload>, JsonRejection>,
) -> Result<Json<Link>, ApiError> {
    let Json(payload) = payload?;
    let link = state
        .store
        .update_link(id, &payload.into_input()?)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(link))
}

/// DELETE /api/admin/links/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete_link(id).await? {
        return Err(not_found());
    }
    tracing::info!(id, "link deleted");
    Ok(Json(MessageResponse::new("Link deleted successfully")))
}
