use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::db::models::{deserialize_active_flag, ContactLink, ContactLinkInput, LinkType};
use crate::db::Visibility;
use crate::error::{ApiError, MessageResponse};
use crate::routes::admin::{optional, required};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactLinkPayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub link_name: Option<String>,
    #[serde(default)]
    pub link_type: Option<String>,
    #[serde(default)]
    pub link_value: Option<String>,
    #[serde(default)]
    pub link_image: Option<String>,
    #[serde(default, deserialize_with = "deserialize_active_flag")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl ContactLinkPayload {
    fn into_input(self) -> Result<ContactLinkInput, ApiError> {
        let text = required(self.text, "text")?;
        let link_name = required(self.link_name, "linkName")?;
        let raw_type = required(self.link_type, "linkType")?;
        let link_value = required(self.link_value, "linkValue")?;

        let link_type = LinkType::parse(&raw_type).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid linkType {:?}. Must be one of: call, email, url",
                raw_type
            ))
        })?;

        Ok(ContactLinkInput {
            text,
            link_name,
            link_type,
            link_value,
            link_image: optional(self.link_image),
            is_active: self.is_active.unwrap_or(true),
            sort_order: self.sort_order,
        })
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Contact link not found".to_string())
}

/// GET /api/admin/contact-links
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ContactLink>>, ApiError> {
    Ok(Json(state.store.list_contact_links(Visibility::All).await?))
}

/// POST /api/admin/contact-links
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ContactLinkPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactLink>), ApiError> {
    let Json(payload) = payload?;
    let link = state
        .store
        .insert_contact_link(&payload.into_input()?)
        .await?;
    tracing::info!(id = link.id, link_type = %link.link_type, "contact link created");
    Ok((StatusCode::CREATED, Json(link)))
}

/// PUT /api/admin/contact-links/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<ContactLinkPayload>, JsonRejection>,
) -> Result<Json<ContactLink>, ApiError> {
    let Json(payload) = payload?;
    let link = state
        .store
        .update_contact_link(id, &payload.into_input()?)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(link))
}

/// DELETE /api/admin/contact-links/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete_contact_link(id).await? {
        return Err(not_found());
    }
    tracing::info!(id, "contact link deleted");
    Ok(Json(MessageResponse::new("Contact link deleted successfully")))
}
