use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::db::models::{deserialize_active_flag, Quote, QuoteInput};
use crate::db::Visibility;
use crate::error::{ApiError, MessageResponse};
use crate::routes::admin::required;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "deserialize_active_flag")]
    pub is_active: Option<bool>,
}

impl QuotePayload {
    fn into_input(self) -> Result<QuoteInput, ApiError> {
        Ok(QuoteInput {
            text: required(self.text, "text")?,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Quote not found".to_string())
}

/// GET /api/admin/quotes
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Quote>>, ApiError> {
    Ok(Json(state.store.list_quotes(Visibility::All).await?))
}

/// POST /api/admin/quotes
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<QuotePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Quote>), ApiError> {
    let Json(payload) = payload?;
    let quote = state.store.insert_quote(&payload.into_input()?).await?;
    tracing::info!(id = quote.id, "quote created");
    Ok((StatusCode::CREATED, Json(quote)))
}

/// PUT /api/admin/quotes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<QuotePayload>, JsonRejection>,
) -> Result<Json<Quote>, ApiError> {
    let Json(payload) = payload?;
    let quote = state
        .store
        .update_quote(id, &payload.into_input()?)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(quote))
}

/// DELETE /api/admin/quotes/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete_quote(id).await? {
        return Err(not_found());
    }
    tracing::info!(id, "quote deleted");
    Ok(Json(MessageResponse::new("Quote deleted successfully")))
}
