use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{deserialize_active_flag, FacebookPost, FacebookPostInput};
use crate::db::Visibility;
use crate::error::{ApiError, MessageResponse};
use crate::facebook::{self, EmbedOptions};
use crate::routes::admin::{optional, required};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookPostPayload {
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_active_flag")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl FacebookPostPayload {
    fn into_input(self) -> Result<FacebookPostInput, ApiError> {
        let embed_url = required(self.embed_url, "embedUrl")?;
        Ok(FacebookPostInput {
            embed_url: embeddable(&embed_url)?,
            title: optional(self.title),
            description: optional(self.description),
            is_active: self.is_active.unwrap_or(true),
            sort_order: self.sort_order,
        })
    }
}

/// Embed URLs are stored as given; plain post URLs are converted first.
fn embeddable(url: &str) -> Result<String, ApiError> {
    if facebook::is_embed_url(url) {
        return Ok(url.to_string());
    }
    if !facebook::is_valid(url) {
        return Err(ApiError::BadRequest(
            "embedUrl must be a Facebook embed URL or a facebook.com/<page>/posts/<id> URL"
                .to_string(),
        ));
    }
    facebook::normalize(url, EmbedOptions::default()).map_err(|e| ApiError::BadRequest(e.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub show_text: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub embed_url: String,
    pub page_name: Option<String>,
    pub post_id: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Facebook post not found".to_string())
}

/// GET /api/admin/facebook-posts
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<FacebookPost>>, ApiError> {
    Ok(Json(state.store.list_facebook_posts(Visibility::All).await?))
}

/// POST /api/admin/facebook-posts
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<FacebookPostPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<FacebookPost>), ApiError> {
    let Json(payload) = payload?;
    let post = state
        .store
        .insert_facebook_post(&payload.into_input()?)
        .await?;
    tracing::info!(id = post.id, sort_order = post.sort_order, "facebook post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/admin/facebook-posts/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<FacebookPostPayload>, JsonRejection>,
) -> Result<Json<FacebookPost>, ApiError> {
    let Json(payload) = payload?;
    let post = state
        .store
        .update_facebook_post(id, &payload.into_input()?)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(post))
}

/// DELETE /api/admin/facebook-posts/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete_facebook_post(id).await? {
        return Err(not_found());
    }
    tracing::info!(id, "facebook post deleted");
    Ok(Json(MessageResponse::new("Facebook post deleted successfully")))
}

/// POST /api/admin/facebook-posts/convert
/// Previews the embed URL for a shared post link without saving anything.
pub async fn convert(
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let Json(payload) = payload?;
    let url = required(payload.url, "url")?;

    let defaults = EmbedOptions::default();
    let options = EmbedOptions {
        width: payload.width.unwrap_or(defaults.width),
        height: payload.height.unwrap_or(defaults.height),
        show_text: payload.show_text.unwrap_or(defaults.show_text),
    };
    let embed_url =
        facebook::normalize(&url, options).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(Json(ConvertResponse {
        embed_url,
        page_name: facebook::extract_page_name(&url),
        post_id: facebook::extract_post_id(&url),
    }))
}

#[cfg(test)]
mod tests {
    use crate::db::MemoryStore;
    use crate::routes::test_support::{admin_cookie, app_with, get, send_json};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    const EMBED: &str = "https://www.facebook.com/plugins/post.php?href=https%3A%2F%2Fwww.facebook.com%2FPage%2Fposts%2F1&width=350&show_text=true&height=480&appId";

    #[tokio::test]
    async fn test_create_accepts_embed_or_post_url() {
        let store = Arc::new(MemoryStore::new());
        let cookie = admin_cookie();

        let (status, _, first) = send_json(
            app_with(store.clone()),
            Method::POST,
            "/api/admin/facebook-posts",
            json!({"embedUrl": EMBED, "title": "Spring tune-up"}),
            Some(&cookie),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["embedUrl"], EMBED);

        let (status, _, second) = send_json(
            app_with(store.clone()),
            Method::POST,
            "/api/admin/facebook-posts",
            json!({"embedUrl": "m.facebook.com/Page/posts/2"}),
            Some(&cookie),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(second["embedUrl"]
            .as_str()
            .unwrap()
            .contains("href=https%3A%2F%2Fwww.facebook.com%2FPage%2Fposts%2F2"));
        assert!(second["sortOrder"].as_i64().unwrap() > first["sortOrder"].as_i64().unwrap());

        let (_, _, public) = get(app_with(store), "/api/facebook-posts", None).await;
        let ids: Vec<i64> = public
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect();
        assert_eq!(
            ids,
            vec![first["id"].as_i64().unwrap(), second["id"].as_i64().unwrap()]
        );
    }

    #[tokio::test]
    async fn test_create_rejects_non_facebook_urls() {
        let cookie = admin_cookie();
        for body in [
            json!({}),
            json!({"embedUrl": "https://example.com/Page/posts/1"}),
            json!({"embedUrl": "https://www.facebook.com/Page/about"}),
        ] {
            let (status, _, _) = send_json(
                app_with(Arc::new(MemoryStore::new())),
                Method::POST,
                "/api/admin/facebook-posts",
                body.clone(),
                Some(&cookie),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        }
    }

    #[tokio::test]
    async fn test_update_can_reorder() {
        let store = Arc::new(MemoryStore::new());
        let cookie = admin_cookie();
        let mut ids = Vec::new();
        for _ in 0..2 {
            let (_, _, created) = send_json(
                app_with(store.clone()),
                Method::POST,
                "/api/admin/facebook-posts",
                json!({"embedUrl": EMBED}),
                Some(&cookie),
            )
            .await;
            ids.push(created["id"].as_i64().unwrap());
        }

        let (status, _, _) = send_json(
            app_with(store.clone()),
            Method::PUT,
            &format!("/api/admin/facebook-posts/{}", ids[1]),
            json!({"embedUrl": EMBED, "sortOrder": -1}),
            Some(&cookie),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, listed) = get(app_with(store), "/api/admin/facebook-posts", Some(&cookie)).await;
        assert_eq!(listed[0]["id"].as_i64().unwrap(), ids[1]);
    }

    #[tokio::test]
    async fn test_convert() {
        let cookie = admin_cookie();
        let (status, _, body) = send_json(
            app_with(Arc::new(MemoryStore::new())),
            Method::POST,
            "/api/admin/facebook-posts/convert",
            json!({"url": "https://www.facebook.com/Page/posts/abc123", "width": 500, "showText": false}),
            Some(&cookie),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["embedUrl"]
            .as_str()
            .unwrap()
            .contains("width=500&show_text=false&height=480"));
        assert_eq!(body["pageName"], "Page");
        assert_eq!(body["postId"], "abc123");

        let (status, _, body) = send_json(
            app_with(Arc::new(MemoryStore::new())),
            Method::POST,
            "/api/admin/facebook-posts/convert",
            json!({"url": "https://www.facebook.com/Page/about"}),
            Some(&cookie),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid Facebook URL format"));
    }
}
