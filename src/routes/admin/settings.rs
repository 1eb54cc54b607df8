use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{SiteSettings, SiteSettingsInput, DEFAULT_SITE_TITLE};
use crate::error::ApiError;
use crate::routes::admin::{optional, required};
use crate::state::AppState;

/// Settings as the dashboard form sends them, and as it receives them when
/// nothing has been saved yet.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sub_title: Option<String>,
    #[serde(default)]
    pub main_content_1: Option<String>,
    #[serde(default)]
    pub main_content_2: Option<String>,
    #[serde(default)]
    pub learn_more_text: Option<String>,
    #[serde(default)]
    pub contact_me_content: Option<String>,
    #[serde(default)]
    pub call_me: Option<String>,
    #[serde(default)]
    pub email_me: Option<String>,
}

impl SettingsPayload {
    fn unsaved() -> Self {
        let empty = || Some(String::new());
        Self {
            title: Some(DEFAULT_SITE_TITLE.to_string()),
            sub_title: empty(),
            main_content_1: empty(),
            main_content_2: empty(),
            learn_more_text: empty(),
            contact_me_content: empty(),
            call_me: empty(),
            email_me: empty(),
        }
    }

    fn into_input(self) -> Result<SiteSettingsInput, ApiError> {
        Ok(SiteSettingsInput {
            title: required(self.title, "title")?,
            sub_title: optional(self.sub_title),
            main_content_1: optional(self.main_content_1),
            main_content_2: optional(self.main_content_2),
            learn_more_text: optional(self.learn_more_text),
            contact_me_content: optional(self.contact_me_content),
            call_me: optional(self.call_me),
            email_me: optional(self.email_me),
        })
    }
}

/// GET /api/admin/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Response, ApiError> {
    let settings: Option<SiteSettings> = state.store.site_settings().await?;
    Ok(match settings {
        Some(row) => Json(row).into_response(),
        None => Json(SettingsPayload::unsaved()).into_response(),
    })
}

/// POST /api/admin/settings
/// Creates the settings row on first save and overwrites it afterwards.
pub async fn save_settings(
    State(state): State<AppState>,
    payload: Result<Json<SettingsPayload>, JsonRejection>,
) -> Result<Json<SiteSettings>, ApiError> {
    let Json(payload) = payload?;
    let input = payload.into_input()?;
    let saved = state.store.upsert_site_settings(&input).await?;
    tracing::info!("site settings updated");
    Ok(Json(saved))
}
