//! Database Models - rows of the content tables and the inputs used to write them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;

/// Title used whenever no site settings row exists (or its title is blank).
pub const DEFAULT_SITE_TITLE: &str = "North Country Cooling";

/// Site settings singleton row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub id: i32,
    pub title: String,
    pub sub_title: Option<String>,
    pub main_content_1: Option<String>,
    pub main_content_2: Option<String>,
    pub learn_more_text: Option<String>,
    pub contact_me_content: Option<String>,
    pub call_me: Option<String>,
    pub email_me: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by the settings upsert
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteSettingsInput {
    pub title: String,
    pub sub_title: Option<String>,
    pub main_content_1: Option<String>,
    pub main_content_2: Option<String>,
    pub learn_more_text: Option<String>,
    pub contact_me_content: Option<String>,
    pub call_me: Option<String>,
    pub email_me: Option<String>,
}

/// Testimonial quote
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: i32,
    pub text: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteInput {
    pub text: String,
    pub is_active: bool,
}

/// Outbound "learn more" link with optional manual preview overrides.
///
/// `images` holds the JSON-encoded array exactly as stored; it is decoded
/// on the way out so API consumers always see an array (or null).
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: i32,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_images")]
    pub images: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    pub fn decoded_images(&self) -> Option<Vec<String>> {
        decode_images(self.images.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkInput {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Already JSON-encoded, see [`encode_images`].
    pub images: Option<String>,
    pub is_active: bool,
}

/// Embedded Facebook post
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FacebookPost {
    pub id: i32,
    pub embed_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacebookPostInput {
    pub embed_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    /// `None` keeps the current position (or takes the next one on insert).
    pub sort_order: Option<i32>,
}

/// Kind of contact action a contact link triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Call,
    Email,
    Url,
}

impl LinkType {
    pub const ALL: [LinkType; 3] = [LinkType::Call, LinkType::Email, LinkType::Url];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Call => "call",
            LinkType::Email => "email",
            LinkType::Url => "url",
        }
    }

    /// Exact, case-sensitive match against the closed set.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact method shown on the contact page
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactLink {
    pub id: i32,
    pub text: String,
    pub link_name: String,
    pub link_type: String,
    pub link_value: String,
    pub link_image: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactLinkInput {
    pub text: String,
    pub link_name: String,
    pub link_type: LinkType,
    pub link_value: String,
    pub link_image: Option<String>,
    pub is_active: bool,
    pub sort_order: Option<i32>,
}

/// Admin credential row. The hash never leaves the process.
#[derive(Debug, Clone, FromRow, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Active flag
// ============================================================================

/// Legacy rows stored the flag as text; only the exact string `"true"` was
/// ever shown publicly.
pub fn is_visible_flag(raw: &str) -> bool {
    raw == "true"
}

/// Accepts `isActive` as a JSON boolean or as the legacy string form.
/// Anything other than `true` / `"true"` is inactive; absent stays `None`.
pub fn deserialize_active_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::String(s)) => Some(is_visible_flag(&s)),
        Some(_) => Some(false),
    })
}

// ============================================================================
// Link images
// ============================================================================

pub fn encode_images(images: &[String]) -> Option<String> {
    serde_json::to_string(images).ok()
}

/// Absent or malformed stored images degrade to `None`.
pub fn decode_images(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(images) => Some(images),
        Err(e) => {
            tracing::debug!(error = %e, "stored link images are not a JSON string array");
            None
        }
    }
}

fn serialize_images<S>(images: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    decode_images(images.as_deref()).serialize(serializer)
}
