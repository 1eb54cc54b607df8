//! Content Store seam: everything the service reads or writes goes through
//! [`ContentStore`], so the Postgres backend and the in-memory backend are
//! interchangeable behind an `Arc<dyn ContentStore>`.

use async_trait::async_trait;
use std::time::Duration;

use crate::db::models::{
    AdminUser, ContactLink, ContactLinkInput, FacebookPost, FacebookPostInput, Link, LinkInput,
    Quote, QuoteInput, SiteSettings, SiteSettingsInput,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection could be obtained (or none is configured).
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classifies pool/connection failures as unavailability rather than
    /// query failures.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => StoreError::Unavailable(err.to_string()),
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which rows a list query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Every row, for the admin dashboard.
    All,
    /// Only rows whose active flag is set, for public read models.
    ActiveOnly,
}

impl Visibility {
    pub fn admits(&self, is_active: bool) -> bool {
        match self {
            Visibility::All => true,
            Visibility::ActiveOnly => is_active,
        }
    }
}

/// Ordering contract for implementors:
/// - quotes and links: `created_at` ascending
/// - facebook posts and contact links: `(sort_order, created_at)` ascending
///
/// `update_*` returns `Ok(None)` and `delete_*` returns `Ok(false)` when no
/// row has the given id.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn site_settings(&self) -> StoreResult<Option<SiteSettings>>;
    async fn upsert_site_settings(&self, input: &SiteSettingsInput) -> StoreResult<SiteSettings>;

    async fn list_quotes(&self, visibility: Visibility) -> StoreResult<Vec<Quote>>;
    async fn insert_quote(&self, input: &QuoteInput) -> StoreResult<Quote>;
    async fn update_quote(&self, id: i32, input: &QuoteInput) -> StoreResult<Option<Quote>>;
    async fn delete_quote(&self, id: i32) -> StoreResult<bool>;

    async fn list_links(&self, visibility: Visibility) -> StoreResult<Vec<Link>>;
    async fn insert_link(&self, input: &LinkInput) -> StoreResult<Link>;
    async fn update_link(&self, id: i32, input: &LinkInput) -> StoreResult<Option<Link>>;
    async fn delete_link(&self, id: i32) -> StoreResult<bool>;

    async fn list_facebook_posts(&self, visibility: Visibility) -> StoreResult<Vec<FacebookPost>>;
    async fn insert_facebook_post(&self, input: &FacebookPostInput) -> StoreResult<FacebookPost>;
    async fn update_facebook_post(
        &self,
        id: i32,
        input: &FacebookPostInput,
    ) -> StoreResult<Option<FacebookPost>>;
    async fn delete_facebook_post(&self, id: i32) -> StoreResult<bool>;

    async fn list_contact_links(&self, visibility: Visibility) -> StoreResult<Vec<ContactLink>>;
    async fn insert_contact_link(&self, input: &ContactLinkInput) -> StoreResult<ContactLink>;
    async fn update_contact_link(
        &self,
        id: i32,
        input: &ContactLinkInput,
    ) -> StoreResult<Option<ContactLink>>;
    async fn delete_contact_link(&self, id: i32) -> StoreResult<bool>;

    async fn find_admin_user(&self, username: &str) -> StoreResult<Option<AdminUser>>;
    async fn insert_admin_user(&self, username: &str, password_hash: &str)
        -> StoreResult<AdminUser>;

    /// Round-trip latency check used by the health endpoint.
    async fn ping(&self) -> StoreResult<Duration>;
}
