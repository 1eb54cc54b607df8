//! Postgres-backed [`ContentStore`].

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::{Duration, Instant};

use crate::db::models::{
    AdminUser, ContactLink, ContactLinkInput, FacebookPost, FacebookPostInput, Link, LinkInput,
    Quote, QuoteInput, SiteSettings, SiteSettingsInput,
};
use crate::db::store::{ContentStore, StoreError, StoreResult, Visibility};

/// Fixed primary key of the settings singleton; every write targets it.
const SETTINGS_ID: i32 = 1;

const SETTINGS_COLUMNS: &str = "id, title, sub_title, main_content_1, main_content_2, \
     learn_more_text, contact_me_content, call_me, email_me, updated_at";
const QUOTE_COLUMNS: &str = "id, text, is_active, created_at, updated_at";
const LINK_COLUMNS: &str =
    "id, url, title, description, images, is_active, created_at, updated_at";
const FACEBOOK_POST_COLUMNS: &str =
    "id, embed_url, title, description, is_active, sort_order, created_at, updated_at";
const CONTACT_LINK_COLUMNS: &str = "id, text, link_name, link_type, link_value, link_image, \
     is_active, sort_order, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `WHERE` fragment for a list query.
fn visibility_clause(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::All => "",
        Visibility::ActiveOnly => "WHERE is_active = true",
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn site_settings(&self) -> StoreResult<Option<SiteSettings>> {
        let sql = format!("SELECT {SETTINGS_COLUMNS} FROM site_settings ORDER BY id LIMIT 1");
        sqlx::query_as::<_, SiteSettings>(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn upsert_site_settings(&self, input: &SiteSettingsInput) -> StoreResult<SiteSettings> {
        let sql = format!(
            r#"
            INSERT INTO site_settings (id, title, sub_title, main_content_1, main_content_2,
                learn_more_text, contact_me_content, call_me, email_me, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                sub_title = EXCLUDED.sub_title,
                main_content_1 = EXCLUDED.main_content_1,
                main_content_2 = EXCLUDED.main_content_2,
                learn_more_text = EXCLUDED.learn_more_text,
                contact_me_content = EXCLUDED.contact_me_content,
                call_me = EXCLUDED.call_me,
                email_me = EXCLUDED.email_me,
                updated_at = now()
            RETURNING {SETTINGS_COLUMNS}
            "#
        );
        sqlx::query_as::<_, SiteSettings>(&sql)
            .bind(SETTINGS_ID)
            .bind(&input.title)
            .bind(&input.sub_title)
            .bind(&input.main_content_1)
            .bind(&input.main_content_2)
            .bind(&input.learn_more_text)
            .bind(&input.contact_me_content)
            .bind(&input.call_me)
            .bind(&input.email_me)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn list_quotes(&self, visibility: Visibility) -> StoreResult<Vec<Quote>> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes {} ORDER BY created_at, id",
            visibility_clause(visibility)
        );
        sqlx::query_as::<_, Quote>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_quote(&self, input: &QuoteInput) -> StoreResult<Quote> {
        let sql = format!(
            "INSERT INTO quotes (text, is_active) VALUES ($1, $2) RETURNING {QUOTE_COLUMNS}"
        );
        sqlx::query_as::<_, Quote>(&sql)
            .bind(&input.text)
            .bind(input.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_quote(&self, id: i32, input: &QuoteInput) -> StoreResult<Option<Quote>> {
        let sql = format!(
            r#"
            UPDATE quotes SET text = $1, is_active = $2, updated_at = now()
            WHERE id = $3
            RETURNING {QUOTE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Quote>(&sql)
            .bind(&input.text)
            .bind(input.is_active)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_quote(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_links(&self, visibility: Visibility) -> StoreResult<Vec<Link>> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links {} ORDER BY created_at, id",
            visibility_clause(visibility)
        );
        sqlx::query_as::<_, Link>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_link(&self, input: &LinkInput) -> StoreResult<Link> {
        let sql = format!(
            r#"
            INSERT INTO links (url, title, description, images, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LINK_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Link>(&sql)
            .bind(&input.url)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.images)
            .bind(input.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_link(&self, id: i32, input: &LinkInput) -> StoreResult<Option<Link>> {
        let sql = format!(
            r#"
            UPDATE links
            SET url = $1, title = $2, description = $3, images = $4, is_active = $5,
                updated_at = now()
            WHERE id = $6
            RETURNING {LINK_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Link>(&sql)
            .bind(&input.url)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.images)
            .bind(input.is_active)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_link(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_facebook_posts(&self, visibility: Visibility) -> StoreResult<Vec<FacebookPost>> {
        let sql = format!(
            "SELECT {FACEBOOK_POST_COLUMNS} FROM facebook_posts {} \
             ORDER BY sort_order, created_at, id",
            visibility_clause(visibility)
        );
        sqlx::query_as::<_, FacebookPost>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_facebook_post(&self, input: &FacebookPostInput) -> StoreResult<FacebookPost> {
        // A NULL sort_order would violate NOT NULL, so fall back to the serial default.
        let sql = format!(
            r#"
            INSERT INTO facebook_posts (embed_url, title, description, is_active, sort_order)
            VALUES ($1, $2, $3, $4,
                COALESCE($5, nextval(pg_get_serial_sequence('facebook_posts', 'sort_order'))::INTEGER))
            RETURNING {FACEBOOK_POST_COLUMNS}
            "#
        );
        sqlx::query_as::<_, FacebookPost>(&sql)
            .bind(&input.embed_url)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_facebook_post(
        &self,
        id: i32,
        input: &FacebookPostInput,
    ) -> StoreResult<Option<FacebookPost>> {
        let sql = format!(
            r#"
            UPDATE facebook_posts
            SET embed_url = $1, title = $2, description = $3, is_active = $4,
                sort_order = COALESCE($5, sort_order), updated_at = now()
            WHERE id = $6
            RETURNING {FACEBOOK_POST_COLUMNS}
            "#
        );
        sqlx::query_as::<_, FacebookPost>(&sql)
            .bind(&input.embed_url)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.is_active)
            .bind(input.sort_order)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_facebook_post(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM facebook_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_contact_links(&self, visibility: Visibility) -> StoreResult<Vec<ContactLink>> {
        let sql = format!(
            "SELECT {CONTACT_LINK_COLUMNS} FROM contact_links {} \
             ORDER BY sort_order, created_at, id",
            visibility_clause(visibility)
        );
        sqlx::query_as::<_, ContactLink>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_contact_link(&self, input: &ContactLinkInput) -> StoreResult<ContactLink> {
        let sql = format!(
            r#"
            INSERT INTO contact_links
                (text, link_name, link_type, link_value, link_image, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6,
                COALESCE($7, nextval(pg_get_serial_sequence('contact_links', 'sort_order'))::INTEGER))
            RETURNING {CONTACT_LINK_COLUMNS}
            "#
        );
        sqlx::query_as::<_, ContactLink>(&sql)
            .bind(&input.text)
            .bind(&input.link_name)
            .bind(input.link_type.as_str())
            .bind(&input.link_value)
            .bind(&input.link_image)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn update_contact_link(
        &self,
        id: i32,
        input: &ContactLinkInput,
    ) -> StoreResult<Option<ContactLink>> {
        let sql = format!(
            r#"
            UPDATE contact_links
            SET text = $1, link_name = $2, link_type = $3, link_value = $4, link_image = $5,
                is_active = $6, sort_order = COALESCE($7, sort_order), updated_at = now()
            WHERE id = $8
            RETURNING {CONTACT_LINK_COLUMNS}
            "#
        );
        sqlx::query_as::<_, ContactLink>(&sql)
            .bind(&input.text)
            .bind(&input.link_name)
            .bind(input.link_type.as_str())
            .bind(&input.link_value)
            .bind(&input.link_image)
            .bind(input.is_active)
            .bind(input.sort_order)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_contact_link(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM contact_links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_admin_user(&self, username: &str) -> StoreResult<Option<AdminUser>> {
        sqlx::query_as::<_, AdminUser>(
            "SELECT id, username, password_hash, created_at FROM admin_users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn insert_admin_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> StoreResult<AdminUser> {
        sqlx::query_as::<_, AdminUser>(
            r#"
            INSERT INTO admin_users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)
    }

    async fn ping(&self) -> StoreResult<Duration> {
        let start = Instant::now();
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(start.elapsed())
    }
}
