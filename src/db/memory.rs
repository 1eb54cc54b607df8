//! In-process [`ContentStore`] used when no `DATABASE_URL` is configured
//! (local development) and as the store behind handler tests.
//!
//! Follows the same ordering and not-found contract as the Postgres store.
//! Nothing survives a restart.

use async_trait::async_trait;
use chrono::Utc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::db::models::{
    AdminUser, ContactLink, ContactLinkInput, FacebookPost, FacebookPostInput, Link, LinkInput,
    Quote, QuoteInput, SiteSettings, SiteSettingsInput,
};
use crate::db::store::{ContentStore, StoreError, StoreResult, Visibility};

#[derive(Default)]
struct Tables {
    settings: Option<SiteSettings>,
    quotes: Vec<Quote>,
    links: Vec<Link>,
    facebook_posts: Vec<FacebookPost>,
    contact_links: Vec<ContactLink>,
    admin_users: Vec<AdminUser>,
    next_id: i32,
    next_sort_order: i32,
}

impl Tables {
    fn id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn sort_order(&mut self, requested: Option<i32>) -> i32 {
        self.next_sort_order += 1;
        requested.unwrap_or(self.next_sort_order)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn visible<T: Clone>(rows: &[T], visibility: Visibility, is_active: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter()
        .filter(|row| visibility.admits(is_active(row)))
        .cloned()
        .collect()
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn site_settings(&self) -> StoreResult<Option<SiteSettings>> {
        Ok(self.tables.read().await.settings.clone())
    }

    async fn upsert_site_settings(&self, input: &SiteSettingsInput) -> StoreResult<SiteSettings> {
        let mut tables = self.tables.write().await;
        let row = SiteSettings {
            id: 1,
            title: input.title.clone(),
            sub_title: input.sub_title.clone(),
            main_content_1: input.main_content_1.clone(),
            main_content_2: input.main_content_2.clone(),
            learn_more_text: input.learn_more_text.clone(),
            contact_me_content: input.contact_me_content.clone(),
            call_me: input.call_me.clone(),
            email_me: input.email_me.clone(),
            updated_at: Utc::now(),
        };
        tables.settings = Some(row.clone());
        Ok(row)
    }

    async fn list_quotes(&self, visibility: Visibility) -> StoreResult<Vec<Quote>> {
        let tables = self.tables.read().await;
        let mut rows = visible(&tables.quotes, visibility, |q| q.is_active);
        rows.sort_by_key(|q| (q.created_at, q.id));
        Ok(rows)
    }

    async fn insert_quote(&self, input: &QuoteInput) -> StoreResult<Quote> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = Quote {
            id: tables.id(),
            text: input.text.clone(),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.quotes.push(row.clone());
        Ok(row)
    }

    async fn update_quote(&self, id: i32, input: &QuoteInput) -> StoreResult<Option<Quote>> {
        let mut tables = self.tables.write().await;
        Ok(tables.quotes.iter_mut().find(|q| q.id == id).map(|q| {
            q.text = input.text.clone();
            q.is_active = input.is_active;
            q.updated_at = Utc::now();
            q.clone()
        }))
    }

    async fn delete_quote(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.quotes.len();
        tables.quotes.retain(|q| q.id != id);
        Ok(tables.quotes.len() != before)
    }

    async fn list_links(&self, visibility: Visibility) -> StoreResult<Vec<Link>> {
        let tables = self.tables.read().await;
        let mut rows = visible(&tables.links, visibility, |l| l.is_active);
        rows.sort_by_key(|l| (l.created_at, l.id));
        Ok(rows)
    }

    async fn insert_link(&self, input: &LinkInput) -> StoreResult<Link> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = Link {
            id: tables.id(),
            url: input.url.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            images: input.images.clone(),
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.links.push(row.clone());
        Ok(row)
    }

    async fn update_link(&self, id: i32, input: &LinkInput) -> StoreResult<Option<Link>> {
        let mut tables = self.tables.write().await;
        Ok(tables.links.iter_mut().find(|l| l.id == id).map(|l| {
            l.url = input.url.clone();
            l.title = input.title.clone();
            l.description = input.description.clone();
            l.images = input.images.clone();
            l.is_active = input.is_active;
            l.updated_at = Utc::now();
            l.clone()
        }))
    }

    async fn delete_link(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.links.len();
        tables.links.retain(|l| l.id != id);
        Ok(tables.links.len() != before)
    }

    async fn list_facebook_posts(&self, visibility: Visibility) -> StoreResult<Vec<FacebookPost>> {
        let tables = self.tables.read().await;
        let mut rows = visible(&tables.facebook_posts, visibility, |p| p.is_active);
        rows.sort_by_key(|p| (p.sort_order, p.created_at, p.id));
        Ok(rows)
    }

    async fn insert_facebook_post(&self, input: &FacebookPostInput) -> StoreResult<FacebookPost> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = FacebookPost {
            id: tables.id(),
            embed_url: input.embed_url.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            is_active: input.is_active,
            sort_order: tables.sort_order(input.sort_order),
            created_at: now,
            updated_at: now,
        };
        tables.facebook_posts.push(row.clone());
        Ok(row)
    }

    async fn update_facebook_post(
        &self,
        id: i32,
        input: &FacebookPostInput,
    ) -> StoreResult<Option<FacebookPost>> {
        let mut tables = self.tables.write().await;
        Ok(tables.facebook_posts.iter_mut().find(|p| p.id == id).map(|p| {
            p.embed_url = input.embed_url.clone();
            p.title = input.title.clone();
            p.description = input.description.clone();
            p.is_active = input.is_active;
            if let Some(order) = input.sort_order {
                p.sort_order = order;
            }
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_facebook_post(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.facebook_posts.len();
        tables.facebook_posts.retain(|p| p.id != id);
        Ok(tables.facebook_posts.len() != before)
    }

    async fn list_contact_links(&self, visibility: Visibility) -> StoreResult<Vec<ContactLink>> {
        let tables = self.tables.read().await;
        let mut rows = visible(&tables.contact_links, visibility, |c| c.is_active);
        rows.sort_by_key(|c| (c.sort_order, c.created_at, c.id));
        Ok(rows)
    }

    async fn insert_contact_link(&self, input: &ContactLinkInput) -> StoreResult<ContactLink> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = ContactLink {
            id: tables.id(),
            text: input.text.clone(),
            link_name: input.link_name.clone(),
            link_type: input.link_type.as_str().to_string(),
            link_value: input.link_value.clone(),
            link_image: input.link_image.clone(),
            is_active: input.is_active,
            sort_order: tables.sort_order(input.sort_order),
            created_at: now,
            updated_at: now,
        };
        tables.contact_links.push(row.clone());
        Ok(row)
    }

    async fn update_contact_link(
        &self,
        id: i32,
        input: &ContactLinkInput,
    ) -> StoreResult<Option<ContactLink>> {
        let mut tables = self.tables.write().await;
        Ok(tables.contact_links.iter_mut().find(|c| c.id == id).map(|c| {
            c.text = input.text.clone();
            c.link_name = input.link_name.clone();
            c.link_type = input.link_type.as_str().to_string();
            c.link_value = input.link_value.clone();
            c.link_image = input.link_image.clone();
            c.is_active = input.is_active;
            if let Some(order) = input.sort_order {
                c.sort_order = order;
            }
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn delete_contact_link(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.contact_links.len();
        tables.contact_links.retain(|c| c.id != id);
        Ok(tables.contact_links.len() != before)
    }

    async fn find_admin_user(&self, username: &str) -> StoreResult<Option<AdminUser>> {
        let tables = self.tables.read().await;
        Ok(tables
            .admin_users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_admin_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> StoreResult<AdminUser> {
        let mut tables = self.tables.write().await;
        if tables.admin_users.iter().any(|u| u.username == username) {
            return Err(StoreError::Database(sqlx::Error::Protocol(format!(
                "admin user '{}' already exists",
                username
            ))));
        }
        let row = AdminUser {
            id: tables.id(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.admin_users.push(row.clone());
        Ok(row)
    }

    async fn ping(&self) -> StoreResult<Duration> {
        let start = Instant::now();
        let _ = self.tables.read().await;
        Ok(start.elapsed())
    }
}
