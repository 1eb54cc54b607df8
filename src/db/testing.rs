//! Store double whose every call fails, for exercising degrade paths.

use async_trait::async_trait;
use std::time::Duration;

use crate::db::models::{
    AdminUser, ContactLink, ContactLinkInput, FacebookPost, FacebookPostInput, Link, LinkInput,
    Quote, QuoteInput, SiteSettings, SiteSettingsInput,
};
use crate::db::store::{ContentStore, StoreError, StoreResult, Visibility};

pub struct FailingStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl ContentStore for FailingStore {
    async fn site_settings(&self) -> StoreResult<Option<SiteSettings>> {
        down()
    }
    async fn upsert_site_settings(&self, _: &SiteSettingsInput) -> StoreResult<SiteSettings> {
        down()
    }

    async fn list_quotes(&self, _: Visibility) -> StoreResult<Vec<Quote>> {
        down()
    }
    async fn insert_quote(&self, _: &QuoteInput) -> StoreResult<Quote> {
        down()
    }
    async fn update_quote(&self, _: i32, _: &QuoteInput) -> StoreResult<Option<Quote>> {
        down()
    }
    async fn delete_quote(&self, _: i32) -> StoreResult<bool> {
        down()
    }

    async fn list_links(&self, _: Visibility) -> StoreResult<Vec<Link>> {
        down()
    }
    async fn insert_link(&self, _: &LinkInput) -> StoreResult<Link> {
        down()
    }
    async fn update_link(&self, _: i32, _: &LinkInput) -> StoreResult<Option<Link>> {
        down()
    }
    async fn delete_link(&self, _: i32) -> StoreResult<bool> {
        down()
    }

    async fn list_facebook_posts(&self, _: Visibility) -> StoreResult<Vec<FacebookPost>> {
        down()
    }
    async fn insert_facebook_post(&self, _: &FacebookPostInput) -> StoreResult<FacebookPost> {
        down()
    }
    async fn update_facebook_post(
        &self,
        _: i32,
        _: &FacebookPostInput,
    ) -> StoreResult<Option<FacebookPost>> {
        down()
    }
    async fn delete_facebook_post(&self, _: i32) -> StoreResult<bool> {
        down()
    }

    async fn list_contact_links(&self, _: Visibility) -> StoreResult<Vec<ContactLink>> {
        down()
    }
    async fn insert_contact_link(&self, _: &ContactLinkInput) -> StoreResult<ContactLink> {
        down()
    }
    async fn update_contact_link(
        &self,
        _: i32,
        _: &ContactLinkInput,
    ) -> StoreResult<Option<ContactLink>> {
        down()
    }
    async fn delete_contact_link(&self, _: i32) -> StoreResult<bool> {
        down()
    }

    async fn find_admin_user(&self, _: &str) -> StoreResult<Option<AdminUser>> {
        down()
    }
    async fn insert_admin_user(&self, _: &str, _: &str) -> StoreResult<AdminUser> {
        down()
    }

    async fn ping(&self) -> StoreResult<Duration> {
        down()
    }
}
