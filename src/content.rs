//! Public read models assembled from the content store.
//!
//! Every method here returns a usable value: an unreachable store or an
//! empty table yields the default settings or an empty list, never an error.
//! Failures are logged at `warn` and swallowed so a page can always render.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::models::{ContactLink, FacebookPost, Link, SiteSettings, DEFAULT_SITE_TITLE};
use crate::db::{ContentStore, Visibility};

/// Homepage copy plus the active testimonial quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteView {
    pub title: String,
    pub sub_title: String,
    pub main_content_1: String,
    pub main_content_2: String,
    pub learn_more_text: String,
    pub contact_me_content: String,
    pub call_me: String,
    pub email_me: String,
    pub quotes: Vec<String>,
}

impl SiteView {
    /// The view served when no settings row exists or the store is down.
    pub fn fallback() -> Self {
        Self {
            title: DEFAULT_SITE_TITLE.to_string(),
            sub_title: String::new(),
            main_content_1: String::new(),
            main_content_2: String::new(),
            learn_more_text: String::new(),
            contact_me_content: String::new(),
            call_me: String::new(),
            email_me: String::new(),
            quotes: Vec::new(),
        }
    }

    fn from_settings(settings: SiteSettings, quotes: Vec<String>) -> Self {
        let title = if settings.title.trim().is_empty() {
            DEFAULT_SITE_TITLE.to_string()
        } else {
            settings.title
        };
        Self {
            title,
            sub_title: settings.sub_title.unwrap_or_default(),
            main_content_1: settings.main_content_1.unwrap_or_default(),
            main_content_2: settings.main_content_2.unwrap_or_default(),
            learn_more_text: settings.learn_more_text.unwrap_or_default(),
            contact_me_content: settings.contact_me_content.unwrap_or_default(),
            call_me: settings.call_me.unwrap_or_default(),
            email_me: settings.email_me.unwrap_or_default(),
            quotes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookPostView {
    pub id: i32,
    pub embed_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl From<FacebookPost> for FacebookPostView {
    fn from(post: FacebookPost) -> Self {
        Self {
            id: post.id,
            embed_url: post.embed_url,
            title: post.title,
            description: post.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactLinkView {
    pub id: i32,
    pub text: String,
    pub link_name: String,
    pub link_type: String,
    pub link_value: String,
    pub link_image: Option<String>,
    pub sort_order: i32,
}

impl From<ContactLink> for ContactLinkView {
    fn from(link: ContactLink) -> Self {
        Self {
            id: link.id,
            text: link.text,
            link_name: link.link_name,
            link_type: link.link_type,
            link_value: link.link_value,
            link_image: link.link_image,
            sort_order: link.sort_order,
        }
    }
}

/// A stored link with its preview overrides, images already decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkView {
    pub id: i32,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

impl From<Link> for LinkView {
    fn from(link: Link) -> Self {
        let images = link.decoded_images();
        Self {
            id: link.id,
            url: link.url,
            title: link.title,
            description: link.description,
            images,
        }
    }
}

#[derive(Clone)]
pub struct ContentAggregator {
    store: Arc<dyn ContentStore>,
}

impl ContentAggregator {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn site_view(&self) -> SiteView {
        let settings = match self.store.site_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "site settings unavailable, serving defaults");
                return SiteView::fallback();
            }
        };

        let quotes = match self.store.list_quotes(Visibility::ActiveOnly).await {
            Ok(quotes) => quotes.into_iter().map(|q| q.text).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "quotes unavailable, serving defaults");
                return SiteView::fallback();
            }
        };

        match settings {
            Some(settings) => SiteView::from_settings(settings, quotes),
            None => SiteView {
                quotes,
                ..SiteView::fallback()
            },
        }
    }

    pub async fn facebook_posts(&self) -> Vec<FacebookPostView> {
        match self.store.list_facebook_posts(Visibility::ActiveOnly).await {
            Ok(posts) => posts.into_iter().map(FacebookPostView::from).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "facebook posts unavailable");
                Vec::new()
            }
        }
    }

    pub async fn contact_links(&self) -> Vec<ContactLinkView> {
        match self.store.list_contact_links(Visibility::ActiveOnly).await {
            Ok(links) => links.into_iter().map(ContactLinkView::from).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "contact links unavailable");
                Vec::new()
            }
        }
    }

    pub async fn raw_links(&self) -> Vec<LinkView> {
        match self.store.list_links(Visibility::ActiveOnly).await {
            Ok(links) => links.into_iter().map(LinkView::from).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "links unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{
        encode_images, ContactLinkInput, FacebookPostInput, LinkInput, LinkType, QuoteInput,
        SiteSettingsInput,
    };
    use crate::db::testing::FailingStore;
    use crate::db::MemoryStore;

    fn aggregator(store: Arc<dyn ContentStore>) -> ContentAggregator {
        ContentAggregator::new(store)
    }

    fn link_input(url: &str, images: Option<String>) -> LinkInput {
        LinkInput {
            url: url.to_string(),
            title: None,
            description: None,
            images,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_empty_store_yields_defaults() {
        let content = aggregator(Arc::new(MemoryStore::new()));

        let view = content.site_view().await;
        assert_eq!(view.title, "North Country Cooling");
        assert_eq!(view.sub_title, "");
        assert_eq!(view.main_content_1, "");
        assert_eq!(view.main_content_2, "");
        assert_eq!(view.learn_more_text, "");
        assert_eq!(view.contact_me_content, "");
        assert_eq!(view.call_me, "");
        assert_eq!(view.email_me, "");
        assert!(view.quotes.is_empty());

        assert!(content.facebook_posts().await.is_empty());
        assert!(content.contact_links().await.is_empty());
        assert!(content.raw_links().await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_store_degrades_instead_of_erroring() {
        let content = aggregator(Arc::new(FailingStore));

        assert_eq!(content.site_view().await, SiteView::fallback());
        assert!(content.facebook_posts().await.is_empty());
        assert!(content.contact_links().await.is_empty());
        assert!(content.raw_links().await.is_empty());
    }

    #[tokio::test]
    async fn test_site_view_uses_settings_and_active_quotes_only() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert_site_settings(&SiteSettingsInput {
                title: "Cool Air Co".to_string(),
                call_me: Some("555-0100".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        for (text, is_active) in [("Great service", true), ("Hidden", false)] {
            store
                .insert_quote(&QuoteInput {
                    text: text.to_string(),
                    is_active,
                })
                .await
                .unwrap();
        }

        let view = aggregator(store).site_view().await;
        assert_eq!(view.title, "Cool Air Co");
        assert_eq!(view.call_me, "555-0100");
        assert_eq!(view.email_me, "");
        assert_eq!(view.quotes, vec!["Great service".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_title_falls_back_to_default() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert_site_settings(&SiteSettingsInput {
                title: "   ".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(aggregator(store).site_view().await.title, DEFAULT_SITE_TITLE);
    }

    #[tokio::test]
    async fn test_link_images_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let images = vec!["a".to_string(), "b".to_string()];
        store
            .insert_link(&link_input("https://a.example", encode_images(&images)))
            .await
            .unwrap();
        store
            .insert_link(&link_input("https://b.example", Some("{broken".to_string())))
            .await
            .unwrap();
        store
            .insert_link(&link_input("https://c.example", None))
            .await
            .unwrap();

        let links = aggregator(store).raw_links().await;
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].images.as_deref(), Some(images.as_slice()));
        assert_eq!(links[1].images, None);
        assert_eq!(links[2].images, None);
    }

    #[tokio::test]
    async fn test_facebook_posts_and_contact_links_follow_sort_order() {
        let store = Arc::new(MemoryStore::new());
        for (embed, sort_order, is_active) in [
            ("second", Some(20), true),
            ("first", Some(10), true),
            ("hidden", Some(5), false),
        ] {
            store
                .insert_facebook_post(&FacebookPostInput {
                    embed_url: embed.to_string(),
                    title: None,
                    description: None,
                    is_active,
                    sort_order,
                })
                .await
                .unwrap();
        }
        for (text, sort_order) in [("Email", Some(2)), ("Call", Some(1))] {
            store
                .insert_contact_link(&ContactLinkInput {
                    text: text.to_string(),
                    link_name: text.to_lowercase(),
                    link_type: LinkType::Call,
                    link_value: "555".to_string(),
                    link_image: None,
                    is_active: true,
                    sort_order,
                })
                .await
                .unwrap();
        }

        let content = aggregator(store);
        let posts: Vec<String> = content
            .facebook_posts()
            .await
            .into_iter()
            .map(|p| p.embed_url)
            .collect();
        assert_eq!(posts, vec!["first".to_string(), "second".to_string()]);

        let contacts: Vec<String> = content
            .contact_links()
            .await
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(contacts, vec!["Call".to_string(), "Email".to_string()]);
    }

    #[test]
    fn test_site_view_serializes_camel_case() {
        let json = serde_json::to_value(SiteView::fallback()).unwrap();
        assert_eq!(json["title"], "North Country Cooling");
        assert!(json.get("mainContent1").is_some());
        assert!(json.get("contactMeContent").is_some());
        assert_eq!(json["quotes"], serde_json::json!([]));
    }
}
