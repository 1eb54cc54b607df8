//! Link preview resolution for the "learn more" page.
//!
//! Each stored link is fetched, its OpenGraph / Twitter / plain HTML metadata
//! is extracted, and the manual overrides saved with the link are applied on
//! top. A link whose fetch fails for any reason gets a fallback preview; one
//! bad link never fails the batch.

use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, redirect, Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::content::LinkView;

pub const FALLBACK_DESCRIPTION: &str = "Click to visit this resource";

const MAX_REDIRECTS: usize = 10;
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// Quoted attribute values may contain `>`.
static META_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap());
static LINK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<link\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap());
static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .unwrap()
});
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9A-Fa-f]+|#[0-9]+|[A-Za-z]+);").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("not an HTML page (content-type {0:?})")]
    NotHtml(String),

    #[error("page larger than {0} bytes")]
    TooLarge(usize),
}

/// What the "learn more" page renders for one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPreview {
    pub url: String,
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub favicons: Vec<String>,
}

/// Metadata extracted from a fetched page, before overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub favicons: Vec<String>,
}

pub struct LinkPreviewResolver {
    client: Client,
}

impl LinkPreviewResolver {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }

    /// Resolves every link concurrently; output order matches input order.
    pub async fn resolve_all(&self, links: &[LinkView]) -> Vec<LinkPreview> {
        join_all(links.iter().map(|link| self.resolve(link))).await
    }

    pub async fn resolve(&self, link: &LinkView) -> LinkPreview {
        match self.fetch(&link.url).await {
            Ok(metadata) => apply_overrides(link, metadata),
            Err(e) => {
                tracing::warn!(url = %link.url, error = %e, "link preview failed, using fallback");
                fallback_preview(link)
            }
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<PageMetadata, PreviewError> {
        let mut response = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !is_html(&content_type) {
            return Err(PreviewError::NotHtml(content_type));
        }

        // Redirects may have moved us; relative URLs resolve against the final page.
        let final_url = response.url().clone();

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(PreviewError::TooLarge(MAX_BODY_BYTES));
            }
            body.extend_from_slice(&chunk);
        }

        let html = String::from_utf8_lossy(&body);
        Ok(parse_metadata(&html, &final_url))
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.starts_with("text/html") || content_type.starts_with("application/xhtml+xml")
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn override_images(link: &LinkView) -> Option<Vec<String>> {
    link.images.clone().filter(|images| !images.is_empty())
}

/// Stored non-empty title/description/images replace the fetched values
/// wholesale; images are never merged.
pub fn apply_overrides(link: &LinkView, fetched: PageMetadata) -> LinkPreview {
    LinkPreview {
        url: link.url.clone(),
        title: non_blank(link.title.as_ref())
            .or(fetched.title)
            .unwrap_or_else(|| link.url.clone()),
        description: non_blank(link.description.as_ref())
            .or(fetched.description)
            .unwrap_or_default(),
        images: override_images(link).unwrap_or(fetched.images),
        favicons: fetched.favicons,
    }
}

pub fn fallback_preview(link: &LinkView) -> LinkPreview {
    LinkPreview {
        url: link.url.clone(),
        title: non_blank(link.title.as_ref()).unwrap_or_else(|| link.url.clone()),
        description: non_blank(link.description.as_ref())
            .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
        images: override_images(link).unwrap_or_default(),
        favicons: Vec::new(),
    }
}

// ============================================================================
// HTML metadata extraction
// ============================================================================

/// Lower-cased attribute names mapped to entity-decoded values, in source order.
fn attributes(tag: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(tag)
        .filter_map(|c| {
            let name = c.get(1)?.as_str().to_ascii_lowercase();
            let value = c.get(2).or_else(|| c.get(3)).or_else(|| c.get(4))?;
            Some((name, decode_entities(value.as_str())))
        })
        .collect()
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

pub fn parse_metadata(html: &str, base: &Url) -> PageMetadata {
    // (key, content) for every <meta property|name=... content=...>
    let metas: Vec<(String, String)> = META_TAG
        .find_iter(html)
        .filter_map(|m| {
            let attrs = attributes(m.as_str());
            let key = attr(&attrs, "property").or_else(|| attr(&attrs, "name"))?;
            let content = attr(&attrs, "content")?.trim();
            if content.is_empty() {
                return None;
            }
            Some((key.to_ascii_lowercase(), content.to_string()))
        })
        .collect();

    // (rel, href) for every <link rel=... href=...>
    let links: Vec<(String, String)> = LINK_TAG
        .find_iter(html)
        .filter_map(|m| {
            let attrs = attributes(m.as_str());
            let rel = attr(&attrs, "rel")?.to_ascii_lowercase();
            let href = attr(&attrs, "href")?.trim();
            if href.is_empty() {
                return None;
            }
            Some((rel, href.to_string()))
        })
        .collect();

    let first_meta = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|key| metas.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
    };
    let all_meta = |keys: &[&str]| -> Vec<String> {
        metas
            .iter()
            .filter(|(k, _)| keys.contains(&k.as_str()))
            .map(|(_, v)| v.clone())
            .collect()
    };

    let title = first_meta(&["og:title", "twitter:title"]).or_else(|| {
        TITLE_TAG
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| decode_entities(m.as_str().trim()))
            .filter(|t| !t.is_empty())
    });

    let description = first_meta(&["og:description", "twitter:description", "description"]);

    let mut images = all_meta(&["og:image", "og:image:url", "og:image:secure_url"]);
    if images.is_empty() {
        images = all_meta(&["twitter:image", "twitter:image:src"]);
    }
    if images.is_empty() {
        images = links
            .iter()
            .filter(|(rel, _)| rel.split_whitespace().any(|r| r == "image_src"))
            .map(|(_, href)| href.clone())
            .collect();
    }

    let mut favicons: Vec<String> = links
        .iter()
        .filter(|(rel, _)| rel.split_whitespace().any(|r| r.contains("icon")))
        .map(|(_, href)| href.clone())
        .collect();
    if favicons.is_empty() {
        favicons.push("/favicon.ico".to_string());
    }

    PageMetadata {
        title,
        description,
        images: absolutize(base, images),
        favicons: absolutize(base, favicons),
    }
}

/// Resolves against `base` and drops duplicates and unparseable entries.
fn absolutize(base: &Url, urls: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(urls.len());
    for raw in urls {
        if let Ok(resolved) = base.join(&raw) {
            let resolved = resolved.to_string();
            if !out.contains(&resolved) {
                out.push(resolved);
            }
        }
    }
    out
}

pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        response::{Html, IntoResponse, Redirect},
        routing::get,
        Router,
    };

    const PAGE: &str = r#"<!doctype html>
<html><head>
  <title>Fallback Title</title>
  <meta property="og:title" content="Heat Pumps &amp; You">
  <meta property="og:description" content='Everything about heat pumps'>
  <meta property="og:image" content="/img/hero.png">
  <meta property="og:image:secure_url" content="https://cdn.example/hero@2x.png">
  <link rel="shortcut icon" href="/favicon.png">
  <link rel="apple-touch-icon" href="touch.png">
</head><body>hi</body></html>"#;

    fn link(url: &str) -> LinkView {
        LinkView {
            id: 1,
            url: url.to_string(),
            title: None,
            description: None,
            images: None,
        }
    }

    fn resolver() -> LinkPreviewResolver {
        LinkPreviewResolver::new(Duration::from_secs(5), "googlebot").unwrap()
    }

    async fn spawn_site() -> String {
        let app = Router::new()
            .route("/page", get(|| async { Html(PAGE) }))
            .route("/moved", get(|| async { Redirect::temporary("/page") }))
            .route("/plain", get(|| async { "just text".into_response() }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_parse_metadata_prefers_open_graph() {
        let base = Url::parse("https://site.example/articles/one").unwrap();
        let meta = parse_metadata(PAGE, &base);
        assert_eq!(meta.title.as_deref(), Some("Heat Pumps & You"));
        assert_eq!(
            meta.description.as_deref(),
            Some("Everything about heat pumps")
        );
        assert_eq!(
            meta.images,
            vec![
                "https://site.example/img/hero.png".to_string(),
                "https://cdn.example/hero@2x.png".to_string(),
            ]
        );
        assert_eq!(
            meta.favicons,
            vec![
                "https://site.example/favicon.png".to_string(),
                "https://site.example/articles/touch.png".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_metadata_fallbacks() {
        let html = r#"<html><head><TITLE> Plain &#39;Page&#x27; </TITLE>
            <meta name="description" content="About us">
            <meta name="twitter:image" content="https://img.example/t.jpg">
            </head></html>"#;
        let base = Url::parse("https://site.example/a/b").unwrap();
        let meta = parse_metadata(html, &base);
        assert_eq!(meta.title.as_deref(), Some("Plain 'Page'"));
        assert_eq!(meta.description.as_deref(), Some("About us"));
        assert_eq!(meta.images, vec!["https://img.example/t.jpg".to_string()]);
        assert_eq!(
            meta.favicons,
            vec!["https://site.example/favicon.ico".to_string()]
        );
    }

    #[test]
    fn test_parse_metadata_handles_garbage() {
        let base = Url::parse("https://site.example/").unwrap();
        let meta = parse_metadata("<meta <<< content=> <title>", &base);
        assert_eq!(meta.title, None);
        assert_eq!(meta.description, None);
        assert!(meta.images.is_empty());
        assert_eq!(meta.favicons.len(), 1);
    }

    #[test]
    fn test_parse_metadata_allows_gt_inside_attribute_values() {
        let html = r#"<html><head><title>Fallback</title>
            <meta property="og:title" content="Heat > Cold">
            <meta property='og:description' content='Furnace -> heat pump'>
            <link rel="icon" title="a>b" href="/icon.png">
            </head></html>"#;
        let base = Url::parse("https://site.example/").unwrap();
        let meta = parse_metadata(html, &base);
        assert_eq!(meta.title.as_deref(), Some("Heat > Cold"));
        assert_eq!(meta.description.as_deref(), Some("Furnace -> heat pump"));
        assert_eq!(meta.favicons, vec!["https://site.example/icon.png".to_string()]);
    }

    #[test]
    fn test_image_src_link_is_last_resort() {
        let html = r#"<link rel="image_src" href="/thumb.jpg">"#;
        let base = Url::parse("https://site.example/").unwrap();
        let meta = parse_metadata(html, &base);
        assert_eq!(meta.images, vec!["https://site.example/thumb.jpg".to_string()]);
    }

    #[test]
    fn test_decode_entities_leaves_unknown_alone() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&copy; &bogus;"), "&copy; &bogus;");
        assert_eq!(decode_entities("&#8482;"), "\u{2122}");
    }

    #[test]
    fn test_overrides_replace_fetched_values() {
        let fetched = PageMetadata {
            title: Some("Fetched".into()),
            description: Some("Fetched desc".into()),
            images: vec!["https://x/fetched.png".into()],
            favicons: vec!["https://x/favicon.ico".into()],
        };
        let mut stored = link("https://x/");
        stored.title = Some("Manual".into());
        stored.images = Some(vec!["https://x/manual.png".into()]);

        let preview = apply_overrides(&stored, fetched.clone());
        assert_eq!(preview.title, "Manual");
        assert_eq!(preview.description, "Fetched desc");
        assert_eq!(preview.images, vec!["https://x/manual.png".to_string()]);
        assert_eq!(preview.favicons, fetched.favicons);

        // Blank overrides and empty image lists do not count.
        stored.title = Some("  ".into());
        stored.images = Some(Vec::new());
        let preview = apply_overrides(&stored, fetched);
        assert_eq!(preview.title, "Fetched");
        assert_eq!(preview.images, vec!["https://x/fetched.png".to_string()]);
    }

    #[test]
    fn test_fallback_preview_shape() {
        let preview = fallback_preview(&link("https://gone.example/"));
        assert_eq!(preview.title, "https://gone.example/");
        assert_eq!(preview.description, FALLBACK_DESCRIPTION);
        assert!(preview.images.is_empty());
        assert!(preview.favicons.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_all_preserves_order_with_unreachable_link() {
        let base = spawn_site().await;
        let links = vec![
            link(&format!("{}/page", base)),
            link("http://127.0.0.1:1/unreachable"),
        ];

        let previews = resolver().resolve_all(&links).await;
        assert_eq!(previews.len(), 2);

        assert_eq!(previews[0].url, links[0].url);
        assert_eq!(previews[0].title, "Heat Pumps & You");
        assert_eq!(previews[0].images[0], format!("{}/img/hero.png", base));

        assert_eq!(previews[1].url, "http://127.0.0.1:1/unreachable");
        assert!(previews[1].images.is_empty());
        assert!(previews[1].favicons.is_empty());
        assert!(!previews[1].description.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects_and_rejects_non_html() {
        let base = spawn_site().await;
        let resolver = resolver();

        let meta = resolver.fetch(&format!("{}/moved", base)).await.unwrap();
        assert_eq!(meta.favicons[0], format!("{}/favicon.png", base));

        let err = resolver.fetch(&format!("{}/plain", base)).await.unwrap_err();
        assert!(matches!(err, PreviewError::NotHtml(_)));

        let err = resolver.fetch(&format!("{}/missing", base)).await.unwrap_err();
        assert!(matches!(err, PreviewError::Status(404)));
    }
}
