//! Facebook post URL normalization.
//!
//! Turns a post URL as people share it (`facebook.com/Page/posts/123`,
//! mobile hosts, missing scheme) into the `plugins/post.php` URL that
//! Facebook's iframe embed expects. Pure string work, no network access.

use lazy_static::lazy_static;
use regex::Regex;

/// Prefix every embeddable post URL starts with.
pub const EMBED_PREFIX: &str = "https://www.facebook.com/plugins/post.php?href=";

const SCHEMELESS_HOSTS: &[&str] = &["www.facebook.com", "facebook.com", "m.facebook.com"];

lazy_static! {
    static ref HOST_VARIANT: Regex =
        Regex::new(r"^https?://(?:m\.|mobile\.|touch\.)?facebook\.com").unwrap();
    static ref POST_SHAPE: Regex =
        Regex::new(r"^https://www\.facebook\.com/[^/?#]+/posts/[^/?#]+/?(?:[?#].*)?$").unwrap();
    static ref POST_ID: Regex = Regex::new(r"/posts/([^/?#]+)").unwrap();
    static ref PAGE_NAME: Regex = Regex::new(r"facebook\.com/([^/?#]+)/posts/").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FacebookUrlError {
    #[error("Invalid Facebook URL format: {0}")]
    InvalidFormat(String),
}

/// Size and text options forwarded to the embed plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {
    pub width: u32,
    pub height: u32,
    pub show_text: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            width: 350,
            height: 480,
            show_text: true,
        }
    }
}

/// Cleans a shared post URL down to `https://www.facebook.com/<page>/posts/<id>...`.
fn clean_post_url(raw: &str) -> Result<String, FacebookUrlError> {
    let trimmed = raw.trim();

    let with_scheme = if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else if SCHEMELESS_HOSTS.iter().any(|host| trimmed.starts_with(host)) {
        format!("https://{}", trimmed)
    } else {
        return Err(FacebookUrlError::InvalidFormat(
            "URL must start with http(s):// or a facebook.com host".to_string(),
        ));
    };

    let canonical = HOST_VARIANT
        .replace(&with_scheme, "https://www.facebook.com")
        .into_owned();

    if !POST_SHAPE.is_match(&canonical) {
        return Err(FacebookUrlError::InvalidFormat(
            "URL must be a Facebook post URL in format: facebook.com/PageName/posts/postId"
                .to_string(),
        ));
    }

    Ok(canonical)
}

/// Converts a shared post URL into the embeddable plugin URL.
pub fn normalize(raw: &str, options: EmbedOptions) -> Result<String, FacebookUrlError> {
    let cleaned = clean_post_url(raw)?;
    Ok(format!(
        "{}{}&width={}&show_text={}&height={}&appId",
        EMBED_PREFIX,
        urlencoding::encode(&cleaned),
        options.width,
        options.show_text,
        options.height
    ))
}

/// True iff [`normalize`] would succeed.
pub fn is_valid(raw: &str) -> bool {
    clean_post_url(raw).is_ok()
}

/// Already in the `plugins/post.php` form stored for embeds.
pub fn is_embed_url(url: &str) -> bool {
    url.trim().starts_with(EMBED_PREFIX)
}

pub fn extract_post_id(url: &str) -> Option<String> {
    POST_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn extract_page_name(url: &str) -> Option<String> {
    PAGE_NAME
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_schemeless_url_with_defaults() {
        let embed = normalize("facebook.com/Page/posts/123", EmbedOptions::default()).unwrap();
        assert!(embed.starts_with(EMBED_PREFIX));
        assert!(embed.contains("href=https%3A%2F%2Fwww.facebook.com%2FPage%2Fposts%2F123"));
        assert!(embed.contains("width=350&show_text=true&height=480"));
        assert!(embed.ends_with("&appId"));
    }

    #[test]
    fn test_normalize_matches_known_embed() {
        let url = "https://www.facebook.com/NorthCountryCooling/posts/pfbid08Z8aV1JiKugR3YRwnHBAy6at7UgkcmDYBEq7THEawTzvwvNK5a8ghiS4bU9TKyZTl";
        let expected = "https://www.facebook.com/plugins/post.php?href=https%3A%2F%2Fwww.facebook.com%2FNorthCountryCooling%2Fposts%2Fpfbid08Z8aV1JiKugR3YRwnHBAy6at7UgkcmDYBEq7THEawTzvwvNK5a8ghiS4bU9TKyZTl&width=350&show_text=true&height=480&appId";
        assert_eq!(normalize(url, EmbedOptions::default()).unwrap(), expected);
    }

    #[test]
    fn test_normalize_trims_and_honours_options() {
        let embed = normalize(
            "  https://facebook.com/Page/posts/9  ",
            EmbedOptions {
                width: 500,
                height: 600,
                show_text: false,
            },
        )
        .unwrap();
        assert!(embed.contains("%2FPage%2Fposts%2F9&"));
        assert!(embed.contains("width=500&show_text=false&height=600"));
    }

    #[test]
    fn test_mobile_hosts_are_canonicalised() {
        for raw in [
            "https://m.facebook.com/Page/posts/abc123",
            "https://mobile.facebook.com/Page/posts/abc123",
            "https://touch.facebook.com/Page/posts/abc123",
            "http://facebook.com/Page/posts/abc123",
            "m.facebook.com/Page/posts/abc123",
        ] {
            let embed = normalize(raw, EmbedOptions::default()).unwrap();
            assert!(
                embed.contains("href=https%3A%2F%2Fwww.facebook.com%2FPage%2Fposts%2Fabc123"),
                "{raw} -> {embed}"
            );
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("https://m.facebook.com/Page/posts/abc123"));
        assert!(is_valid("https://www.facebook.com/Page/posts/abc123?ref=share"));
        assert!(!is_valid("https://www.facebook.com/Page/about"));
        assert!(!is_valid("https://www.facebook.com/Page/posts/"));
        assert!(!is_valid("https://www.facebook.com/Page/posts/1/photos/2"));
        assert!(!is_valid("https://example.com/Page/posts/1"));
        assert!(!is_valid("mobile.facebook.com/Page/posts/1"));
        assert!(!is_valid(""));
    }

    #[test]
    fn test_invalid_format_carries_message() {
        let err = normalize("not a url", EmbedOptions::default()).unwrap_err();
        let FacebookUrlError::InvalidFormat(message) = &err;
        assert!(!message.is_empty());
        assert!(err.to_string().starts_with("Invalid Facebook URL format"));
    }

    #[test]
    fn test_extractors() {
        let url = "https://www.facebook.com/Page/posts/abc123?x=1";
        assert_eq!(extract_post_id(url).as_deref(), Some("abc123"));
        assert_eq!(extract_page_name(url).as_deref(), Some("Page"));
        assert_eq!(extract_post_id("https://www.facebook.com/Page/about"), None);
        assert_eq!(extract_page_name("https://example.com"), None);
    }

    #[test]
    fn test_is_embed_url() {
        let embed = normalize("facebook.com/Page/posts/1", EmbedOptions::default()).unwrap();
        assert!(is_embed_url(&embed));
        assert!(!is_embed_url("https://www.facebook.com/Page/posts/1"));
    }
}
