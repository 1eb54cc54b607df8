use std::sync::Arc;

use crate::config::Config;
use crate::content::ContentAggregator;
use crate::db::ContentStore;
use crate::preview::LinkPreviewResolver;

/// Everything handlers share, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ContentStore>,
    pub content: ContentAggregator,
    pub previews: Arc<LinkPreviewResolver>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ContentStore>) -> Result<Self, reqwest::Error> {
        let previews = LinkPreviewResolver::new(config.preview_timeout, &config.preview_user_agent)?;
        Ok(Self {
            content: ContentAggregator::new(store.clone()),
            config: Arc::new(config),
            store,
            previews: Arc::new(previews),
        })
    }
}
