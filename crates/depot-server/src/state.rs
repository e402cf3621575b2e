use std::sync::Arc;

use depot_config::Config;
use depot_core::Listing;
use depot_storage::{ArtifactStore, FsStore};

use crate::badge::{BadgeService, HttpBadgeSource, MemoryBadgeCache};
use crate::error::ApiError;

/// Request-independent server settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_token: String,
    /// Route prefix for artifact downloads
    pub base_path: String,
    /// Prefix for artifact links and redirects
    pub link_base: String,
    pub max_upload_bytes: usize,
}

impl Settings {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let api_token = config
            .api_token()
            .ok_or_else(|| anyhow::anyhow!("API_TOKEN env not specified"))?;

        Ok(Self {
            api_token: api_token.to_string(),
            base_path: config.artifacts.base_path.trim_end_matches('/').to_string(),
            link_base: config.artifacts.link_base(),
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArtifactStore>,
    pub badges: Arc<BadgeService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(store: Arc<dyn ArtifactStore>, badges: BadgeService, settings: Settings) -> Self {
        Self {
            store,
            badges: Arc::new(badges),
            settings: Arc::new(settings),
        }
    }

    /// Filesystem store, HTTP badge source and in-memory badge cache
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let settings = Settings::from_config(config)?;
        let store = FsStore::new(&config.data_dir)?;
        let badges = BadgeService::new(
            &config.badge,
            Arc::new(HttpBadgeSource::new()?),
            Arc::new(MemoryBadgeCache::new()),
        );
        Ok(Self::new(Arc::new(store), badges, settings))
    }

    /// Rebuild the listing from the store
    pub async fn listing(&self) -> Result<Listing, ApiError> {
        let snapshot = self.store.snapshot().await?;
        Ok(Listing::build(snapshot))
    }
}
