//! Build status badge images
//!
//! Badge images come from an external shields-style service. Fetched
//! images are kept in an injected [`BadgeCache`]; there are only two
//! distinct badges, so the memory cache never evicts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use dashmap::DashMap;
use depot_config::{BadgeConfig, BadgeMode};
use depot_core::BuildStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BadgeError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Cannot download badge {url}: {reason}")]
    Fetch { url: String, reason: String },
}

/// Where badge images are fetched from
#[async_trait]
pub trait BadgeSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, BadgeError>;
}

/// Badge image cache keyed by image URL
pub trait BadgeCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Bytes>;
    fn put(&self, key: &str, image: Bytes);
}

/// Fetches badges over HTTP
pub struct HttpBadgeSource {
    client: reqwest::Client,
}

impl HttpBadgeSource {
    pub fn new() -> Result<Self, BadgeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("depot/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BadgeError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BadgeSource for HttpBadgeSource {
    async fn fetch(&self, url: &str) -> Result<Bytes, BadgeError> {
        let fetch_error = |reason: String| BadgeError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status().as_u16())));
        }

        response.bytes().await.map_err(|e| fetch_error(e.to_string()))
    }
}

/// Process-wide in-memory cache
#[derive(Default)]
pub struct MemoryBadgeCache {
    images: DashMap<String, Bytes>,
}

impl MemoryBadgeCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BadgeCache for MemoryBadgeCache {
    fn get(&self, key: &str) -> Option<Bytes> {
        self.images.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: &str, image: Bytes) {
        self.images.insert(key.to_string(), image);
    }
}

/// Cache that never stores anything
pub struct NoopBadgeCache;

impl BadgeCache for NoopBadgeCache {
    fn get(&self, _key: &str) -> Option<Bytes> {
        None
    }

    fn put(&self, _key: &str, _image: Bytes) {}
}

pub struct BadgeService {
    base_url: String,
    mode: BadgeMode,
    source: Arc<dyn BadgeSource>,
    cache: Arc<dyn BadgeCache>,
}

impl BadgeService {
    pub fn new(
        config: &BadgeConfig,
        source: Arc<dyn BadgeSource>,
        cache: Arc<dyn BadgeCache>,
    ) -> Self {
        Self {
            base_url: config.base_url.clone(),
            mode: config.mode,
            source,
            cache,
        }
    }

    pub fn mode(&self) -> BadgeMode {
        self.mode
    }

    pub fn url(&self, status: BuildStatus) -> String {
        status.badge().url(&self.base_url)
    }

    /// Badge image for `status`, from the cache when possible
    pub async fn image(&self, status: BuildStatus) -> Result<Bytes, BadgeError> {
        let url = self.url(status);
        if let Some(image) = self.cache.get(&url) {
            return Ok(image);
        }

        let image = self.source.fetch(&url).await?;
        tracing::debug!(url = %url, bytes = image.len(), "fetched badge");
        self.cache.put(&url, image.clone());
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BadgeSource for CountingSource {
        async fn fetch(&self, url: &str) -> Result<Bytes, BadgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from(format!("<svg>{url}</svg>")))
        }
    }

    fn service(cache: Arc<dyn BadgeCache>) -> (Arc<CountingSource>, BadgeService) {
        let source = Arc::new(CountingSource::default());
        let service = BadgeService::new(&BadgeConfig::default(), source.clone(), cache);
        (source, service)
    }

    #[tokio::test]
    async fn test_memory_cache_fetches_once() {
        let (source, service) = service(Arc::new(MemoryBadgeCache::new()));

        let first = service.image(BuildStatus::Passing).await.unwrap();
        let second = service.image(BuildStatus::Passing).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        service.image(BuildStatus::Failed).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_noop_cache_always_fetches() {
        let (source, service) = service(Arc::new(NoopBadgeCache));

        service.image(BuildStatus::Failed).await.unwrap();
        service.image(BuildStatus::Failed).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_image_for_status_url() {
        let (_source, service) = service(Arc::new(NoopBadgeCache));
        let image = service.image(BuildStatus::Failed).await.unwrap();
        assert_eq!(
            image,
            Bytes::from("<svg>https://img.shields.io/badge/build-failed-red</svg>")
        );
    }
}
