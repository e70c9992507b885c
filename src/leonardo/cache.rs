use crate::{
    error::GenerationFailure,
    leonardo::traits::ImageGenerator,
    models::{GeneratedImage, GenerationRequest, GenerationResult},
};
use async_trait::async_trait;
use moka::future::Cache;

pub const DEFAULT_CACHE_CAPACITY: u64 = 64;

/// Memoizes successful generations by the full request. The service is
/// non-deterministic and rate limited, so an unchanged request must not go
/// out twice; identical requests racing each other share one call.
/// Failures are not stored.
#[derive(Clone)]
pub struct CachedGenerator<G> {
    inner: G,
    cache: Cache<GenerationRequest, GeneratedImage>,
}

impl<G: ImageGenerator> CachedGenerator<G> {
    pub fn new(inner: G) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: G, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::builder().max_capacity(capacity.max(1)).build(),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Number of stored images after pending evictions have settled.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl<G: ImageGenerator> ImageGenerator for CachedGenerator<G> {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        if let Some(image) = self.cache.get(request).await {
            log::debug!("Generation cache hit for {}x{}", request.width, request.height);
            return Ok(image);
        }

        self.cache
            .try_get_with(request.clone(), self.inner.generate(request))
            .await
            .map_err(|failure: std::sync::Arc<GenerationFailure>| (*failure).clone())
    }
}
