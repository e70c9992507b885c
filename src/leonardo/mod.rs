pub mod cache;
pub mod encoding;
pub mod lcm_client;
pub mod traits;

use crate::{
    config::LeonardoConfig,
    error::{Result, SketchError},
    models::{GenerationRequest, GenerationResult},
};
use async_trait::async_trait;
use reqwest::Client;

pub use cache::CachedGenerator;
pub use lcm_client::LcmClient;
pub use traits::ImageGenerator;

/// Entry point for the Leonardo REST API. Owns one HTTP client with the
/// configured timeout; generation goes through a memoizing wrapper.
#[derive(Clone)]
pub struct LeonardoClient {
    lcm_client: CachedGenerator<LcmClient>,
}

impl LeonardoClient {
    pub fn new(config: LeonardoConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SketchError::ClientError(e.to_string()))?;

        let lcm = LcmClient::new(http, &config)?;
        log::info!(
            "Leonardo client ready for {} (timeout {}s)",
            lcm.url(),
            config.timeout.as_secs_f32()
        );

        Ok(Self {
            lcm_client: CachedGenerator::new(lcm),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(LeonardoConfig::from_env())
    }

    /// Memoized LCM generation.
    pub fn lcm(&self) -> &CachedGenerator<LcmClient> {
        &self.lcm_client
    }

    /// Direct LCM access, bypassing the cache.
    pub fn lcm_uncached(&self) -> &LcmClient {
        self.lcm_client.inner()
    }
}

#[async_trait]
impl ImageGenerator for LeonardoClient {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        self.lcm_client.generate(request).await
    }
}
