use crate::{
    config::LeonardoConfig,
    error::{GenerationFailure, Result},
    leonardo::{encoding::decode_generated, traits::ImageGenerator},
    logger,
    models::{GenerationRequest, GenerationResult},
};
use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client,
};
use serde_json::Value;

/// Client for the LCM (latent consistency model) endpoint.
#[derive(Clone)]
pub struct LcmClient {
    client: Client,
    url: String,
    api_key: String,
    job_field: String,
}

impl LcmClient {
    pub fn new(client: Client, config: &LeonardoConfig) -> Result<Self> {
        Ok(Self {
            client,
            url: config.generations_url(),
            api_key: config.require_api_key()?.to_string(),
            job_field: config.job_field.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One POST, no retries.
    pub async fn send(&self, request: &GenerationRequest) -> GenerationResult {
        log::info!(
            "Requesting LCM generation {}x{} style={} strength={}",
            request.width,
            request.height,
            request.style,
            request.strength
        );
        let _timer = logger::timer("lcm generation");

        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| classify(e, "sending request"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify(e, "reading response body"))?;

        if !status.is_success() {
            log::error!("LCM generation failed with status {}: {}", status, body);
            return Err(GenerationFailure::Http {
                status: status.as_u16(),
                body,
            });
        }

        let data_url = extract_image_data_url(&body, &self.job_field)?;
        let image = decode_generated(&data_url).map_err(|e| {
            log::warn!("{}", e);
            e
        })?;
        log::info!(
            "Received generated image {}x{} ({} bytes)",
            image.width,
            image.height,
            image.bytes.len()
        );
        Ok(image)
    }
}

#[async_trait]
impl ImageGenerator for LcmClient {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        self.send(request).await
    }
}

fn classify(err: reqwest::Error, stage: &str) -> GenerationFailure {
    let failure = GenerationFailure::from_reqwest(err);
    log::warn!("LCM request failed while {}: {}", stage, failure);
    failure
}

/// Pulls `<job_field>.imageDataUrl[0]` out of a response body.
pub fn extract_image_data_url(
    body: &str,
    job_field: &str,
) -> std::result::Result<String, GenerationFailure> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| GenerationFailure::MalformedResponse(format!("response is not JSON: {}", e)))?;

    let job = value.get(job_field).ok_or_else(|| {
        let keys: Vec<&str> = value
            .as_object()
            .map(|o| o.keys().map(String::as_str).collect())
            .unwrap_or_default();
        log::warn!(
            "Response has no '{}' field (top-level keys: {:?})",
            job_field,
            keys
        );
        GenerationFailure::MalformedResponse(format!("missing '{}' in response", job_field))
    })?;

    job.get("imageDataUrl")
        .and_then(Value::as_array)
        .and_then(|urls| urls.first())
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            GenerationFailure::MalformedResponse(format!(
                "'{}.imageDataUrl' is missing, empty or not a string list",
                job_field
            ))
        })
}
