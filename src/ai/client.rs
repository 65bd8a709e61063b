use super::types::{ChatCompletionRequest, ChatCompletionResponse, ErrorResponse};
use crate::models::Config;
use crate::{Error, Result};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-image-preview";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Thin OpenRouter REST client. The API key is supplied per call since each
/// user brings their own.
pub struct OpenRouterHttpClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    model: String,
    referer: String,
    title: String,
    timeout: Duration,
}

impl OpenRouterHttpClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            referer: "https://product-image-studio.example.com".to_string(),
            title: "Product Image Studio".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self {
            client,
            base_url: config.openrouter_base_url.clone(),
            model: config.image_model.clone(),
            referer: config.app_referer.clone(),
            title: config.app_title.clone(),
            timeout: config.upstream_timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completion_request(&self, api_key: &str, request: &ChatCompletionRequest) -> RequestBuilder {
        self.client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(request)
    }

    pub async fn chat_completion(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        tracing::debug!(
            "Sending chat completion request to OpenRouter ({})",
            self.model
        );

        let response = self
            .completion_request(api_key, request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to OpenRouter: {}", e);
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or(status.as_str())
                        .to_string()
                });
            tracing::error!("OpenRouter API error (status {}): {}", status, body);
            return Err(Error::Upstream(format!("OpenRouter API error: {}", message)));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse OpenRouter response: {}\nBody: {}", e, body);
            Error::Upstream(format!("Failed to parse OpenRouter response: {}", e))
        })
    }

    /// Send a request and report only whether the status was a success.
    pub async fn accepts_key(&self, api_key: &str, request: &ChatCompletionRequest) -> bool {
        match self.completion_request(api_key, request).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!("API key validation failed (status {}): {}", status, body);
                false
            }
            Err(e) => {
                tracing::warn!("API key validation request failed: {}", e);
                false
            }
        }
    }
}
