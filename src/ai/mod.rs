//! AI image generation and editing
//!
//! Wraps an OpenRouter chat-completion endpoint backed by a multimodal image
//! model, normalizing its responses into a single hosted image URL.

pub mod client;
pub mod data_uri;
pub mod mock;
pub mod openrouter;
pub mod types;

pub use client::OpenRouterHttpClient;
pub use mock::MockImageGenClient;
pub use openrouter::OpenRouterImageClient;

use crate::models::GeneratedImage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGenService: Send + Sync {
    /// Text to image. Exactly one upstream call.
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<GeneratedImage>;

    /// Image to image. Exactly one upstream call.
    async fn edit(&self, api_key: &str, image_url: &str, instruction: &str)
        -> Result<GeneratedImage>;

    /// Whether the upstream accepts `api_key`. Never fails.
    async fn validate_key(&self, api_key: &str) -> bool;
}
