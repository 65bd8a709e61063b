use super::client::OpenRouterHttpClient;
use super::data_uri::{self, ImageRef};
use super::types::{ChatCompletionRequest, ChatMessage, ImageUrl, MessageContent, MessagePart};
use super::ImageGenService;
use crate::models::{GeneratedImage, ImageOperation};
use crate::storage::{keys, ObjectStore};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Image generation and editing through an OpenRouter multimodal model.
///
/// Embedded (data URI) results are re-hosted in the object store so callers
/// only ever see resolvable URLs.
pub struct OpenRouterImageClient {
    http: OpenRouterHttpClient,
    store: Arc<dyn ObjectStore>,
}

impl OpenRouterImageClient {
    pub fn new(http: OpenRouterHttpClient, store: Arc<dyn ObjectStore>) -> Self {
        Self { http, store }
    }

    fn request(&self, content: MessageContent) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.http.model().to_string(),
            messages: vec![ChatMessage::user(content)],
        }
    }

    async fn first_image(
        &self,
        api_key: &str,
        request: ChatCompletionRequest,
        operation: ImageOperation,
    ) -> Result<GeneratedImage> {
        let response = self.http.chat_completion(api_key, &request).await?;

        let image = response
            .into_first_message()
            .and_then(|message| message.images.into_iter().next())
            .ok_or(Error::NoImage(operation))?;

        self.resolve(image, operation).await
    }

    async fn resolve(&self, image: ImageRef, operation: ImageOperation) -> Result<GeneratedImage> {
        match image {
            ImageRef::Remote(url) => Ok(GeneratedImage {
                image_url: url,
                image_key: None,
            }),
            ImageRef::Embedded { mime_type, payload } => {
                let bytes = data_uri::decode_payload(&payload)?;
                let key = keys::rehost_key(operation, data_uri::extension_for_mime(&mime_type));
                let stored = self.store.put(&key, &bytes, &mime_type).await?;
                tracing::info!(
                    "Re-hosted embedded image ({} bytes) at {}",
                    bytes.len(),
                    stored.key
                );
                Ok(GeneratedImage {
                    image_url: stored.url,
                    image_key: Some(stored.key),
                })
            }
        }
    }
}

fn require_api_key(api_key: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(Error::Auth("OpenRouter API Key is required".to_string()));
    }
    Ok(())
}

#[async_trait]
impl ImageGenService for OpenRouterImageClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<GeneratedImage> {
        require_api_key(api_key)?;

        let instruction = prompts::render(prompts::GENERATE, &[("prompt", prompt)]);
        let request = self.request(MessageContent::Text(instruction));

        self.first_image(api_key, request, ImageOperation::Generate).await
    }

    async fn edit(
        &self,
        api_key: &str,
        image_url: &str,
        instruction: &str,
    ) -> Result<GeneratedImage> {
        require_api_key(api_key)?;
        if image_url.trim().is_empty() {
            return Err(Error::MissingInput("Image URL is required".to_string()));
        }

        let text = prompts::render(prompts::EDIT, &[("instruction", instruction)]);
        let request = self.request(MessageContent::Parts(vec![
            MessagePart::Text { text },
            MessagePart::ImageUrl {
                image_url: ImageUrl {
                    url: image_url.to_string(),
                },
            },
        ]));

        self.first_image(api_key, request, ImageOperation::Edit).await
    }

    async fn validate_key(&self, api_key: &str) -> bool {
        if api_key.trim().is_empty() {
            return false;
        }

        let request = self.request(MessageContent::Text(prompts::KEY_CHECK.to_string()));
        self.http.accepts_key(api_key, &request).await
    }
}
