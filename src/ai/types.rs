//! OpenRouter chat-completion payloads.
//!
//! The upstream `content` field is either a plain string or an array of
//! typed parts, and images come back in a separate `images` list. Responses
//! are normalized into [`AssistantMessage`] before anything inspects them.

use super::data_uri::{self, ImageRef};
use serde::{Deserialize, Serialize};

/// Request body for chat completions.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(content: MessageContent) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// Message content union.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<MessagePart>),
}

/// One content segment in multipart message input.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

/// Top-level chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<MessageContent>,
    pub images: Option<Vec<ResponseImage>>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseImage {
    #[serde(rename = "type")]
    pub image_type: Option<String>,
    pub image_url: ImageUrl,
    pub index: Option<u32>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub message: Option<String>,
}

/// Assistant reply in the single internal shape used by the pipeline.
#[derive(Debug, PartialEq)]
pub struct AssistantMessage {
    pub text: String,
    pub images: Vec<ImageRef>,
}

impl From<ResponseMessage> for AssistantMessage {
    fn from(message: ResponseMessage) -> Self {
        // Image parts inside `content` echo the request and are never results.
        let text = match message.content {
            Some(MessageContent::Text(text)) => text,
            Some(MessageContent::Parts(parts)) => parts
                .into_iter()
                .filter_map(|part| match part {
                    MessagePart::Text { text } => Some(text),
                    _ => None,
                })
                .collect(),
            None => String::new(),
        };

        let images = message
            .images
            .unwrap_or_default()
            .into_iter()
            .map(|img| data_uri::classify(img.image_url.url))
            .collect();

        Self { text, images }
    }
}

impl ChatCompletionResponse {
    /// The first choice's message, normalized.
    pub fn into_first_message(self) -> Option<AssistantMessage> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.into())
    }
}
