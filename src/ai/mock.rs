use super::ImageGenService;
use crate::models::GeneratedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted responses for one mock call.
pub enum MockResponse {
    Image(GeneratedImage),
    Fail(fn() -> Error),
}

#[derive(Clone)]
pub struct MockImageGenClient {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    valid_keys: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageGenClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            valid_keys: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image_url(self, url: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Image(GeneratedImage {
                image_url: url.to_string(),
                image_key: None,
            }));
        self
    }

    pub fn with_error(self, make_error: fn() -> Error) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Fail(make_error));
        self
    }

    pub fn with_valid_key(self, key: &str) -> Self {
        self.valid_keys.lock().unwrap().push(key.to_string());
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn next_response(&self, fallback_url: String) -> Result<GeneratedImage> {
        *self.call_count.lock().unwrap() += 1;

        match self.responses.lock().unwrap().pop_front() {
            Some(MockResponse::Image(image)) => Ok(image),
            Some(MockResponse::Fail(make_error)) => Err(make_error()),
            None => Ok(GeneratedImage {
                image_url: fallback_url,
                image_key: None,
            }),
        }
    }
}

impl Default for MockImageGenClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenService for MockImageGenClient {
    async fn generate(&self, _api_key: &str, _prompt: &str) -> Result<GeneratedImage> {
        self.next_response("https://mock-images.example.com/generated.png".to_string())
    }

    async fn edit(
        &self,
        _api_key: &str,
        _image_url: &str,
        _instruction: &str,
    ) -> Result<GeneratedImage> {
        self.next_response("https://mock-images.example.com/edited.png".to_string())
    }

    async fn validate_key(&self, api_key: &str) -> bool {
        *self.call_count.lock().unwrap() += 1;
        self.valid_keys.lock().unwrap().iter().any(|k| k == api_key)
    }
}
