use super::keys::normalize_key;
use super::ObjectStore;
use crate::models::StoredObject;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockObjectStore {
    files: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    base_url: String,
    put_count: Arc<Mutex<usize>>,
    fail_with: Option<String>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            base_url: "https://mock-storage.example.com".to_string(),
            put_count: Arc::new(Mutex::new(0)),
            fail_with: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Make every `put`/`delete` fail with a storage error.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn get_put_count(&self) -> usize {
        *self.put_count.lock().unwrap()
    }

    pub fn get_file(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.files.lock().unwrap().get(key).cloned()
    }

    pub fn get_keys(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<StoredObject> {
        *self.put_count.lock().unwrap() += 1;

        if let Some(message) = &self.fail_with {
            return Err(Error::Storage(message.clone()));
        }

        let key = normalize_key(key);
        self.files
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.to_vec(), content_type.to_string()));
        Ok(self.get(key))
    }

    fn get(&self, key: &str) -> StoredObject {
        let key = normalize_key(key);
        StoredObject {
            key: key.to_string(),
            url: format!("{}/{}", self.base_url, key),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(Error::Storage(message.clone()));
        }

        match self.files.lock().unwrap().remove(normalize_key(key)) {
            Some(_) => Ok(()),
            None => Err(Error::Storage(format!("File not found: {}", key))),
        }
    }
}
