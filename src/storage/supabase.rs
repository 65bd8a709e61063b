use super::keys::normalize_key;
use super::ObjectStore;
use crate::models::{Config, StoredObject};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

const STORAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Supabase Storage REST client for a single public-read bucket.
pub struct SupabaseStorageClient {
    client: Client,
    endpoint: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorageClient {
    pub fn new(endpoint: String, service_key: String, bucket: String) -> Result<Self> {
        Self::new_with_client(endpoint, service_key, bucket, Client::new())
    }

    pub fn new_with_client(
        endpoint: String,
        service_key: String,
        bucket: String,
        client: Client,
    ) -> Result<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Err(Error::Config("SUPABASE_URL not set".to_string()));
        }
        if service_key.trim().is_empty() {
            return Err(Error::Config(
                "SUPABASE_SERVICE_ROLE_KEY not set".to_string(),
            ));
        }
        if bucket.trim().is_empty() {
            return Err(Error::Config(
                "SUPABASE_STORAGE_BUCKET is empty".to_string(),
            ));
        }

        Ok(Self {
            client,
            endpoint,
            service_key,
            bucket,
        })
    }

    pub fn from_config(config: &Config, client: Client) -> Result<Self> {
        Self::new_with_client(
            config.supabase_url.clone(),
            config.supabase_service_key.clone(),
            config.storage_bucket.clone(),
            client,
        )
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.endpoint, self.bucket, key
        )
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.endpoint, self.bucket, key
        )
    }

    async fn ensure_success(response: Response, action: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or_default().to_string());
        tracing::error!(
            "Supabase Storage {} failed (status {}): {}",
            action, status, body
        );
        Err(Error::Storage(format!(
            "{} failed (status {}): {}",
            action, status, body
        )))
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorageClient {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<StoredObject> {
        let key = normalize_key(key);
        tracing::debug!("Uploading {} bytes to {}/{}", data.len(), self.bucket, key);

        let response = self
            .client
            .post(self.object_url(key))
            .timeout(STORAGE_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", content_type)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send upload to Supabase Storage: {}", e);
                e
            })?;

        Self::ensure_success(response, "upload").await?;

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
        })
    }

    fn get(&self, key: &str) -> StoredObject {
        let key = normalize_key(key);
        StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = normalize_key(key);

        let response = self
            .client
            .delete(self.object_url(key))
            .timeout(STORAGE_TIMEOUT)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .send()
            .await?;

        Self::ensure_success(response, "delete").await?;
        Ok(())
    }
}
