//! Request orchestration: validation, upstream image calls, re-hosting and
//! history persistence, one logical unit of work per call.

use crate::ai::{data_uri, ImageGenService, OpenRouterHttpClient, OpenRouterImageClient};
use crate::db::{Database, HistoryRepository, InspirationRepository, UserRepository};
use crate::models::{
    CategoryInfo, Config, EditRecord, GeneratedImage, GenerationRecord, Inspiration,
    InspirationCategory, InspirationUpdate, NewEdit, NewGeneration, NewInspiration, StoredObject,
    User,
};
use crate::storage::{keys, ObjectStore, SupabaseStorageClient};
use crate::{validation, Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::{strategy::FixedInterval, RetryIf};
use tracing::{error, info, warn};

const DEFAULT_UPLOAD_MIME: &str = "image/jpeg";
const PERSIST_RETRIES: usize = 3;
const PERSIST_RETRY_INTERVAL: Duration = Duration::from_millis(250);

pub struct Pipeline {
    image_gen: Arc<dyn ImageGenService>,
    store: Arc<dyn ObjectStore>,
    history: Arc<dyn HistoryRepository>,
    inspirations: Arc<dyn InspirationRepository>,
    users: Arc<dyn UserRepository>,
    persist_retry_interval: Duration,
}

/// Injectable service bundle used to construct [`Pipeline`] in tests/harnesses.
pub struct PipelineServices {
    pub image_gen: Arc<dyn ImageGenService>,
    pub store: Arc<dyn ObjectStore>,
    pub history: Arc<dyn HistoryRepository>,
    pub inspirations: Arc<dyn InspirationRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl PipelineServices {
    /// Bundle where one database backs every repository.
    pub fn with_database(
        image_gen: Arc<dyn ImageGenService>,
        store: Arc<dyn ObjectStore>,
        db: Database,
    ) -> Self {
        let db = Arc::new(db);
        Self {
            image_gen,
            store,
            history: db.clone(),
            inspirations: db.clone(),
            users: db,
        }
    }
}

impl Pipeline {
    pub fn with_services(services: PipelineServices) -> Self {
        Self {
            image_gen: services.image_gen,
            store: services.store,
            history: services.history,
            inspirations: services.inspirations,
            users: services.users,
            persist_retry_interval: PERSIST_RETRY_INTERVAL,
        }
    }

    /// Connect every production collaborator described by `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        // One connection pool shared by the upstream and storage clients.
        let http_client = reqwest::Client::new();

        let store: Arc<dyn ObjectStore> =
            Arc::new(SupabaseStorageClient::from_config(config, http_client.clone())?);
        let http = OpenRouterHttpClient::from_config(config, http_client);
        info!("Image provider: OpenRouter (model: {})", http.model());
        let image_gen = Arc::new(OpenRouterImageClient::new(http, store.clone()));

        let db = Database::connect(&config.database_url).await?;
        db.migrate().await?;

        Ok(Self::with_services(PipelineServices::with_database(image_gen, store, db)))
    }

    /// Resolve the caller; unknown or missing identities are rejected.
    pub async fn authenticate(&self, user_id: &str) -> Result<User> {
        require_user(user_id)?;
        self.users
            .get_user(user_id)
            .await?
            .ok_or(Error::Unauthenticated)
    }

    pub async fn run_generate(
        &self,
        user_id: &str,
        prompt: &str,
        api_key: &str,
    ) -> Result<GeneratedImage> {
        require_user(user_id)?;
        validation::prompt("prompt", prompt)?;
        validation::api_key(api_key)?;

        info!(
            "[{}] Generating image ({} chars)",
            user_id,
            prompt.chars().count()
        );
        let image = self.image_gen.generate(api_key, prompt).await.map_err(|e| {
            error!("[{}] Image generation failed: {}", user_id, e);
            e
        })?;

        let record = NewGeneration::new(user_id, prompt, &image);
        self.persist("generation", || self.history.record_generation(&record)).await?;

        info!("[{}] Generated {}", user_id, image.image_url);
        Ok(image)
    }

    pub async fn run_edit(
        &self,
        user_id: &str,
        image_url: &str,
        instruction: &str,
        api_key: &str,
    ) -> Result<GeneratedImage> {
        require_user(user_id)?;
        validation::http_url("imageUrl", image_url)?;
        validation::prompt("editPrompt", instruction)?;
        validation::api_key(api_key)?;

        info!("[{}] Editing image {}", user_id, image_url);
        let edited = self
            .image_gen
            .edit(api_key, image_url, instruction)
            .await
            .map_err(|e| {
                error!("[{}] Image edit failed: {}", user_id, e);
                e
            })?;

        let record = NewEdit::new(user_id, image_url, instruction, &edited);
        self.persist("edit", || self.history.record_edit(&record)).await?;

        info!("[{}] Edited into {}", user_id, edited.image_url);
        Ok(edited)
    }

    /// Store a caller-supplied image (raw base64 or a base64 data URI).
    pub async fn upload_user_image(
        &self,
        user_id: &str,
        file_name: &str,
        file_data: &str,
        mime_type: Option<&str>,
    ) -> Result<StoredObject> {
        require_user(user_id)?;
        if file_name.trim().is_empty() {
            return Err(Error::validation("fileName", "must not be empty"));
        }

        let payload = match file_data.split_once(',') {
            Some((header, data)) if header.starts_with("data:") => data,
            _ => file_data,
        };
        if payload.trim().is_empty() {
            return Err(Error::validation("fileData", "must not be empty"));
        }
        let bytes = data_uri::decode_base64(payload)
            .map_err(|e| Error::validation("fileData", format!("invalid base64: {}", e)))?;

        let mime_type = mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_UPLOAD_MIME);
        let key = keys::upload_key(user_id, file_name);

        let stored = self.store.put(&key, &bytes, mime_type).await?;
        info!(
            "[{}] Uploaded {} bytes to {}",
            user_id,
            bytes.len(),
            stored.key
        );
        Ok(stored)
    }

    pub async fn generation_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<GenerationRecord>> {
        require_user(user_id)?;
        let limit = validation::limit(limit)?;
        self.history.list_generations(user_id, limit).await
    }

    pub async fn edit_history(&self, user_id: &str, limit: i64) -> Result<Vec<EditRecord>> {
        require_user(user_id)?;
        let limit = validation::limit(limit)?;
        self.history.list_edits(user_id, limit).await
    }

    pub async fn validate_key(&self, user_id: &str, api_key: &str) -> Result<bool> {
        require_user(user_id)?;
        Ok(self.image_gen.validate_key(api_key).await)
    }

    pub async fn list_inspirations(&self, category: Option<&str>) -> Result<Vec<Inspiration>> {
        let category = category
            .filter(|c| !c.is_empty())
            .map(str::parse::<InspirationCategory>)
            .transpose()?;
        self.inspirations.list_inspirations(category).await
    }

    pub fn list_categories(&self) -> Vec<CategoryInfo> {
        InspirationCategory::ALL
            .into_iter()
            .map(|key| CategoryInfo {
                key,
                label: key.label(),
            })
            .collect()
    }

    /// An active template by id.
    pub async fn get_inspiration(&self, id: &str) -> Result<Inspiration> {
        self.inspirations
            .get_inspiration(id)
            .await?
            .filter(|i| i.is_active)
            .ok_or_else(|| Error::NotFound(format!("inspiration {}", id)))
    }

    pub async fn create_inspiration(&self, new: &NewInspiration) -> Result<String> {
        validation::bounded_text("title", &new.title, validation::MAX_TITLE_CHARS)?;
        validation::bounded_text("prompt", &new.prompt, validation::MAX_TEMPLATE_PROMPT_CHARS)?;
        validation::http_url("imageUrl", &new.image_url)?;
        self.inspirations.create_inspiration(new).await
    }

    pub async fn update_inspiration(
        &self,
        id: &str,
        update: &InspirationUpdate,
    ) -> Result<Inspiration> {
        if let Some(title) = &update.title {
            validation::bounded_text("title", title, validation::MAX_TITLE_CHARS)?;
        }
        if let Some(prompt) = &update.prompt {
            validation::bounded_text("prompt", prompt, validation::MAX_TEMPLATE_PROMPT_CHARS)?;
        }
        if let Some(image_url) = &update.image_url {
            validation::http_url("imageUrl", image_url)?;
        }
        self.inspirations.update_inspiration(id, update).await
    }

    pub async fn delete_inspiration(&self, id: &str) -> Result<()> {
        self.inspirations.soft_delete_inspiration(id).await
    }

    /// Write a history record, retrying only transient database failures.
    /// The record id is fixed before the first attempt, so a retry after an
    /// ambiguous failure cannot duplicate the row.
    async fn persist<F, Fut>(&self, what: &str, write: F) -> Result<String>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let strategy = FixedInterval::new(self.persist_retry_interval).take(PERSIST_RETRIES);

        RetryIf::spawn(strategy, write, |e: &Error| {
            let transient = e.is_transient();
            if transient {
                warn!("Saving {} record failed: {}. Will retry...", what, e);
            }
            transient
        })
        .await
        .map_err(|e| {
            error!("Failed to save {} record: {}", what, e);
            e
        })
    }
}

fn require_user(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(Error::Unauthenticated);
    }
    Ok(())
}
