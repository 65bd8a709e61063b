//! Data models and structures
//!
//! Defines the persisted records (generations, edits, inspirations, users),
//! the request DTOs accepted at the boundary, and the deployment
//! configuration.

use crate::{ids, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which upstream operation produced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOperation {
    Generate,
    Edit,
}

impl ImageOperation {
    pub fn no_image_message(&self) -> &'static str {
        match self {
            ImageOperation::Generate => "No image generated in response",
            ImageOperation::Edit => "No edited image in response",
        }
    }

    /// Storage namespace used when re-hosting an embedded image.
    pub fn key_namespace(&self) -> &'static str {
        match self {
            ImageOperation::Generate => "images/generated",
            ImageOperation::Edit => "images/edited",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Completed,
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(RecordStatus::Pending),
            "completed" => Ok(RecordStatus::Completed),
            "failed" => Ok(RecordStatus::Failed),
            other => Err(Error::validation(
                "status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InspirationCategory {
    Fashion,
    Shoes,
    Accessories,
    Home,
    Electronics,
    Beauty,
    Food,
    Other,
}

impl InspirationCategory {
    pub const ALL: [InspirationCategory; 8] = [
        InspirationCategory::Fashion,
        InspirationCategory::Shoes,
        InspirationCategory::Accessories,
        InspirationCategory::Home,
        InspirationCategory::Electronics,
        InspirationCategory::Beauty,
        InspirationCategory::Food,
        InspirationCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InspirationCategory::Fashion => "fashion",
            InspirationCategory::Shoes => "shoes",
            InspirationCategory::Accessories => "accessories",
            InspirationCategory::Home => "home",
            InspirationCategory::Electronics => "electronics",
            InspirationCategory::Beauty => "beauty",
            InspirationCategory::Food => "food",
            InspirationCategory::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InspirationCategory::Fashion => "Fashion",
            InspirationCategory::Shoes => "Shoes",
            InspirationCategory::Accessories => "Accessories",
            InspirationCategory::Home => "Home",
            InspirationCategory::Electronics => "Electronics",
            InspirationCategory::Beauty => "Beauty",
            InspirationCategory::Food => "Food",
            InspirationCategory::Other => "Other",
        }
    }
}

impl fmt::Display for InspirationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InspirationCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::validation("category", format!("unknown category '{}'", s)))
    }
}

/// One entry of the public category list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryInfo {
    pub key: InspirationCategory,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(Error::validation("role", format!("unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A completed text-to-image operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub image_url: String,
    pub image_key: Option<String>,
    pub status: RecordStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A completed image-to-image operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditRecord {
    pub id: String,
    pub user_id: String,
    pub original_image_url: String,
    pub original_image_key: Option<String>,
    pub edit_prompt: String,
    pub edited_image_url: String,
    pub edited_image_key: Option<String>,
    pub status: RecordStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A generation about to be persisted. The id is fixed up front so a
/// repeated insert of the same value is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGeneration {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub image_url: String,
    pub image_key: Option<String>,
}

impl NewGeneration {
    pub fn new(user_id: &str, prompt: &str, image: &GeneratedImage) -> Self {
        Self {
            id: ids::record_id("img_gen"),
            user_id: user_id.to_string(),
            prompt: prompt.to_string(),
            image_url: image.image_url.clone(),
            image_key: image.image_key.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEdit {
    pub id: String,
    pub user_id: String,
    pub original_image_url: String,
    pub original_image_key: Option<String>,
    pub edit_prompt: String,
    pub edited_image_url: String,
    pub edited_image_key: Option<String>,
}

impl NewEdit {
    pub fn new(
        user_id: &str,
        original_image_url: &str,
        edit_prompt: &str,
        edited: &GeneratedImage,
    ) -> Self {
        Self {
            id: ids::record_id("img_edit"),
            user_id: user_id.to_string(),
            original_image_url: original_image_url.to_string(),
            original_image_key: None,
            edit_prompt: edit_prompt.to_string(),
            edited_image_url: edited.image_url.clone(),
            edited_image_key: edited.image_key.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inspiration {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub image_url: String,
    pub image_key: Option<String>,
    pub category: InspirationCategory,
    pub tags: Option<Vec<String>>,
    pub note: Option<String>,
    pub order_weight: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating an inspiration template.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInspiration {
    pub title: String,
    pub prompt: String,
    pub image_url: String,
    pub image_key: Option<String>,
    pub category: InspirationCategory,
    pub tags: Option<Vec<String>>,
    pub note: Option<String>,
    #[serde(default)]
    pub order_weight: i64,
}

/// Partial update of an inspiration; only `Some` fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspirationUpdate {
    pub title: Option<String>,
    pub prompt: Option<String>,
    pub image_url: Option<String>,
    pub image_key: Option<String>,
    pub category: Option<InspirationCategory>,
    pub tags: Option<Vec<String>>,
    pub note: Option<String>,
    pub order_weight: Option<i64>,
    pub is_active: Option<bool>,
}

/// Image reference produced by the upstream API, after any re-hosting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub image_url: String,
    /// Set only when the image was re-hosted in the object store.
    pub image_key: Option<String>,
}

/// Location of an object in the object store.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

// Configuration
const DEFAULT_BUCKET: &str = "images";
const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_IMAGE_MODEL: &str = "google/gemini-2.5-flash-image-preview";
const DEFAULT_REFERER: &str = "https://product-image-studio.example.com";
const DEFAULT_TITLE: &str = "Product Image Studio";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub storage_bucket: String,
    pub openrouter_base_url: String,
    pub image_model: String,
    pub app_referer: String,
    pub app_title: String,
    pub upstream_timeout: Duration,
    pub bind_address: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            value(key).ok_or_else(|| Error::Config(format!("{} not set", key)))
        };
        let or_default =
            |key: &str, default: &str| value(key).unwrap_or_else(|| default.to_string());

        let upstream_timeout = match value("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("UPSTREAM_TIMEOUT_SECS must be a number, got '{}'", raw))
            })?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            supabase_url: required("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            supabase_service_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            storage_bucket: or_default("SUPABASE_STORAGE_BUCKET", DEFAULT_BUCKET),
            openrouter_base_url: or_default("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            image_model: or_default("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            app_referer: or_default("APP_REFERER", DEFAULT_REFERER),
            app_title: or_default("APP_TITLE", DEFAULT_TITLE),
            upstream_timeout: Duration::from_secs(upstream_timeout),
            bind_address: or_default("BIND_ADDRESS", DEFAULT_BIND_ADDRESS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&InspirationCategory::Electronics).unwrap();
        assert_eq!(json, "\"electronics\"");

        let parsed: InspirationCategory = serde_json::from_str("\"beauty\"").unwrap();
        assert_eq!(parsed, InspirationCategory::Beauty);
    }

    #[test]
    fn test_category_from_str_rejects_unknown() {
        assert_eq!(
            "food".parse::<InspirationCategory>().unwrap(),
            InspirationCategory::Food
        );
        let err = "toys".parse::<InspirationCategory>().unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "category"));
    }

    #[test]
    fn test_generation_record_uses_camel_case_names() {
        let now = Utc::now();
        let record = GenerationRecord {
            id: "img_gen_1".to_string(),
            user_id: "u1".to_string(),
            prompt: "red sneaker".to_string(),
            image_url: "https://cdn.example.com/a.png".to_string(),
            image_key: None,
            status: RecordStatus::Completed,
            error_message: None,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["imageUrl"], "https://cdn.example.com/a.png");
        assert_eq!(value["status"], "completed");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_config_requires_database_and_storage() {
        let err = Config::from_lookup(lookup_from(&[
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("DATABASE_URL")));

        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("SUPABASE_SERVICE_ROLE_KEY")));
    }

    #[test]
    fn test_config_defaults_and_trimming() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SUPABASE_URL", "https://x.supabase.co//"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ]))
        .unwrap();

        assert_eq!(config.supabase_url, "https://x.supabase.co");
        assert_eq!(config.storage_bucket, "images");
        assert_eq!(config.openrouter_base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.upstream_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
            ("UPSTREAM_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
