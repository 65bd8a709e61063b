//! Raw table rows and their conversion into domain records.

use crate::models::{EditRecord, GenerationRecord, Inspiration, User};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct GenerationRow {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub image_url: String,
    pub image_key: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<GenerationRow> for GenerationRecord {
    type Error = Error;

    fn try_from(row: GenerationRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            prompt: row.prompt,
            image_url: row.image_url,
            image_key: row.image_key,
            status: row.status.parse()?,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct EditRow {
    pub id: String,
    pub user_id: String,
    pub original_image_url: String,
    pub original_image_key: Option<String>,
    pub edit_prompt: String,
    pub edited_image_url: String,
    pub edited_image_key: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EditRow> for EditRecord {
    type Error = Error;

    fn try_from(row: EditRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            original_image_url: row.original_image_url,
            original_image_key: row.original_image_key,
            edit_prompt: row.edit_prompt,
            edited_image_url: row.edited_image_url,
            edited_image_key: row.edited_image_key,
            status: row.status.parse()?,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct InspirationRow {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub image_url: String,
    pub image_key: Option<String>,
    pub category: String,
    pub tags: Option<String>,
    pub note: Option<String>,
    pub order_weight: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<InspirationRow> for Inspiration {
    type Error = Error;

    fn try_from(row: InspirationRow) -> Result<Self> {
        let tags = row
            .tags
            .as_deref()
            .map(serde_json::from_str::<Vec<String>>)
            .transpose()?;

        Ok(Self {
            id: row.id,
            title: row.title,
            prompt: row.prompt,
            image_url: row.image_url,
            image_key: row.image_key,
            category: row.category.parse()?,
            tags,
            note: row.note,
            order_weight: row.order_weight,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(super) fn encode_tags(tags: Option<&Vec<String>>) -> Result<Option<String>> {
    Ok(tags.map(serde_json::to_string).transpose()?)
}
