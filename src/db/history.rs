use super::rows::{EditRow, GenerationRow};
use super::{Database, HistoryRepository};
use crate::models::{EditRecord, GenerationRecord, NewEdit, NewGeneration, RecordStatus};
use crate::Result;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl HistoryRepository for Database {
    async fn record_generation(&self, record: &NewGeneration) -> Result<String> {
        let pool = self.pool()?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO image_generations
                 (id, user_id, prompt, image_url, image_key, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.prompt)
        .bind(&record.image_url)
        .bind(&record.image_key)
        .bind(RecordStatus::Completed.as_str())
        .bind(now)
        .execute(pool)
        .await?;

        tracing::debug!(
            "Recorded generation {} for user {}",
            record.id, record.user_id
        );
        Ok(record.id.clone())
    }

    async fn list_generations(&self, user_id: &str, limit: u32) -> Result<Vec<GenerationRecord>> {
        let pool = self.pool()?;

        let rows: Vec<GenerationRow> = sqlx::query_as(
            "SELECT id, user_id, prompt, image_url, image_key, status, error_message,
                    created_at, updated_at
             FROM image_generations
             WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(GenerationRecord::try_from).collect()
    }

    async fn record_edit(&self, record: &NewEdit) -> Result<String> {
        let pool = self.pool()?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO image_edits
                 (id, user_id, original_image_url, original_image_key, edit_prompt,
                  edited_image_url, edited_image_key, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.original_image_url)
        .bind(&record.original_image_key)
        .bind(&record.edit_prompt)
        .bind(&record.edited_image_url)
        .bind(&record.edited_image_key)
        .bind(RecordStatus::Completed.as_str())
        .bind(now)
        .execute(pool)
        .await?;

        tracing::debug!("Recorded edit {} for user {}", record.id, record.user_id);
        Ok(record.id.clone())
    }

    async fn list_edits(&self, user_id: &str, limit: u32) -> Result<Vec<EditRecord>> {
        let pool = self.pool()?;

        let rows: Vec<EditRow> = sqlx::query_as(
            "SELECT id, user_id, original_image_url, original_image_key, edit_prompt,
                    edited_image_url, edited_image_key, status, error_message,
                    created_at, updated_at
             FROM image_edits
             WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(EditRecord::try_from).collect()
    }
}
