use super::rows::{encode_tags, InspirationRow};
use super::{Database, InspirationRepository};
use crate::models::{Inspiration, InspirationCategory, InspirationUpdate, NewInspiration};
use crate::{ids, Error, Result};
use async_trait::async_trait;
use chrono::Utc;

const INSPIRATION_COLUMNS: &str = "id, title, prompt, image_url, image_key, category, tags, note, \
     order_weight, is_active, created_at, updated_at";

#[async_trait]
impl InspirationRepository for Database {
    async fn list_inspirations(
        &self,
        category: Option<InspirationCategory>,
    ) -> Result<Vec<Inspiration>> {
        let pool = self.pool()?;

        let rows: Vec<InspirationRow> = sqlx::query_as(&format!(
            "SELECT {}
             FROM inspirations
             WHERE is_active = 1 AND (?1 IS NULL OR category = ?1)
             ORDER BY order_weight DESC, created_at DESC, rowid DESC",
            INSPIRATION_COLUMNS
        ))
        .bind(category.map(|c| c.as_str()))
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(Inspiration::try_from).collect()
    }

    async fn get_inspiration(&self, id: &str) -> Result<Option<Inspiration>> {
        let pool = self.pool()?;

        let row: Option<InspirationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM inspirations WHERE id = ?1",
            INSPIRATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(Inspiration::try_from).transpose()
    }

    async fn create_inspiration(&self, new: &NewInspiration) -> Result<String> {
        let pool = self.pool()?;
        let id = ids::record_id("insp");
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO inspirations
                 (id, title, prompt, image_url, image_key, category, tags, note,
                  order_weight, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?10)",
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.prompt)
        .bind(&new.image_url)
        .bind(&new.image_key)
        .bind(new.category.as_str())
        .bind(encode_tags(new.tags.as_ref())?)
        .bind(&new.note)
        .bind(new.order_weight)
        .bind(now)
        .execute(pool)
        .await?;

        tracing::info!("Created inspiration {} ({})", id, new.category);
        Ok(id)
    }

    async fn update_inspiration(
        &self,
        id: &str,
        update: &InspirationUpdate,
    ) -> Result<Inspiration> {
        let current = self
            .get_inspiration(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("inspiration {}", id)))?;
        let pool = self.pool()?;

        let merged = Inspiration {
            title: update.title.clone().unwrap_or(current.title),
            prompt: update.prompt.clone().unwrap_or(current.prompt),
            image_url: update.image_url.clone().unwrap_or(current.image_url),
            image_key: update.image_key.clone().or(current.image_key),
            category: update.category.unwrap_or(current.category),
            tags: update.tags.clone().or(current.tags),
            note: update.note.clone().or(current.note),
            order_weight: update.order_weight.unwrap_or(current.order_weight),
            is_active: update.is_active.unwrap_or(current.is_active),
            updated_at: Utc::now(),
            ..current
        };

        sqlx::query(
            "UPDATE inspirations SET
                 title = ?2, prompt = ?3, image_url = ?4, image_key = ?5, category = ?6,
                 tags = ?7, note = ?8, order_weight = ?9, is_active = ?10, updated_at = ?11
             WHERE id = ?1",
        )
        .bind(&merged.id)
        .bind(&merged.title)
        .bind(&merged.prompt)
        .bind(&merged.image_url)
        .bind(&merged.image_key)
        .bind(merged.category.as_str())
        .bind(encode_tags(merged.tags.as_ref())?)
        .bind(&merged.note)
        .bind(merged.order_weight)
        .bind(merged.is_active)
        .bind(merged.updated_at)
        .execute(pool)
        .await?;

        Ok(merged)
    }

    async fn soft_delete_inspiration(&self, id: &str) -> Result<()> {
        let pool = self.pool()?;

        let result =
            sqlx::query("UPDATE inspirations SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("inspiration {}", id)));
        }
        tracing::info!("Soft-deleted inspiration {}", id);
        Ok(())
    }
}
