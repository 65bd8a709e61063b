use super::rows::UserRow;
use super::{Database, UserRepository};
use crate::models::{User, UserRole};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

#[async_trait]
impl UserRepository for Database {
    async fn upsert_user(&self, id: &str, name: &str, email: &str, role: UserRole) -> Result<User> {
        let pool = self.pool()?;
        let now = Utc::now();

        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (id, name, email, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (id) DO UPDATE SET
                 name = excluded.name,
                 email = excluded.email,
                 role = excluded.role,
                 updated_at = excluded.updated_at
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role.as_str())
        .bind(now)
        .fetch_one(pool)
        .await?;

        row.try_into()
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let pool = self.pool()?;

        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let pool = self.pool()?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("user {}", id)));
        }
        tracing::info!("Deleted user {} and their history", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::database_with_users;
    use crate::db::HistoryRepository;
    use crate::models::{GeneratedImage, NewGeneration};

    #[tokio::test]
    async fn test_upsert_updates_existing_user() {
        let db = Database::connect_in_memory().await.unwrap();

        db.upsert_user("u1", "Ada", "ada@example.com", UserRole::User)
            .await
            .unwrap();
        let updated = db
            .upsert_user("u1", "Ada L.", "ada@example.com", UserRole::Admin)
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(db.get_user("u1").await.unwrap().unwrap().name, "Ada L.");
        assert!(db.get_user("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_cascades_history() {
        let db = database_with_users(&["u1"]).await;
        let image = GeneratedImage {
            image_url: "https://img.test/a.png".to_string(),
            image_key: None,
        };
        db.record_generation(&NewGeneration::new("u1", "shoe", &image))
            .await
            .unwrap();

        db.delete_user("u1").await.unwrap();

        assert!(db.list_generations("u1", 20).await.unwrap().is_empty());
        assert!(matches!(
            db.delete_user("u1").await.unwrap_err(),
            Error::NotFound(_)
        ));
    }
}
