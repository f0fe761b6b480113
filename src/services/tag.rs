use chrono::Utc;
use sqlx::SqlitePool;

use super::{ServiceError, check_timestamp, contains_pattern, required};
use crate::models::Tag;

#[derive(Clone)]
pub struct TagService {
    db: SqlitePool,
}

impl TagService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn retrieve(&self, name: &str) -> Result<Option<Tag>, ServiceError> {
        let name = required(Some(name), "name")?;
        let tag = sqlx::query_as("SELECT name, authorized, added FROM tag WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.db)
            .await?;
        Ok(tag)
    }

    pub async fn search_by_term(&self, term: &str) -> Result<Vec<Tag>, ServiceError> {
        let term = required(Some(term), "term")?;
        let tags = sqlx::query_as(
            "SELECT name, authorized, added FROM tag WHERE name LIKE ? ESCAPE '\\' ORDER BY name",
        )
        .bind(contains_pattern(term))
        .fetch_all(&self.db)
        .await?;
        Ok(tags)
    }

    /// Insert the tag; a tag that already exists only has its
    /// authorization updated.
    pub async fn save(&self, tag: &Tag) -> Result<bool, ServiceError> {
        let name = required(tag.name.as_deref(), "name")?;
        check_timestamp(tag.added.as_deref(), "added")?;
        let added = tag.added.clone().unwrap_or_else(|| Utc::now().to_rfc3339());

        let result = sqlx::query(
            r#"
            INSERT INTO tag (name, authorized, added)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET authorized = excluded.authorized
            "#,
        )
        .bind(name)
        .bind(tag.authorized.unwrap_or(false))
        .bind(&added)
        .execute(&self.db)
        .await?;

        if result.rows_affected() < 1 {
            tracing::debug!(name, "tag save touched no rows");
            return Ok(false);
        }
        Ok(true)
    }

    pub async fn delete(&self, name: &str) -> Result<bool, ServiceError> {
        let name = required(Some(name), "name")?;
        let result = sqlx::query("DELETE FROM tag WHERE name = ?")
            .bind(name)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() >= 1)
    }
}
