use sqlx::SqlitePool;

use super::{ServiceError, ValidationError, check_id, fresh_id, id_taken};
use crate::hash::IdGenerator;
use crate::models::Partnership;

const PARTNERSHIP_COLUMNS: &str = "id, id_mentor, id_apprentice";

/// Creates and removes mentor/apprentice pairings.
#[derive(Clone)]
pub struct PartnershipManager {
    db: SqlitePool,
    ids: IdGenerator,
}

impl PartnershipManager {
    pub fn new(db: SqlitePool, ids: IdGenerator) -> Self {
        Self { db, ids }
    }

    /// Pair `mentor_id` with `apprentice_id`.
    ///
    /// Both users must exist. Returns `Ok(None)` when the same pairing is
    /// already active, since the insert then touches no rows.
    pub async fn create(
        &self,
        mentor_id: &str,
        apprentice_id: &str,
    ) -> Result<Option<Partnership>, ServiceError> {
        check_id(mentor_id)?;
        check_id(apprentice_id)?;
        if mentor_id == apprentice_id {
            return Err(ValidationError::Invalid {
                field: "apprentice",
                reason: "a user cannot mentor themselves".to_string(),
            }
            .into());
        }

        for (field, user_id) in [("mentor", mentor_id), ("apprentice", apprentice_id)] {
            let known = id_taken(&self.db, "user", user_id)
                .await
                .map_err(ServiceError::ExistenceCheck)?;
            if !known {
                return Err(ValidationError::Invalid {
                    field,
                    reason: format!("unknown user {user_id}"),
                }
                .into());
            }
        }

        let id = fresh_id(&self.ids, &self.db, "partnership").await?;
        let result = sqlx::query(
            r#"
            INSERT INTO partnership (id, id_mentor, id_apprentice)
            SELECT ?, ?, ?
            WHERE NOT EXISTS (
                SELECT 1 FROM partnership WHERE id_mentor = ? AND id_apprentice = ?
            )
            "#,
        )
        .bind(&id)
        .bind(mentor_id)
        .bind(apprentice_id)
        .bind(mentor_id)
        .bind(apprentice_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() < 1 {
            tracing::debug!(mentor_id, apprentice_id, "partnership already active");
            return Ok(None);
        }

        Ok(Some(Partnership {
            id: Some(id),
            mentor: Some(mentor_id.to_string()),
            apprentice: Some(apprentice_id.to_string()),
        }))
    }

    pub async fn retrieve(&self, id: &str) -> Result<Option<Partnership>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {PARTNERSHIP_COLUMNS} FROM partnership WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    /// Partnerships in which `user_id` is the mentor.
    pub async fn retrieve_by_mentor(&self, user_id: &str) -> Result<Vec<Partnership>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {PARTNERSHIP_COLUMNS} FROM partnership WHERE id_mentor = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    /// Partnerships in which `user_id` is the apprentice.
    pub async fn retrieve_by_apprentice(&self, user_id: &str) -> Result<Vec<Partnership>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {PARTNERSHIP_COLUMNS} FROM partnership WHERE id_apprentice = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        check_id(id)?;
        let result = sqlx::query("DELETE FROM partnership WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() >= 1)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, ServiceError> {
        check_id(id)?;
        id_taken(&self.db, "partnership", id)
            .await
            .map_err(ServiceError::ExistenceCheck)
    }
}
