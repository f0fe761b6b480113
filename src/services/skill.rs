use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{ServiceError, check_id, check_timestamp, contains_pattern, fresh_id, id_taken, required};
use crate::hash::IdGenerator;
use crate::models::Skill;

const SKILL_COLUMNS: &str = "id, name, authorized, added";

#[derive(Clone)]
pub struct SkillService {
    db: SqlitePool,
    ids: IdGenerator,
}

impl SkillService {
    pub fn new(db: SqlitePool, ids: IdGenerator) -> Self {
        Self { db, ids }
    }

    pub async fn retrieve(&self, id: &str) -> Result<Option<Skill>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {SKILL_COLUMNS} FROM skill WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    pub async fn retrieve_by_name(&self, name: &str) -> Result<Option<Skill>, ServiceError> {
        let name = required(Some(name), "name")?;
        let skill = sqlx::query_as(&format!("SELECT {SKILL_COLUMNS} FROM skill WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.db)
            .await?;
        Ok(skill)
    }

    /// Fetch every skill whose id is in `ids`; unknown ids are skipped.
    pub async fn retrieve_by_ids(&self, ids: &[String]) -> Result<Vec<Skill>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {SKILL_COLUMNS} FROM skill WHERE id IN ("));
        let mut list = query.separated(", ");
        for id in ids {
            list.push_bind(id.as_str());
        }
        list.push_unseparated(") ORDER BY name");

        query.build_query_as::<Skill>().fetch_all(&self.db).await
    }

    pub async fn search_by_term(&self, term: &str) -> Result<Vec<Skill>, ServiceError> {
        let term = required(Some(term), "term")?;
        let skills = sqlx::query_as(&format!(
            "SELECT {SKILL_COLUMNS} FROM skill WHERE name LIKE ? ESCAPE '\\' ORDER BY name"
        ))
        .bind(contains_pattern(term))
        .fetch_all(&self.db)
        .await?;
        Ok(skills)
    }

    /// Insert the skill, or update name and authorization if its id is
    /// already stored. A skill without an id gets a fresh one.
    pub async fn save(&self, skill: &mut Skill) -> Result<bool, ServiceError> {
        let name = required(skill.name.as_deref(), "name")?.to_string();
        if let Some(id) = &skill.id {
            check_id(id)?;
        }
        check_timestamp(skill.added.as_deref(), "added")?;

        if skill.id.is_none() {
            skill.id = Some(fresh_id(&self.ids, &self.db, "skill").await?);
        }
        let added = skill
            .added
            .get_or_insert_with(|| Utc::now().to_rfc3339())
            .clone();
        let authorized = skill.authorized.unwrap_or(false);
        skill.name = Some(name.clone());
        skill.authorized = Some(authorized);

        let result = sqlx::query(
            r#"
            INSERT INTO skill (id, name, authorized, added)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                authorized = excluded.authorized
            "#,
        )
        .bind(&skill.id)
        .bind(&name)
        .bind(authorized)
        .bind(&added)
        .execute(&self.db)
        .await?;

        if result.rows_affected() < 1 {
            tracing::debug!(id = ?skill.id, "skill save touched no rows");
            return Ok(false);
        }
        Ok(true)
    }

    /// Remove a skill and every teaching/learning link to it.
    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        check_id(id)?;

        let mut tx = self.db.begin().await?;
        for table in ["teaching_skills", "learning_skills"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE id_tag = ?"))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        let result = sqlx::query("DELETE FROM skill WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() >= 1)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, ServiceError> {
        check_id(id)?;
        id_taken(&self.db, "skill", id)
            .await
            .map_err(ServiceError::ExistenceCheck)
    }
}
