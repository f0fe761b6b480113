use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{ServiceError, ValidationError, check_id, fresh_id, id_taken, required};
use crate::hash::IdGenerator;
use crate::models::{Skill, User};

const USER_COLUMNS: &str = "id, first_name, last_name, email, irc_nick, twitter_handle, \
     github_handle, mentor_available, apprentice_available, timezone";

/// Which of the two user/skill join tables a list lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillList {
    Teaching,
    Learning,
}

impl SkillList {
    fn table(self) -> &'static str {
        match self {
            SkillList::Teaching => "teaching_skills",
            SkillList::Learning => "learning_skills",
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    db: SqlitePool,
    ids: IdGenerator,
}

impl UserService {
    pub fn new(db: SqlitePool, ids: IdGenerator) -> Self {
        Self { db, ids }
    }

    /// Check the fields every stored user must carry.
    pub fn validate(user: &User) -> Result<(), ValidationError> {
        required(user.first_name.as_deref(), "first_name")?;
        required(user.last_name.as_deref(), "last_name")?;
        required(user.email.as_deref(), "email")?;
        Ok(())
    }

    /// Load a user together with both skill lists.
    pub async fn retrieve(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        if id.is_empty() {
            return Ok(None);
        }

        let user: Option<User> = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        let Some(mut user) = user else {
            return Ok(None);
        };

        user.teaching_skills = self.skills_for(id, SkillList::Teaching).await?;
        user.learning_skills = self.skills_for(id, SkillList::Learning).await?;
        Ok(Some(user))
    }

    async fn skills_for(&self, user_id: &str, list: SkillList) -> Result<Vec<Skill>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT s.id, s.name, s.authorized, s.added
            FROM skill s
            JOIN {table} j ON j.id_tag = s.id
            WHERE j.id_user = ?
            ORDER BY s.name
            "#,
            table = list.table()
        );
        sqlx::query_as(&query).bind(user_id).fetch_all(&self.db).await
    }

    /// Store a new user and its skill lists. A user without an id gets a
    /// fresh one, written back into `user`.
    pub async fn create(&self, user: &mut User) -> Result<bool, ServiceError> {
        Self::validate(user)?;
        if let Some(id) = &user.id {
            check_id(id)?;
        }

        let id = match user.id.clone() {
            Some(id) => id,
            None => fresh_id(&self.ids, &self.db, "user").await?,
        };
        user.id = Some(id.clone());

        let mut tx = self.db.begin().await?;
        let result = sqlx::query(&format!(
            "INSERT INTO user ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.irc_nick)
        .bind(&user.twitter_handle)
        .bind(&user.github_handle)
        .bind(user.mentor_available)
        .bind(user.apprentice_available)
        .bind(&user.timezone)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() < 1 {
            tracing::debug!(%id, "user insert touched no rows");
            return Ok(false);
        }

        insert_skills(&mut tx, &id, SkillList::Teaching, &user.teaching_skills).await?;
        insert_skills(&mut tx, &id, SkillList::Learning, &user.learning_skills).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Replace every stored field of an existing user, including both
    /// skill lists. Last writer wins.
    pub async fn update(&self, user: &User) -> Result<bool, ServiceError> {
        let id = user.id.as_deref().ok_or(ValidationError::MissingField("id"))?;
        check_id(id)?;
        Self::validate(user)?;

        let mut tx = self.db.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE user SET
                first_name = ?,
                last_name = ?,
                email = ?,
                irc_nick = ?,
                twitter_handle = ?,
                github_handle = ?,
                mentor_available = ?,
                apprentice_available = ?,
                timezone = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.irc_nick)
        .bind(&user.twitter_handle)
        .bind(&user.github_handle)
        .bind(user.mentor_available)
        .bind(user.apprentice_available)
        .bind(&user.timezone)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() < 1 {
            tracing::debug!(id, "user update touched no rows");
            return Ok(false);
        }

        for list in [SkillList::Teaching, SkillList::Learning] {
            sqlx::query(&format!("DELETE FROM {} WHERE id_user = ?", list.table()))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        insert_skills(&mut tx, id, SkillList::Teaching, &user.teaching_skills).await?;
        insert_skills(&mut tx, id, SkillList::Learning, &user.learning_skills).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Remove a user, its skill links and every partnership it is part of.
    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        check_id(id)?;

        let mut tx = self.db.begin().await?;
        for list in [SkillList::Teaching, SkillList::Learning] {
            sqlx::query(&format!("DELETE FROM {} WHERE id_user = ?", list.table()))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM partnership WHERE id_mentor = ? OR id_apprentice = ?")
            .bind(id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM user WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() < 1 {
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, ServiceError> {
        check_id(id)?;
        id_taken(&self.db, "user", id)
            .await
            .map_err(ServiceError::ExistenceCheck)
    }
}

/// Skills without an id are skipped; duplicates in the list are ignored.
async fn insert_skills(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
    list: SkillList,
    skills: &[Skill],
) -> Result<(), sqlx::Error> {
    let query = format!("INSERT OR IGNORE INTO {} (id_user, id_tag) VALUES (?, ?)", list.table());
    for skill_id in skills.iter().filter_map(|s| s.id.as_deref()) {
        sqlx::query(&query)
            .bind(user_id)
            .bind(skill_id)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}
