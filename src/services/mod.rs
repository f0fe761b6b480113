//! Data-access services, one per entity.
//!
//! Reads return `Ok(None)` for a missing row. Mutations return `Ok(true)`
//! only when the statement ran and touched at least one row, so a no-op
//! update is reported as `Ok(false)` rather than as an error.

pub mod partnership;
pub mod skill;
pub mod tag;
pub mod user;

pub use partnership::PartnershipManager;
pub use skill::SkillService;
pub use tag::TagService;
pub use user::UserService;

use chrono::DateTime;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::hash::{IdError, IdGenerator, is_valid_hash};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("malformed identifier: {0:?}")]
    MalformedId(String),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Identifier generation could not complete; the operation is aborted.
    #[error(transparent)]
    Identifier(#[from] IdError),
    /// A referenced row could not be looked up; the operation is aborted.
    #[error("existence check failed: {0}")]
    ExistenceCheck(#[source] sqlx::Error),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ServiceError {
    /// Fatal errors abort the request; the others are soft failures.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Identifier(_) | Self::ExistenceCheck(_))
    }
}

/// Trimmed, non-empty value of a required field.
pub(crate) fn required<'a>(
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

pub(crate) fn check_id(id: &str) -> Result<(), ValidationError> {
    if is_valid_hash(id) {
        Ok(())
    } else {
        Err(ValidationError::MalformedId(id.to_string()))
    }
}

pub(crate) fn check_timestamp(value: Option<&str>, field: &'static str) -> Result<(), ValidationError> {
    match value {
        Some(ts) => DateTime::parse_from_rfc3339(ts)
            .map(|_| ())
            .map_err(|e| ValidationError::Invalid {
                field,
                reason: e.to_string(),
            }),
        None => Ok(()),
    }
}

/// Point lookup of `id` in one of the id-keyed tables.
pub async fn id_taken(db: &SqlitePool, table: &'static str, id: &str) -> Result<bool, sqlx::Error> {
    let query = format!("SELECT COUNT(*) FROM {table} WHERE id = ?");
    let (count,): (i64,) = sqlx::query_as(&query).bind(id).fetch_one(db).await?;
    Ok(count > 0)
}

/// Draw a fresh identifier for `table`.
pub(crate) async fn fresh_id(ids: &IdGenerator, db: &SqlitePool, table: &'static str) -> Result<String, IdError> {
    ids.generate(|candidate| async move { id_taken(db, table, &candidate).await })
        .await
}

/// `LIKE` pattern matching `term` anywhere, with wildcards in the term escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_values() {
        assert_eq!(required(Some(" Ada "), "first_name"), Ok("Ada"));
        assert_eq!(
            required(Some("   "), "first_name"),
            Err(ValidationError::MissingField("first_name"))
        );
        assert_eq!(required(None, "email"), Err(ValidationError::MissingField("email")));
    }

    #[test]
    fn timestamps_must_be_rfc3339() {
        assert!(check_timestamp(Some("2014-01-12T09:30:00+00:00"), "added").is_ok());
        assert!(check_timestamp(None, "added").is_ok());
        assert!(matches!(
            check_timestamp(Some("yesterday"), "added"),
            Err(ValidationError::Invalid { field: "added", .. })
        ));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("rust"), "%rust%");
        assert_eq!(contains_pattern("100%_a"), "%100\\%\\_a%");
    }

    #[test]
    fn fatal_errors_are_flagged() {
        assert!(ServiceError::ExistenceCheck(sqlx::Error::PoolClosed).is_fatal());
        assert!(ServiceError::Identifier(IdError::Exhausted { attempts: 1 }).is_fatal());
        assert!(!ServiceError::Storage(sqlx::Error::PoolClosed).is_fatal());
        assert!(!ServiceError::from(ValidationError::MissingField("name")).is_fatal());
    }
}
