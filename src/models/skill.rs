use chrono::Utc;
use sqlx::FromRow;

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct Skill {
    pub id: Option<String>,
    pub name: Option<String>,
    pub authorized: Option<bool>,
    /// RFC 3339 timestamp of when the skill was first stored.
    pub added: Option<String>,
}

impl Skill {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            authorized: Some(false),
            added: Some(Utc::now().to_rfc3339()),
        }
    }
}
