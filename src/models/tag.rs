use chrono::Utc;
use sqlx::FromRow;

/// A free-form label, keyed by its name.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct Tag {
    pub name: Option<String>,
    pub authorized: Option<bool>,
    pub added: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into().trim().to_string()),
            authorized: Some(false),
            added: Some(Utc::now().to_rfc3339()),
        }
    }
}
