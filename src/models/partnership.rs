use sqlx::FromRow;

/// An active pairing of a mentor with an apprentice, both user ids.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct Partnership {
    pub id: Option<String>,
    #[sqlx(rename = "id_mentor")]
    pub mentor: Option<String>,
    #[sqlx(rename = "id_apprentice")]
    pub apprentice: Option<String>,
}
