use std::collections::HashSet;
use std::fs;

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::hash::IdGenerator;
use crate::services::id_taken;

#[derive(Deserialize)]
struct SkillRecord {
    name: String,
    #[serde(default)]
    authorized: bool,
}

/// Load a JSON array of `{"name", "authorized"}` objects into the skill
/// table. Names already stored (or repeated in the file) are skipped.
/// Returns the number of skills inserted.
pub async fn import_skills(
    pool: &SqlitePool,
    file_path: &str,
    max_attempts: u32,
) -> Result<usize, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;
    let records: Vec<SkillRecord> = serde_json::from_str(&content)?;
    let ids = IdGenerator::new(max_attempts);

    // Ids are drawn before the transaction opens so the lookups do not
    // compete with it for a connection.
    let mut batch: HashSet<String> = HashSet::new();
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        let id = ids
            .generate(|candidate| {
                let in_batch = batch.contains(&candidate);
                async move {
                    if in_batch {
                        return Ok(true);
                    }
                    id_taken(pool, "skill", &candidate).await
                }
            })
            .await?;
        batch.insert(id.clone());
        rows.push((id, name, record.authorized));
    }

    let now = Utc::now().to_rfc3339();
    let mut imported = 0;
    let mut tx = pool.begin().await?;

    for (id, name, authorized) in &rows {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO skill (id, name, authorized, added) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(authorized)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            imported += 1;
        } else {
            tracing::debug!(%name, "skill already present, skipped");
        }
    }

    tx.commit().await?;
    Ok(imported)
}
