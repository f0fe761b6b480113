//! Short hex identifiers used as primary keys for users, skills and
//! partnerships.

use std::future::Future;
use std::sync::LazyLock;

use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

pub const HASH_LENGTH: usize = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

static HASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{10}$").expect("hash pattern is a valid regex"));

/// Returns true iff `candidate` is exactly ten lowercase hex characters.
pub fn is_valid_hash(candidate: &str) -> bool {
    HASH_PATTERN.is_match(candidate)
}

#[derive(Debug, Error)]
pub enum IdError {
    #[error("no free identifier found after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error("identifier existence check failed: {0}")]
    Storage(#[source] sqlx::Error),
}

/// Produces identifiers that the owning table does not contain yet.
///
/// The generator knows nothing about storage; callers pass an `exists`
/// predicate that looks the candidate up in their own table.
#[derive(Debug, Clone, Copy)]
pub struct IdGenerator {
    max_attempts: u32,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl IdGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generate a token for which `exists` reports `Ok(false)`.
    ///
    /// A failing predicate aborts generation: a lookup error is never read
    /// as "free".
    pub async fn generate<F, Fut>(&self, mut exists: F) -> Result<String, IdError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<bool, sqlx::Error>>,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = candidate();
            match exists(candidate.clone()).await {
                Ok(false) => return Ok(candidate),
                Ok(true) => {
                    tracing::warn!(attempt, %candidate, "generated identifier already in use");
                }
                Err(e) => return Err(IdError::Storage(e)),
            }
        }
        Err(IdError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

/// Hash a mix of entropy sources, shuffle the hex digest and cut a window
/// of `HASH_LENGTH` characters out of it.
fn candidate() -> String {
    let mut rng = rand::rng();
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let material = format!("{}{}{}", Uuid::new_v4().simple(), nanos, rng.random::<u64>());

    let mut digits: Vec<char> = hex::encode(Sha256::digest(material.as_bytes()))
        .chars()
        .collect();
    digits.shuffle(&mut rng);

    let start = rng.random_range(0..=digits.len() - HASH_LENGTH);
    digits[start..start + HASH_LENGTH].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_hash_pattern() {
        assert!(is_valid_hash("cde431ca12"));
        assert!(is_valid_hash("0000000000"));
        assert!(!is_valid_hash("cd3123"));
        assert!(!is_valid_hash("CDE431CA12"));
        assert!(!is_valid_hash("cde431ca12a"));
        assert!(!is_valid_hash("cde431ca1g"));
        assert!(!is_valid_hash("not-a-hash"));
        assert!(!is_valid_hash(""));
        assert!(!is_valid_hash("cde431ca12\n"));
    }

    #[test]
    fn candidates_match_the_pattern() {
        for _ in 0..200 {
            let token = candidate();
            assert!(is_valid_hash(&token), "bad token {token}");
        }
    }

    #[tokio::test]
    async fn returns_first_free_candidate() {
        let id = IdGenerator::default()
            .generate(|_| async { Ok(false) })
            .await
            .unwrap();
        assert!(is_valid_hash(&id));
    }

    #[tokio::test]
    async fn retries_after_a_collision() {
        let mut seen = Vec::new();
        let id = IdGenerator::default()
            .generate(|candidate| {
                seen.push(candidate);
                let taken = seen.len() == 1;
                async move { Ok(taken) }
            })
            .await
            .unwrap();

        assert_eq!(seen.len(), 2);
        assert_eq!(id, seen[1]);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let err = IdGenerator::new(3)
            .generate(|_| {
                calls += 1;
                async { Ok(true) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, IdError::Exhausted { attempts: 3 }));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn lookup_failure_is_not_treated_as_free() {
        let mut calls = 0;
        let err = IdGenerator::default()
            .generate(|_| {
                calls += 1;
                async { Err(sqlx::Error::PoolClosed) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, IdError::Storage(sqlx::Error::PoolClosed)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn zero_attempts_is_clamped() {
        assert_eq!(IdGenerator::new(0).max_attempts(), 1);
    }
}
