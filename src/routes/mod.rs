//! JSON handlers for the `/v1` API.

pub mod partnerships;
pub mod skills;
pub mod tags;
pub mod users;

use axum::body::Bytes;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::AppError;
use crate::serializer::WireMap;
use crate::services::ServiceError;

#[derive(Deserialize)]
pub struct SearchParams {
    term: Option<String>,
}

impl SearchParams {
    fn term(&self) -> &str {
        self.term.as_deref().unwrap_or_default()
    }
}

/// Parse a request body as a JSON object. Anything else is a bad request.
fn parse_body(body: &Bytes) -> Result<WireMap, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

/// Interpret a point read: storage failures are logged and answered the
/// same way as a missing row.
fn found<T>(result: Result<Option<T>, sqlx::Error>, entity: &str) -> Result<T, AppError> {
    match result {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(AppError::NotFound),
        Err(e) => {
            tracing::error!("Failed to load {entity}: {e}");
            Err(AppError::NotFound)
        }
    }
}

/// A delete that removed nothing, or failed, is a 404.
fn deleted(result: Result<bool, ServiceError>, entity: &str) -> Result<StatusCode, AppError> {
    match result {
        Ok(true) => Ok(StatusCode::OK),
        Ok(false) => Err(AppError::NotFound),
        Err(e) if e.is_fatal() => Err(AppError::Aborted(e)),
        Err(e) => {
            tracing::error!("Failed to delete {entity}: {e}");
            Err(AppError::NotFound)
        }
    }
}

/// Strip markup tags and surrounding whitespace; blank becomes `None`.
pub fn clean_text(value: Option<String>) -> Option<String> {
    let value = value?;
    let mut cleaned = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag || c.is_control() => {}
            _ => cleaned.push(c),
        }
    }
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Keep only the characters allowed in an email address.
pub fn clean_email(value: Option<String>) -> Option<String> {
    let cleaned: String = value?
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-=?^_`{|}~@.[]".contains(*c))
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_tags_and_blanks() {
        assert_eq!(clean_text(Some("  Ada ".into())), Some("Ada".into()));
        assert_eq!(clean_text(Some("<b>Ada</b>".into())), Some("Ada".into()));
        assert_eq!(clean_text(Some("<script>".into())), None);
        assert_eq!(clean_text(Some("a > b".into())), Some("a > b".into()));
        assert_eq!(clean_text(None), None);
    }

    #[test]
    fn clean_email_drops_disallowed_characters() {
        assert_eq!(clean_email(Some(" a@x.com ".into())), Some("a@x.com".into()));
        assert_eq!(clean_email(Some("a(b)@x.com".into())), Some("ab@x.com".into()));
        assert_eq!(clean_email(Some("()".into())), None);
    }

    #[test]
    fn parse_body_requires_an_object() {
        assert!(parse_body(&Bytes::from_static(br#"{"name":"rust"}"#)).is_ok());
        assert!(matches!(
            parse_body(&Bytes::from_static(b"[1, 2]")),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_body(&Bytes::from_static(b"not json")),
            Err(AppError::BadRequest(_))
        ));
    }
}
