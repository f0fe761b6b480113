use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

use super::{deleted, found, parse_body};
use crate::AppState;
use crate::error::AppError;
use crate::hash::is_valid_hash;
use crate::serializer::{PartnershipSerializer, WireMap, WireSerializer};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/partnership", post(create_partnership))
        .route("/v1/partnership/{id}", get(show_partnership))
        .route("/v1/partnership/{id}", delete(delete_partnership))
}

async fn show_partnership(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WireMap>, AppError> {
    if !is_valid_hash(&id) {
        return Err(AppError::NotFound);
    }
    let partnership = found(state.partnerships.retrieve(&id).await, "partnership")?;
    Ok(Json(PartnershipSerializer.to_wire(&partnership)))
}

async fn create_partnership(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let requested = PartnershipSerializer.from_wire(&parse_body(&body)?);
    let mentor = requested.mentor.unwrap_or_default();
    let apprentice = requested.apprentice.unwrap_or_default();

    let Some(partnership) = state
        .partnerships
        .create(mentor.trim(), apprentice.trim())
        .await?
    else {
        return Err(AppError::BadRequest("Partnership already exists".to_string()));
    };

    tracing::info!(id = ?partnership.id, %mentor, %apprentice, "created partnership");
    Ok((
        StatusCode::CREATED,
        Json(PartnershipSerializer.to_wire(&partnership)),
    ))
}

async fn delete_partnership(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !is_valid_hash(&id) {
        return Err(AppError::NotFound);
    }
    deleted(state.partnerships.delete(&id).await, "partnership")
}
