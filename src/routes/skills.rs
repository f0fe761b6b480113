use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use super::{SearchParams, clean_text, deleted, found, parse_body};
use crate::AppState;
use crate::error::AppError;
use crate::hash::is_valid_hash;
use crate::models::Skill;
use crate::serializer::{SkillSerializer, WireMap, WireSerializer, to_wire_list};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/skill", post(create_skill))
        .route("/v1/skill", put(update_skill))
        .route("/v1/skill/search", get(search_skills))
        .route("/v1/skill/{id}", get(show_skill))
        .route("/v1/skill/{id}", delete(delete_skill))
}

async fn show_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WireMap>, AppError> {
    if !is_valid_hash(&id) {
        return Err(AppError::NotFound);
    }
    let skill = found(state.skills.retrieve(&id).await, "skill")?;
    Ok(Json(SkillSerializer.to_wire(&skill)))
}

async fn delete_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !is_valid_hash(&id) {
        return Err(AppError::NotFound);
    }
    deleted(state.skills.delete(&id).await, "skill")
}

async fn search_skills(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, AppError> {
    let skills = state.skills.search_by_term(params.term()).await?;
    Ok(Json(to_wire_list(&SkillSerializer, &skills)))
}

async fn create_skill(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let mut skill = skill_from_payload(&parse_body(&body)?);
    skill.id = None;

    if !state.skills.save(&mut skill).await? {
        return Err(AppError::BadRequest("Skill could not be saved".to_string()));
    }

    tracing::info!(id = ?skill.id, name = ?skill.name, "created skill");
    Ok((StatusCode::CREATED, Json(json!({ "id": skill.id }))))
}

async fn update_skill(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let mut skill = skill_from_payload(&parse_body(&body)?);

    match skill.id.as_deref() {
        Some(id) if is_valid_hash(id) => {}
        _ => return Err(AppError::BadRequest("A valid skill id is required".to_string())),
    }

    if !state.skills.save(&mut skill).await? {
        return Err(AppError::BadRequest("Skill could not be saved".to_string()));
    }

    Ok((StatusCode::OK, Json(json!({ "id": skill.id }))))
}

fn skill_from_payload(values: &WireMap) -> Skill {
    let raw = SkillSerializer.from_wire(values);
    Skill {
        id: raw.id.map(|id| id.trim().to_string()),
        name: clean_text(raw.name),
        authorized: raw.authorized,
        added: clean_text(raw.added),
    }
}
