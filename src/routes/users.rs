use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;

use super::{clean_email, clean_text, deleted, found, parse_body};
use crate::AppState;
use crate::error::AppError;
use crate::hash::is_valid_hash;
use crate::models::{Skill, User};
use crate::serializer::{
    PartnershipSerializer, SkillSerializer, UserSerializer, WireMap, WireSerializer, to_wire_list,
};
use crate::services::{ServiceError, SkillService, UserService};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/user", post(create_user))
        .route("/v1/user", put(update_user))
        .route("/v1/user/{id}", get(show_user))
        .route("/v1/user/{id}", delete(delete_user))
}

async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WireMap>, AppError> {
    if !is_valid_hash(&id) {
        return Err(AppError::NotFound);
    }
    let user = found(state.users.retrieve(&id).await, "user")?;

    let mentoring = state
        .partnerships
        .retrieve_by_mentor(&id)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to load mentorships for {id}: {e}");
            Vec::new()
        });
    let apprenticing = state
        .partnerships
        .retrieve_by_apprentice(&id)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to load apprenticeships for {id}: {e}");
            Vec::new()
        });

    let mut body = UserSerializer.to_wire(&user);
    body.insert(
        "teaching_skills".into(),
        to_wire_list(&SkillSerializer, &user.teaching_skills),
    );
    body.insert(
        "learning_skills".into(),
        to_wire_list(&SkillSerializer, &user.learning_skills),
    );
    body.insert(
        "partnerships".into(),
        json!({
            "mentoring": to_wire_list(&PartnershipSerializer, &mentoring),
            "apprenticing": to_wire_list(&PartnershipSerializer, &apprenticing),
        }),
    );

    Ok(Json(body))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !is_valid_hash(&id) {
        return Err(AppError::NotFound);
    }
    deleted(state.users.delete(&id).await, "user")
}

async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let raw = UserSerializer.from_wire(&parse_body(&body)?);
    let mut user = user_fields(&raw);
    user.id = None;
    UserService::validate(&user).map_err(ServiceError::from)?;
    attach_skills(&state.skills, &mut user, &raw).await?;

    if !state.users.create(&mut user).await? {
        return Err(AppError::BadRequest("User could not be created".to_string()));
    }

    tracing::info!(id = ?user.id, "created user");
    Ok((StatusCode::CREATED, Json(json!({ "id": user.id }))))
}

async fn update_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let raw = UserSerializer.from_wire(&parse_body(&body)?);
    let mut user = user_fields(&raw);

    match user.id.as_deref() {
        Some(id) if is_valid_hash(id) => {}
        _ => return Err(AppError::BadRequest("A valid user id is required".to_string())),
    }
    UserService::validate(&user).map_err(ServiceError::from)?;
    attach_skills(&state.skills, &mut user, &raw).await?;

    if !state.users.update(&user).await? {
        return Err(AppError::BadRequest("User could not be updated".to_string()));
    }

    Ok((StatusCode::OK, Json(json!({ "id": user.id }))))
}

/// Copy the scalar fields of a request onto a fresh `User`, sanitizing text.
fn user_fields(raw: &User) -> User {
    User {
        id: raw.id.as_deref().map(|id| id.trim().to_string()),
        first_name: clean_text(raw.first_name.clone()),
        last_name: clean_text(raw.last_name.clone()),
        email: clean_email(raw.email.clone()),
        irc_nick: clean_text(raw.irc_nick.clone()),
        twitter_handle: clean_text(raw.twitter_handle.clone()),
        github_handle: clean_text(raw.github_handle.clone()),
        mentor_available: Some(raw.mentor_available.unwrap_or(false)),
        apprentice_available: Some(raw.apprentice_available.unwrap_or(false)),
        timezone: clean_text(raw.timezone.clone()),
        ..User::default()
    }
}

/// Resolve the requested skill ids against storage. Unknown or malformed
/// ids are dropped.
async fn attach_skills(skills: &SkillService, user: &mut User, raw: &User) -> Result<(), AppError> {
    for skill in resolve_skills(skills, &raw.teaching_skills).await? {
        user.add_teaching_skill(skill);
    }
    for skill in resolve_skills(skills, &raw.learning_skills).await? {
        user.add_learning_skill(skill);
    }
    Ok(())
}

async fn resolve_skills(skills: &SkillService, requested: &[Skill]) -> Result<Vec<Skill>, sqlx::Error> {
    let ids: Vec<String> = requested
        .iter()
        .filter_map(|s| s.id.as_deref())
        .filter(|id| is_valid_hash(id))
        .map(str::to_string)
        .collect();

    skills.retrieve_by_ids(&ids).await
}
