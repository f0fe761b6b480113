use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde_json::{Value, json};

use super::{SearchParams, clean_text, deleted, parse_body};
use crate::AppState;
use crate::error::AppError;
use crate::models::Tag;
use crate::serializer::{TagSerializer, WireMap, WireSerializer, to_wire_list};

/// `/v1/tag/search` shadows a tag of this name, so it is never stored.
const SEARCH_SEGMENT: &str = "search";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/tag", post(create_tag))
        .route("/v1/tag/search", get(search_tags))
        .route("/v1/tag/{name}", get(show_tag))
        .route("/v1/tag/{name}", delete(delete_tag))
}

async fn show_tag(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<WireMap>, AppError> {
    match state.tags.retrieve(&name).await {
        Ok(Some(tag)) => Ok(Json(TagSerializer.to_wire(&tag))),
        Ok(None) => Err(AppError::NotFound),
        Err(e) => {
            tracing::error!("Failed to load tag {name:?}: {e}");
            Err(AppError::NotFound)
        }
    }
}

async fn search_tags(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, AppError> {
    let tags = state.tags.search_by_term(params.term()).await?;
    Ok(Json(to_wire_list(&TagSerializer, &tags)))
}

async fn create_tag(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let raw = TagSerializer.from_wire(&parse_body(&body)?);
    let tag = Tag {
        name: clean_text(raw.name),
        authorized: raw.authorized,
        added: clean_text(raw.added),
    };
    if tag.name.as_deref() == Some(SEARCH_SEGMENT) {
        return Err(AppError::BadRequest(format!(
            "{SEARCH_SEGMENT:?} is reserved and cannot be used as a tag name"
        )));
    }

    if !state.tags.save(&tag).await? {
        return Err(AppError::BadRequest("Tag could not be saved".to_string()));
    }

    Ok((StatusCode::CREATED, Json(json!({ "name": tag.name }))))
}

async fn delete_tag(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    deleted(state.tags.delete(&name).await, "tag")
}
