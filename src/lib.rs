pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod hash;
pub mod models;
pub mod routes;
pub mod serializer;
pub mod services;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use sqlx::SqlitePool;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::hash::IdGenerator;
use crate::services::{PartnershipManager, SkillService, TagService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub users: UserService,
    pub skills: SkillService,
    pub tags: TagService,
    pub partnerships: PartnershipManager,
}

impl AppState {
    pub fn new(pool: SqlitePool, ids: IdGenerator) -> Self {
        Self {
            users: UserService::new(pool.clone(), ids),
            skills: SkillService::new(pool.clone(), ids),
            tags: TagService::new(pool.clone()),
            partnerships: PartnershipManager::new(pool.clone(), ids),
            db: pool,
        }
    }
}

/// Readiness: the database must answer a trivial query.
async fn health(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => Ok("ok"),
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations on `pool` beforehand.
pub fn build_app(pool: SqlitePool, config: &Config) -> Router {
    let state = AppState::new(pool, IdGenerator::new(config.id_max_attempts));

    let api = Router::new()
        .route("/health", get(health))
        .merge(routes::users::router())
        .merge(routes::skills::router())
        .merge(routes::tags::router())
        .merge(routes::partnerships::router())
        .with_state(state);

    with_middleware(api, config)
}

/// Wrap `router` in the request deadline and HTTP tracing.
fn with_middleware(router: Router, config: &Config) -> Router {
    router
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
