#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use mentor_api::AppState;
use mentor_api::config::Config;
use mentor_api::hash::IdGenerator;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let router = mentor_api::build_app(pool.clone(), &Config::default());

        Self { router, db: pool }
    }

    /// Services sharing the test database.
    pub fn state(&self) -> AppState {
        AppState::new(self.db.clone(), IdGenerator::default())
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("DELETE")
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        self.send_json("POST", uri, body).await
    }

    pub async fn put_json(&self, uri: &str, body: &Value) -> Response {
        self.send_json("PUT", uri, body).await
    }

    async fn send_json(&self, method: &str, uri: &str, body: &Value) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    /// Create a skill through the API and return its id.
    pub async fn create_skill(&self, name: &str) -> String {
        let resp = self
            .post_json("/v1/skill", &serde_json::json!({ "name": name, "authorized": 1 }))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await["id"].as_str().unwrap().to_string()
    }

    /// Create a user through the API and return its id.
    pub async fn create_user(&self, first_name: &str) -> String {
        let resp = self
            .post_json(
                "/v1/user",
                &serde_json::json!({
                    "first_name": first_name,
                    "last_name": "Tester",
                    "email": format!("{}@example.com", first_name.to_lowercase()),
                    "mentor_available": 1,
                    "apprentice_available": 1,
                    "teaching_skills": [],
                    "learning_skills": [],
                    "timezone": "UTC",
                }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await["id"].as_str().unwrap().to_string()
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    let body = body_string(resp).await;
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("invalid JSON {body:?}: {e}"))
}
