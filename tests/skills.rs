mod common;

use axum::http::StatusCode;
use common::{TestApp, body_json};
use serde_json::json;

#[tokio::test]
async fn create_and_fetch_skill() {
    let app = TestApp::new().await;
    let id = app.create_skill("rust").await;

    let resp = app.get(&format!("/v1/skill/{id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let skill = body_json(resp).await;
    assert_eq!(skill["id"], id.as_str());
    assert_eq!(skill["name"], "rust");
    assert_eq!(skill["authorized"], true);
    assert!(skill["added"].as_str().is_some());
}

#[tokio::test]
async fn skill_lookups_404() {
    let app = TestApp::new().await;
    assert_eq!(app.get("/v1/skill/cd3123").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/v1/skill/cde431ca12").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/v1/skill/cde431ca12").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.delete("/v1/skill/CDE431CA12").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_skill_without_name_is_400() {
    let app = TestApp::new().await;
    let resp = app.post_json("/v1/skill", &json!({ "authorized": true })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "name is required");
}

#[tokio::test]
async fn duplicate_skill_name_is_400() {
    let app = TestApp::new().await;
    app.create_skill("rust").await;
    let resp = app.post_json("/v1/skill", &json!({ "name": "rust" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_added_timestamp_is_400() {
    let app = TestApp::new().await;
    let resp = app
        .post_json("/v1/skill", &json!({ "name": "rust", "added": "last tuesday" }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_skill() {
    let app = TestApp::new().await;
    let id = app.create_skill("rust").await;

    let resp = app
        .put_json("/v1/skill", &json!({ "id": id, "name": "rustlang", "authorized": 0 }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let skill = body_json(app.get(&format!("/v1/skill/{id}")).await).await;
    assert_eq!(skill["name"], "rustlang");
    assert_eq!(skill["authorized"], false);
}

#[tokio::test]
async fn update_skill_requires_valid_id() {
    let app = TestApp::new().await;
    let resp = app.put_json("/v1/skill", &json!({ "id": "xyz", "name": "rust" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.put_json("/v1/skill", &json!({ "name": "rust" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_skill_unlinks_users() {
    let app = TestApp::new().await;
    let id = app.create_skill("rust").await;
    let resp = app
        .post_json(
            "/v1/user",
            &json!({
                "first_name": "Ada",
                "last_name": "L",
                "email": "a@x.com",
                "teaching_skills": [id],
            }),
        )
        .await;
    let user_id = body_json(resp).await["id"].as_str().unwrap().to_string();

    let resp = app.delete(&format!("/v1/skill/{id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.get(&format!("/v1/skill/{id}")).await.status(), StatusCode::NOT_FOUND);

    let user = body_json(app.get(&format!("/v1/user/{user_id}")).await).await;
    assert_eq!(user["teaching_skills"], json!([]));
}

#[tokio::test]
async fn search_skills_by_term() {
    let app = TestApp::new().await;
    app.create_skill("rust").await;
    app.create_skill("trust building").await;
    app.create_skill("go").await;

    let resp = app.get("/v1/skill/search?term=rust").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let names: Vec<String> = body_json(resp)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["rust", "trust building"]);

    let resp = app.get("/v1/skill/search?term=%25").await;
    assert_eq!(body_json(resp).await, json!([]));

    let resp = app.get("/v1/skill/search").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
