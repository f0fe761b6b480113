mod common;

use common::TestApp;
use mentor_api::cli::import_skills;

fn write_fixture(contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("skills-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn imports_new_skills_and_skips_known_names() {
    let app = TestApp::new().await;
    app.create_skill("rust").await;

    let path = write_fixture(
        r#"[
            {"name": "rust"},
            {"name": "go", "authorized": true},
            {"name": "  "},
            {"name": "sql"},
            {"name": "go"}
        ]"#,
    );

    let imported = import_skills(&app.db, path.to_str().unwrap(), 10).await.unwrap();
    assert_eq!(imported, 2);

    let state = app.state();
    let go = state.skills.retrieve_by_name("go").await.unwrap().unwrap();
    assert_eq!(go.authorized, Some(true));
    let sql = state.skills.retrieve_by_name("sql").await.unwrap().unwrap();
    assert_eq!(sql.authorized, Some(false));

    std::fs::remove_file(path).ok();
}

#[tokio::test]
async fn rejects_malformed_file() {
    let app = TestApp::new().await;
    let path = write_fixture("{\"name\": \"not a list\"}");

    assert!(import_skills(&app.db, path.to_str().unwrap(), 10).await.is_err());

    std::fs::remove_file(path).ok();
}
