use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use loghive::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;

    let state = loghive::api::create_app_state(config)
        .await
        .expect("Failed to create app state");
    loghive::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn signup(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "email": email,
            "password": password,
            "display_name": "Test User"
        })),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_signup_login_round_trip() {
    let app = spawn_app().await;

    let (status, body) = signup(&app, "a@x.com", "password123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "a@x.com");
    // The password never appears in any response shape.
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());

    let token = login(&app, "a@x.com", "password123").await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "a@x.com");

    // Wrong password and unknown email are the same 401.
    let (wrong_pw_status, wrong_pw_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "wrong-password" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "password123" })),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body["error"], unknown_body["error"]);
}

#[tokio::test]
async fn test_signup_conflict_and_validation() {
    let app = spawn_app().await;

    let (status, _) = signup(&app, "a@x.com", "password123").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = signup(&app, "a@x.com", "password456").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = signup(&app, "not-an-email", "password123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = signup(&app, "b@x.com", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_requests_without_token_rejected() {
    let app = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password() {
    let app = spawn_app().await;

    signup(&app, "a@x.com", "password123").await;
    let token = login(&app, "a@x.com", "password123").await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&token),
        Some(json!({
            "current_password": "wrong-password",
            "new_password": "new-password-9"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(&token),
        Some(json!({
            "current_password": "password123",
            "new_password": "new-password-9"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@x.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    login(&app, "a@x.com", "new-password-9").await;
}

#[tokio::test]
async fn test_project_crud() {
    let app = spawn_app().await;

    signup(&app, "a@x.com", "password123").await;
    let token = login(&app, "a@x.com", "password123").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/projects",
        Some(&token),
        Some(json!({ "name": "demo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "demo");
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/projects", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "demo");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{project_id}"),
        Some(&token),
        Some(json!({ "name": "renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "renamed");
    assert!(body["data"]["updated_at"].is_string());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{project_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_name_unique_per_owner() {
    let app = spawn_app().await;

    signup(&app, "a@x.com", "password123").await;
    signup(&app, "b@x.com", "password123").await;
    let token_a = login(&app, "a@x.com", "password123").await;
    let token_b = login(&app, "b@x.com", "password123").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/projects",
        Some(&token_a),
        Some(json!({ "name": "demo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Same owner, same name: conflict.
    let (status, _) = send(
        &app,
        "POST",
        "/api/projects",
        Some(&token_a),
        Some(json!({ "name": "demo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Different owner, same name: fine.
    let (status, _) = send(
        &app,
        "POST",
        "/api/projects",
        Some(&token_b),
        Some(json!({ "name": "demo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/projects",
        Some(&token_a),
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_checks_uniqueness_excluding_self() {
    let app = spawn_app().await;

    signup(&app, "a@x.com", "password123").await;
    let token = login(&app, "a@x.com", "password123").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/projects",
        Some(&token),
        Some(json!({ "name": "alpha" })),
    )
    .await;
    let alpha_id = body["data"]["id"].as_str().unwrap().to_string();

    send(
        &app,
        "POST",
        "/api/projects",
        Some(&token),
        Some(json!({ "name": "beta" })),
    )
    .await;

    // Renaming alpha to its own name is a no-op, not a conflict.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/projects/{alpha_id}"),
        Some(&token),
        Some(json!({ "name": "alpha" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Renaming alpha onto beta's name conflicts.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/projects/{alpha_id}"),
        Some(&token),
        Some(json!({ "name": "beta" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_ownership_opacity() {
    let app = spawn_app().await;

    signup(&app, "a@x.com", "password123").await;
    signup(&app, "b@x.com", "password123").await;
    let token_a = login(&app, "a@x.com", "password123").await;
    let token_b = login(&app, "b@x.com", "password123").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/projects",
        Some(&token_a),
        Some(json!({ "name": "secret" })),
    )
    .await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    // A foreign project and a nonexistent one are indistinguishable.
    let (foreign_status, foreign_body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}"),
        Some(&token_b),
        None,
    )
    .await;
    let (absent_status, absent_body) = send(
        &app,
        "GET",
        "/api/projects/00000000-0000-0000-0000-000000000000",
        Some(&token_b),
        None,
    )
    .await;

    assert_eq!(foreign_status, StatusCode::NOT_FOUND);
    assert_eq!(absent_status, StatusCode::NOT_FOUND);
    assert_eq!(foreign_body["error"], absent_body["error"]);

    // Same story for rename and delete.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/projects/{project_id}"),
        Some(&token_b),
        Some(json!({ "name": "stolen" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{project_id}"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner still sees it untouched.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "secret");
}

#[tokio::test]
async fn test_projects_listed_newest_first() {
    let app = spawn_app().await;

    signup(&app, "a@x.com", "password123").await;
    let token = login(&app, "a@x.com", "password123").await;

    for name in ["first", "second", "third"] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/projects",
            Some(&token),
            Some(json!({ "name": name })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, "GET", "/api/projects", Some(&token), None).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["third", "second", "first"]);
}
