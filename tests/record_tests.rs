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

async fn send_with_api_key(
    app: &Router,
    uri: &str,
    api_key: &str,
    body: Value,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-Api-Key", api_key)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

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

async fn login_fresh_user(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "email": email,
            "password": "password123",
            "display_name": "Record Tester"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["access_token"].as_str().unwrap().to_string()
}

async fn create_project(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/projects",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn issue_key(app: &Router, token: &str, project_id: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/projects/{project_id}/key"),
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["key"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_log_crud() {
    let app = spawn_app().await;
    let token = login_fresh_user(&app, "logs@x.com").await;
    let project_id = create_project(&app, &token, "demo").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/logs"),
        Some(&token),
        Some(json!({
            "level": "warning",
            "category": "payments",
            "message": "card declined",
            "tags": ["billing", "retry"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["level"], "warning");
    assert_eq!(body["data"]["tags"], json!(["billing", "retry"]));
    let log_id = body["data"]["id"].as_str().unwrap().to_string();

    // Level defaults to info when omitted.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/logs"),
        Some(&token),
        Some(json!({ "message": "plain entry" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["level"], "info");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    // Newest first.
    assert_eq!(items[0]["message"], "plain entry");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{project_id}/logs/{log_id}"),
        Some(&token),
        Some(json!({ "level": "error", "message": "card declined twice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], "error");
    assert_eq!(body["data"]["message"], "card declined twice");
    assert_eq!(body["data"]["category"], "payments");
    assert!(body["data"]["updated_at"].is_string());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{project_id}/logs/{log_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs/{log_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_log_validation() {
    let app = spawn_app().await;
    let token = login_fresh_user(&app, "logval@x.com").await;
    let project_id = create_project(&app, &token, "demo").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/logs"),
        Some(&token),
        Some(json!({ "level": "fatal", "message": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/logs"),
        Some(&token),
        Some(json!({ "level": "info", "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_log_filters() {
    let app = spawn_app().await;
    let token = login_fresh_user(&app, "filters@x.com").await;
    let project_id = create_project(&app, &token, "demo").await;

    for (level, category, tags) in [
        ("error", "db", json!(["outage"])),
        ("info", "db", json!(["routine"])),
        ("error", "http", json!(["outage", "edge"])),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/projects/{project_id}/logs"),
            Some(&token),
            Some(json!({
                "level": level,
                "category": category,
                "message": "entry",
                "tags": tags
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs/level/error"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|l| l["level"] == "error"));

    // Filtering on a level outside the closed set is a validation error.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs/level/fatal"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs/category/db"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs/tag/outage"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs/tag/edge"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_event_lifecycle_and_status_transitions() {
    let app = spawn_app().await;
    let token = login_fresh_user(&app, "events@x.com").await;
    let project_id = create_project(&app, &token, "demo").await;

    // Created without a status.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/events"),
        Some(&token),
        Some(json!({
            "event_type": "order.created",
            "metadata": { "order_id": 991 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["event_status"].is_null());
    assert_eq!(body["data"]["metadata"]["order_id"], 991);
    let event_id = body["data"]["id"].as_str().unwrap().to_string();

    // No status -> "shipped" succeeds.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{project_id}/events/{event_id}"),
        Some(&token),
        Some(json!({ "event_status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["event_status"], "shipped");

    // A malformed status is rejected and the stored value survives.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/projects/{project_id}/events/{event_id}"),
        Some(&token),
        Some(json!({ "event_status": "bad;status" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/events/{event_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["event_status"], "shipped");

    // Any value-to-value move is allowed.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{project_id}/events/{event_id}"),
        Some(&token),
        Some(json!({ "event_status": "returned" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["event_status"], "returned");

    // Clearing is always allowed.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{project_id}/events/{event_id}"),
        Some(&token),
        Some(json!({ "event_status": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["event_status"].is_null());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{project_id}/events/{event_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/events/{event_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_validation() {
    let app = spawn_app().await;
    let token = login_fresh_user(&app, "eventval@x.com").await;
    let project_id = create_project(&app, &token, "demo").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/events"),
        Some(&token),
        Some(json!({ "event_type": "bad;type" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/events"),
        Some(&token),
        Some(json!({ "event_type": "x".repeat(256) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/events"),
        Some(&token),
        Some(json!({ "event_type": "deploy", "metadata": [1, 2, 3] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_machine_ingest_is_bound_to_the_keys_project() {
    let app = spawn_app().await;
    let token = login_fresh_user(&app, "machine@x.com").await;
    let project_a = create_project(&app, &token, "alpha").await;
    let project_b = create_project(&app, &token, "beta").await;
    let key_a = issue_key(&app, &token, &project_a).await;

    let (status, body) = send_with_api_key(
        &app,
        "/api/ingest/logs",
        &key_a,
        json!({ "level": "info", "message": "from the sdk" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["project_id"].as_str().unwrap(), project_a);

    let (status, body) = send_with_api_key(
        &app,
        "/api/ingest/events",
        &key_a,
        json!({ "event_type": "sdk.start", "event_status": "ok" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["project_id"].as_str().unwrap(), project_a);

    // Human listing sees the ingested records in project A only.
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_a}/logs"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_b}/logs"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Ingest without a key, or with a wrong key, is rejected uniformly.
    let (status, _) = send(&app, "POST", "/api/ingest/logs", None, Some(json!({ "message": "x" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_with_api_key(
        &app,
        "/api/ingest/logs",
        "sk_proj_11111111111111111111111111111111",
        json!({ "message": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Machine payloads are validated like human ones.
    let (status, _) = send_with_api_key(
        &app,
        "/api/ingest/logs",
        &key_a,
        json!({ "level": "fatal", "message": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_records_are_invisible_across_owners() {
    let app = spawn_app().await;
    let token_a = login_fresh_user(&app, "owner-rec@x.com").await;
    let token_b = login_fresh_user(&app, "other-rec@x.com").await;
    let project_id = create_project(&app, &token_a, "demo").await;

    let (_, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/logs"),
        Some(&token_a),
        Some(json!({ "message": "private" })),
    )
    .await;
    let log_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/events"),
        Some(&token_a),
        Some(json!({ "event_type": "private.event" })),
    )
    .await;
    let event_id = body["data"]["id"].as_str().unwrap().to_string();

    // A foreign record answers exactly like a missing one.
    let (foreign_status, foreign_body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs/{log_id}"),
        Some(&token_b),
        None,
    )
    .await;
    let (absent_status, absent_body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs/00000000-0000-0000-0000-000000000000"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(foreign_status, StatusCode::NOT_FOUND);
    assert_eq!(absent_status, StatusCode::NOT_FOUND);
    assert_eq!(foreign_body["error"], absent_body["error"]);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/projects/{project_id}/logs/{log_id}"),
        Some(&token_b),
        Some(json!({ "message": "defaced" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{project_id}/events/{event_id}"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_project_removes_records() {
    let app = spawn_app().await;
    let token = login_fresh_user(&app, "cascade-rec@x.com").await;
    let project_id = create_project(&app, &token, "demo").await;

    let (_, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/logs"),
        Some(&token),
        Some(json!({ "message": "doomed" })),
    )
    .await;
    let log_id = body["data"]["id"].as_str().unwrap().to_string();

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
        &format!("/api/projects/{project_id}/logs/{log_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination_limits() {
    let app = spawn_app().await;
    let token = login_fresh_user(&app, "paging@x.com").await;
    let project_id = create_project(&app, &token, "demo").await;

    for i in 0..5 {
        send(
            &app,
            "POST",
            &format!("/api/projects/{project_id}/logs"),
            Some(&token),
            Some(json!({ "message": format!("entry {i}") })),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs?limit=2&offset=1"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["message"], "entry 3");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs?limit=0"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/logs?limit=5000"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
