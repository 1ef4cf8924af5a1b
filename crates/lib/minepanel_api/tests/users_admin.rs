//! User administration and audit retrieval.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, request};
use serde_json::{Value, json};

fn details(record: &minepanel_core::models::audit::AuditRecord) -> Value {
    serde_json::from_str(record.details_json.as_deref().expect("details")).expect("details JSON")
}

#[tokio::test]
async fn list_users_is_audited() {
    let app = TestApp::spawn().await;
    let token = app.token(&app.admin);

    let (status, body) = app.get("/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().expect("array");
    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|u| u["createdAt"].is_string()));
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));

    assert_eq!(app.audit_actions().await, vec!["LIST_USERS"]);
}

#[tokio::test]
async fn create_then_conflict() {
    let app = TestApp::spawn().await;
    let token = app.token(&app.admin);
    let new_user = json!({"username": "builder_1", "password": "secret1", "role": "MOD"});

    let (status, body) = app.post("/users", Some(&token), new_user.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    assert_eq!(body["username"], "builder_1");
    assert_eq!(body["role"], "MOD");

    let records = app.audit_records().await;
    assert_eq!(records[0].action, "CREATE_USER");
    assert_eq!(records[0].target.as_deref(), Some("builder_1"));
    assert_eq!(details(&records[0]), json!({"role": "MOD"}));

    let (status, body) = app.post("/users", Some(&token), new_user).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already exists");
}

#[tokio::test]
async fn invalid_create_is_rejected_without_side_effects() {
    let app = TestApp::spawn().await;
    let token = app.token(&app.admin);

    for body in [
        json!({"username": "ab", "password": "secret1", "role": "MOD"}),
        json!({"username": "has space", "password": "secret1", "role": "MOD"}),
        json!({"username": "builder", "password": "12345", "role": "MOD"}),
        json!({"username": "builder", "password": "secret1", "role": "OWNER"}),
    ] {
        let (status, resp) = app.post("/users", Some(&token), body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(resp["error"], "validation_error");
    }

    assert!(app.audit_actions().await.is_empty());
}

#[tokio::test]
async fn update_role_records_changed_fields() {
    let app = TestApp::spawn().await;
    let token = app.token(&app.admin);

    let (status, body) = app
        .send(request(
            Method::PATCH,
            &format!("/users/{}", app.viewer.id),
            Some(&token),
            Some(json!({"role": "MOD"})),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["role"], "MOD");

    let records = app.audit_records().await;
    assert_eq!(records[0].action, "UPDATE_USER");
    assert_eq!(records[0].target.as_deref(), Some("viewer"));
    assert_eq!(details(&records[0]), json!({"fields": ["role"]}));
}

#[tokio::test]
async fn update_edge_cases() {
    let app = TestApp::spawn().await;
    let token = app.token(&app.admin);

    let (status, body) = app
        .send(request(
            Method::PATCH,
            "/users/9999",
            Some(&token),
            Some(json!({"role": "MOD"})),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, body) = app
        .send(request(
            Method::PATCH,
            "/users/abc",
            Some(&token),
            Some(json!({"role": "MOD"})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid user ID");

    let (status, body) = app
        .send(request(
            Method::PATCH,
            &format!("/users/{}", app.viewer.id),
            Some(&token),
            Some(json!({})),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No fields to update");
}

#[tokio::test]
async fn admin_cannot_delete_self() {
    let app = TestApp::spawn().await;
    let token = app.token(&app.admin);

    let (status, body) = app
        .send(request(
            Method::DELETE,
            &format!("/users/{}", app.admin.id),
            Some(&token),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete yourself");

    let (status, users) = app.get("/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().expect("array").len(), 3);
}

#[tokio::test]
async fn delete_user_is_audited() {
    let app = TestApp::spawn().await;
    let token = app.token(&app.admin);
    let uri = format!("/users/{}", app.moderator.id);

    let (status, body) = app
        .send(request(Method::DELETE, &uri, Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], "User moderator deleted");

    let records = app.audit_records().await;
    assert_eq!(records[0].action, "DELETE_USER");
    assert_eq!(records[0].target.as_deref(), Some("moderator"));

    let (status, _) = app
        .send(request(Method::DELETE, &uri, Some(&token), None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audit_query_is_parsed_leniently() {
    let app = TestApp::spawn().await;
    let token = app.token(&app.admin);

    let (status, body) = app.get("/audit?page=abc&limit=1000", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["pagination"]["totalPages"], 0);

    app.get("/users", Some(&token)).await;
    app.get("/users", Some(&token)).await;

    let (_, body) = app.get("/audit?page=2&limit=1", Some(&token)).await;
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["data"].as_array().expect("array").len(), 1);
    assert_eq!(body["data"][0]["action"], "LIST_USERS");
}
