mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{DEFAULT_API_KEY, spawn_app};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = key {
        builder = builder.header("X-Api-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, key: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref());
    if let Some(key) = key {
        builder = builder.header("X-Api-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_auth_endpoints() {
    let (app, _) = spawn_app().await;

    let (status, _) = send(&app, get("/api/system/status", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/system/status", Some("wrong-key"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get("/api/system/status", Some(DEFAULT_API_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["next_membership_id"], "KWSKW05000");

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("Authorization", format!("Bearer {DEFAULT_API_KEY}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["account"]["username"], "admin");
    assert!(body["data"]["account"]["id"].is_string());
    assert!(body["data"]["member"].is_null());
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = spawn_app().await;
    let (status, body) = send(&app, get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_login_with_seeded_admin() {
    let (app, _) = spawn_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "admin", "password": "password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["api_key"], DEFAULT_API_KEY);
    assert_eq!(body["data"]["account"]["must_change_password"], true);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "admin", "password": "nope" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_then_approve_over_http() {
    let (app, _) = spawn_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "civil_id": "12345",
                "password": "member password",
                "first_name": "Fatima",
                "last_name": "Al-Sabah",
                "profile": { "zone": "Salmiya" }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    let member_id = body["data"]["id"].as_str().unwrap().to_string();

    // Pending accounts cannot log in
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "12345", "password": "member password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get("/api/members/pending", Some(DEFAULT_API_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/members/{member_id}/approval"),
            Some(DEFAULT_API_KEY),
            &json!({ "status": "approved" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let membership_id = body["data"]["allocated"].as_str().unwrap().to_string();
    assert!(membership_id.starts_with("KWSKW"));
    assert_eq!(membership_id.len(), "KWSKW".len() + 5);
    assert_eq!(body["data"]["member"]["membership_id"], membership_id.as_str());

    // The allocated identifier is now the username
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": membership_id, "password": "member password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let member_key = body["data"]["api_key"].as_str().unwrap().to_string();

    // Members cannot reach staff endpoints
    let (status, _) = send(&app, get("/api/members", Some(&member_key))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        get(&format!("/api/members/lookup/{membership_id}"), Some(DEFAULT_API_KEY)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], member_id.as_str());

    let (status, body) = send(
        &app,
        get(&format!("/api/members/{member_id}/history"), Some(DEFAULT_API_KEY)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["action"], "APPROVED");
    assert_eq!(body["data"][1]["action"], "CREATED");
}

#[tokio::test]
async fn test_invalid_input_is_bad_request() {
    let (app, _) = spawn_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({
                "civil_id": "99999",
                "password": "short",
                "first_name": "A",
                "last_name": "B"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, get("/api/members/abc", Some(DEFAULT_API_KEY))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get("/api/members/4242", Some(DEFAULT_API_KEY))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_collection_total_and_bulk_import() {
    let (app, _) = spawn_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/cash/boxes",
            Some(DEFAULT_API_KEY),
            &json!({ "number": "S-1", "in_use": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let box_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/cash/collections",
            Some(DEFAULT_API_KEY),
            &json!({
                "box_id": box_id,
                "date": "2024-05-01",
                "note_20": 1,
                "note_10": 1,
                "coin_100": 3
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["total"], "30.300");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/cash/collections/import",
            Some(DEFAULT_API_KEY),
            &json!([
                { "box_number": "S-1", "date": "2024-06-01", "note_5": 2 },
                { "box_number": "NOPE", "date": "2024-06-01", "note_5": 1 },
                { "box_number": "S-1", "date": "June first" },
                { "box_number": "S-1", "date": "2024-06-02", "coin_5": -1 }
            ]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["imported"], 1);
    assert_eq!(body["data"]["failed"], 3);
    let rows: Vec<u64> = body["data"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["row"].as_u64().unwrap())
        .collect();
    assert_eq!(rows, vec![2, 3, 4]);

    let (status, body) = send(
        &app,
        get(&format!("/api/cash/collections?box_id={box_id}"), Some(DEFAULT_API_KEY)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/cash/boxes/{box_id}"))
            .header("X-Api-Key", DEFAULT_API_KEY)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_forgot_password_does_not_reveal_accounts() {
    let (app, _) = spawn_app().await;

    let (known, known_body) = send(
        &app,
        json_request("POST", "/api/auth/forgot-password", None, &json!({ "username": "admin" })),
    )
    .await;
    let (unknown, unknown_body) = send(
        &app,
        json_request("POST", "/api/auth/forgot-password", None, &json!({ "username": "ghost" })),
    )
    .await;

    assert_eq!(known, StatusCode::OK);
    assert_eq!(unknown, StatusCode::OK);
    assert_eq!(known_body, unknown_body);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            &json!({ "token": "not-a-token", "new_password": "long enough" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
