//! Integration tests for the area CRUD endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_error_code, auth_get, body_json, get, send, USER_UID};
use serde_json::json;

fn triangle_geometry() -> serde_json::Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[35.0, 139.0], [35.1, 139.0], [35.0, 139.1]]],
    })
}

#[tokio::test]
async fn create_and_list_areas() {
    let (app, _store) = common::build_test_app();

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/areas",
        Some(USER_UID),
        Some(json!({
            "geometry": triangle_geometry(),
            "status": "planned",
            "memo": "Block 3 north side",
            "plannedCount": 120,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["status"], "planned");
    assert_eq!(created["data"]["memo"], "Block 3 north side");
    assert_eq!(created["data"]["plannedCount"], 120);
    assert_eq!(created["data"]["updatedBy"]["uid"], USER_UID);
    // Timestamps use the portable wire shape.
    assert!(created["data"]["createdAt"]["seconds"].is_i64());

    let response = auth_get(app, "/api/v1/areas").await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let data = listed["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], id.as_str());
}

#[tokio::test]
async fn list_requires_identity() {
    let (app, _store) = common::build_test_app();

    let response = get(app, "/api/v1/areas").await;
    assert_error_code(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn create_requires_identity() {
    let (app, _store) = common::build_test_app();

    let response = send(
        app,
        Method::POST,
        "/api/v1/areas",
        None,
        Some(json!({ "geometry": triangle_geometry() })),
    )
    .await;
    assert_error_code(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn degenerate_geometry_is_rejected() {
    let (app, store) = common::build_test_app();

    let response = send(
        app,
        Method::POST,
        "/api/v1/areas",
        Some(USER_UID),
        Some(json!({
            "geometry": { "type": "Polygon", "coordinates": [[[35.0, 139.0], [35.1, 139.0]]] },
        })),
    )
    .await;
    assert_error_code(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
    assert_eq!(store.commit_count(), 0);
}

#[tokio::test]
async fn update_merges_only_provided_fields() {
    let (app, _store) = common::build_test_app();

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/areas",
        Some(USER_UID),
        Some(json!({
            "geometry": triangle_geometry(),
            "memo": "original memo",
            "plannedCount": 50,
        })),
    )
    .await;
    let id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(
        app.clone(),
        Method::PUT,
        &format!("/api/v1/areas/{id}"),
        Some("uid-2"),
        Some(json!({ "status": "completed", "actualCount": 48 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["data"]["status"], "completed");
    assert_eq!(updated["data"]["actualCount"], 48);
    // Untouched fields keep their stored values.
    assert_eq!(updated["data"]["memo"], "original memo");
    assert_eq!(updated["data"]["plannedCount"], 50);
    assert_eq!(updated["data"]["updatedBy"]["uid"], "uid-2");
}

#[tokio::test]
async fn missing_area_returns_404() {
    let (app, _store) = common::build_test_app();

    let response = auth_get(app.clone(), "/api/v1/areas/nope").await;
    assert_error_code(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let response = send(
        app,
        Method::PUT,
        "/api/v1/areas/nope",
        Some(USER_UID),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_error_code(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[tokio::test]
async fn delete_area_then_404() {
    let (app, _store) = common::build_test_app();

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/areas",
        Some(USER_UID),
        Some(json!({ "geometry": triangle_geometry() })),
    )
    .await;
    let id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let uri = format!("/api/v1/areas/{id}");
    let response = send(app.clone(), Method::DELETE, &uri, Some(USER_UID), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(app, Method::DELETE, &uri, Some(USER_UID), None).await;
    assert_error_code(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}
