mod common;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use events_api::store::EventStore;

use common::{
    app, app_with, body_json, router_with_store, seed_event, send, FakeAuthorizer, VanishingStore,
};

fn timestamp(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

#[tokio::test]
async fn test_create_event_returns_normalized_event() {
    let app = app();
    let response = send(
        &app.router,
        "POST",
        "/events",
        Some(r#"{"title":"  Event spec ","date":"2026-01-27","location":" Lyon ","description":"Desc"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Event spec");
    assert_eq!(json["date"], "2026-01-27");
    assert_eq!(json["location"], "Lyon");
    assert_eq!(json["description"], "Desc");
    assert!(json["imageKey"].is_null());
    assert!(Uuid::parse_str(json["eventId"].as_str().unwrap()).is_ok());
    assert_eq!(json["createdAt"], json["updatedAt"]);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_create_rejects_empty_title() {
    let app = app();
    let response = send(&app.router, "POST", "/events", Some(r#"{"title":"","date":"2026-01-27"}"#)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "title cannot be empty");
    assert_eq!(json["error"]["details"]["field"], "title");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_create_rejects_non_iso_date() {
    let app = app();
    let response = send(&app.router, "POST", "/events", Some(r#"{"title":"x","date":"27/01/2026"}"#)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "date must be valid ISO 8601");
}

#[tokio::test]
async fn test_create_rejects_overlong_title_with_limit() {
    let app = app();
    let body = json!({ "title": "a".repeat(201), "date": "2026-01-27" }).to_string();
    let response = send(&app.router, "POST", "/events", Some(&body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "title must be at most 200 characters");
    assert_eq!(json["error"]["details"]["maxLength"], 200);
}

#[tokio::test]
async fn test_create_accepts_title_at_limit() {
    let app = app();
    let body = json!({ "title": "a".repeat(200), "date": "2026-01-27T10:00:00Z" }).to_string();
    let response = send(&app.router, "POST", "/events", Some(&body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_ignores_client_supplied_id() {
    let app = app();
    let supplied = Uuid::new_v4().to_string();
    let body = json!({ "eventId": supplied, "title": "x", "date": "2026-01-27" }).to_string();
    let response = send(&app.router, "POST", "/events", Some(&body)).await;

    let json = body_json(response).await;
    assert_ne!(json["eventId"], supplied);
}

#[tokio::test]
async fn test_malformed_json_is_rejected_with_preview() {
    let app = app();
    let response = send(&app.router, "POST", "/events", Some(r#"{"title": "x", "#)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "MALFORMED_JSON");
    assert_eq!(json["error"]["details"]["preview"], r#"{"title": "x", "#);
}

#[tokio::test]
async fn test_non_object_body_is_rejected() {
    let app = app();
    let response = send(&app.router, "POST", "/events", Some("[1, 2]")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "request body must be a JSON object");
}

#[tokio::test]
async fn test_get_event() {
    let app = app();
    let id = seed_event(&app.router, "Concert").await;

    let response = send(&app.router, "GET", &format!("/events/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Concert");
}

#[tokio::test]
async fn test_get_unknown_event_echoes_id() {
    let app = app();
    let id = Uuid::new_v4().to_string();

    let response = send(&app.router, "GET", &format!("/events/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["details"]["eventId"], id);

    let response = send(&app.router, "GET", "/events/not-a-uuid", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["details"]["eventId"], "not-a-uuid");
}

#[tokio::test]
async fn test_list_events_respects_page_size() {
    let app = app_with(FakeAuthorizer::default(), 2);
    for title in ["a", "b", "c"] {
        seed_event(&app.router, title).await;
    }

    let response = send(&app.router, "GET", "/events", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_event_fields() {
    let app = app();
    let id = seed_event(&app.router, "Before").await;
    let created = body_json(send(&app.router, "GET", &format!("/events/{}", id), None).await).await;

    let response = send(
        &app.router,
        "PUT",
        &format!("/events/{}", id),
        Some(r#"{"title":" After ","location":"Paris","description":"Long night"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "After");
    assert_eq!(json["date"], "2026-01-27");
    assert_eq!(json["location"], "Paris");
    assert_eq!(json["createdAt"], created["createdAt"]);
    assert!(timestamp(&json["updatedAt"]) >= timestamp(&created["updatedAt"]));
}

#[tokio::test]
async fn test_update_null_clears_optional_field() {
    let app = app();
    let id = seed_event(&app.router, "x").await;
    send(&app.router, "PUT", &format!("/events/{}", id), Some(r#"{"location":"Lyon"}"#)).await;

    let response = send(&app.router, "PUT", &format!("/events/{}", id), Some(r#"{"location":null}"#)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["location"].is_null());
}

#[tokio::test]
async fn test_update_rejects_null_title() {
    let app = app();
    let id = seed_event(&app.router, "Keep me").await;

    let response = send(&app.router, "PUT", &format!("/events/{}", id), Some(r#"{"title":null}"#)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["message"], "title cannot be null");

    let current = body_json(send(&app.router, "GET", &format!("/events/{}", id), None).await).await;
    assert_eq!(current["title"], "Keep me");
}

#[tokio::test]
async fn test_update_invalid_field_applies_nothing() {
    let app = app();
    let id = seed_event(&app.router, "Original").await;

    let response = send(
        &app.router,
        "PUT",
        &format!("/events/{}", id),
        Some(r#"{"title":"Changed","description":42}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["message"], "description must be a string");

    let current = body_json(send(&app.router, "GET", &format!("/events/{}", id), None).await).await;
    assert_eq!(current["title"], "Original");
}

#[tokio::test]
async fn test_update_unknown_event_is_not_found() {
    let app = app();
    let id = Uuid::new_v4();

    let response = send(&app.router, "PUT", &format!("/events/{}", id), Some(r#"{"title":"x"}"#)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = app();
    let id = seed_event(&app.router, "Gone soon").await;

    let response = send(&app.router, "DELETE", &format!("/events/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app.router, "GET", &format!("/events/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app.router, "DELETE", &format!("/events/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app.router, "DELETE", "/events/not-a-uuid", None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_upload_url_records_image_key() {
    let app = app();
    let id = seed_event(&app.router, "With image").await;

    let response = send(
        &app.router,
        "POST",
        &format!("/events/{}/upload-url", id),
        Some(r#"{"contentType":"image/png"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let key = json["imageKey"].as_str().unwrap().to_string();
    assert!(key.starts_with(&format!("events/{}/", id)));
    assert!(key.ends_with(".png"));
    assert_eq!(json["expiresIn"], 300);
    assert!(json["uploadUrl"].as_str().unwrap().contains(&key));

    let calls = app.uploads.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "image/png");
    assert_eq!(calls[0].2.as_secs(), 300);

    let event = body_json(send(&app.router, "GET", &format!("/events/{}", id), None).await).await;
    assert_eq!(event["imageKey"], key);
}

#[tokio::test]
async fn test_upload_url_defaults_to_jpeg_with_empty_body() {
    let app = app();
    let id = seed_event(&app.router, "x").await;

    let response = send(&app.router, "POST", &format!("/events/{}/upload-url", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["imageKey"].as_str().unwrap().ends_with(".jpg"));
}

#[tokio::test]
async fn test_upload_url_null_content_type_defaults_to_jpeg() {
    let app = app();
    let id = seed_event(&app.router, "x").await;

    let response = send(
        &app.router,
        "POST",
        &format!("/events/{}/upload-url", id),
        Some(r#"{"contentType":null}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["imageKey"].as_str().unwrap().ends_with(".jpg"));
    let calls = app.uploads.calls.lock().unwrap().clone();
    assert_eq!(calls[0].1, "image/jpeg");
}

#[tokio::test]
async fn test_upload_url_when_event_is_deleted_before_key_is_recorded() {
    let store = VanishingStore::default();
    let uploads = Arc::new(FakeAuthorizer::default());
    let router = router_with_store(Arc::new(store.clone()), uploads.clone());
    let id = seed_event(&router, "Short-lived").await;

    let response = send(&router, "POST", &format!("/events/{}/upload-url", id), None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["details"]["eventId"], id);
    assert!(store.inner.is_empty().await);
    assert!(store.inner.list(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_url_rejects_unlisted_content_type() {
    let app = app();
    let id = seed_event(&app.router, "x").await;

    let response = send(
        &app.router,
        "POST",
        &format!("/events/{}/upload-url", id),
        Some(r#"{"contentType":"application/pdf"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["details"]["field"], "contentType");
    assert!(app.uploads.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_url_for_unknown_event() {
    let app = app();
    let id = Uuid::new_v4();

    let response = send(&app.router, "POST", &format!("/events/{}/upload-url", id), Some("{}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.uploads.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_authorizer_failure_is_generic() {
    let app = app_with(
        FakeAuthorizer {
            fail: true,
            ..Default::default()
        },
        50,
    );
    let id = seed_event(&app.router, "x").await;

    let response = send(&app.router, "POST", &format!("/events/{}/upload-url", id), None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "EXTERNAL_SERVICE_ERROR");
    assert!(!json["error"]["message"].as_str().unwrap().contains("signer"));

    let event = body_json(send(&app.router, "GET", &format!("/events/{}", id), None).await).await;
    assert!(event["imageKey"].is_null());
}

#[tokio::test]
async fn test_every_response_allows_any_origin() {
    let app = app();
    for (method, uri) in [("GET", "/events"), ("GET", "/events/missing"), ("GET", "/health")] {
        let response = send(&app.router, method, uri, None).await;
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*",
            "{method} {uri}"
        );
    }

    let response = send(&app.router, "POST", "/events", Some("{oops")).await;
    assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
}
