#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use events_api::models::{Event, EventPatch};
use events_api::routes::create_routes;
use events_api::state::AppState;
use events_api::store::{EventStore, InMemoryEventStore, StoreResult};
use events_api::uploads::{UploadAuthorizer, UploadError};

/// Records every authorization request and hands back a fake URL.
#[derive(Default)]
pub struct FakeAuthorizer {
    pub calls: Mutex<Vec<(String, String, Duration)>>,
    pub fail: bool,
}

#[async_trait]
impl UploadAuthorizer for FakeAuthorizer {
    async fn authorize_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<String, UploadError> {
        if self.fail {
            return Err(UploadError::Signing("signer unavailable".to_string()));
        }
        self.calls
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string(), ttl));
        Ok(format!("https://uploads.test/{}?sig=fake", key))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryEventStore,
    pub uploads: Arc<FakeAuthorizer>,
}

pub fn app() -> TestApp {
    app_with(FakeAuthorizer::default(), 50)
}

pub fn app_with(uploads: FakeAuthorizer, page_size: usize) -> TestApp {
    let store = InMemoryEventStore::new();
    let uploads = Arc::new(uploads);
    let state = AppState::new(Arc::new(store.clone()), uploads.clone(), page_size);
    TestApp {
        router: create_routes(state),
        store,
        uploads,
    }
}

/// Builds a router over any store, for stores that misbehave on purpose.
pub fn router_with_store(store: Arc<dyn EventStore>, uploads: Arc<FakeAuthorizer>) -> Router {
    create_routes(AppState::new(store, uploads, 50))
}

/// Hands out an event on `get` and deletes it straight after, as if a
/// concurrent delete landed between the read and the next write.
#[derive(Clone, Default)]
pub struct VanishingStore {
    pub inner: InMemoryEventStore,
}

#[async_trait]
impl EventStore for VanishingStore {
    async fn list(&self, limit: usize) -> StoreResult<Vec<Event>> {
        self.inner.list(limit).await
    }

    async fn get(&self, id: Uuid) -> StoreResult<Event> {
        let event = self.inner.get(id).await?;
        self.inner.delete(id).await?;
        Ok(event)
    }

    async fn create(&self, event: &Event) -> StoreResult<()> {
        self.inner.create(event).await
    }

    async fn update(&self, id: Uuid, patch: &EventPatch, now: DateTime<Utc>) -> StoreResult<Event> {
        self.inner.update(id, patch, now).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete(id).await
    }

    async fn set_image_key(&self, id: Uuid, key: &str, now: DateTime<Utc>) -> StoreResult<Event> {
        self.inner.set_image_key(id, key, now).await
    }
}

pub async fn send(router: &Router, method: &str, uri: &str, body: Option<&str>) -> Response<Body> {
    let body = match body {
        Some(raw) => Body::from(raw.to_string()),
        None => Body::empty(),
    };
    router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Read response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Creates an event through the API and returns its id.
pub async fn seed_event(router: &Router, title: &str) -> String {
    let body = format!(r#"{{"title":"{}","date":"2026-01-27"}}"#, title);
    let response = send(router, "POST", "/events", Some(&body)).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["eventId"]
        .as_str()
        .unwrap()
        .to_string()
}
