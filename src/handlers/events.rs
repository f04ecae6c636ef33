//! Event CRUD and upload authorization handlers.
//!
//! Every handler validates the whole payload before touching the store, so a
//! rejected request never leaves a partial write behind.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::models::{Event, UploadAuthorization};
use crate::state::AppState;
use crate::uploads::{image_key, UPLOAD_URL_TTL};
use crate::utils::body::parse_json_object;
use crate::utils::error::AppError;
use crate::utils::response::{created, no_content, ok};
use crate::validation::{validate_content_type, validate_event_patch, validate_new_event};

/// Ids that are not UUIDs cannot name a stored event.
fn parse_event_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(raw.to_string()))
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.store.list(state.page_size).await?;
    Ok(ok(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = parse_json_object(&body)?;
    let new_event = validate_new_event(&payload)?;

    let event = Event::from_new(new_event, Utc::now());
    let id = event.event_id.to_string();
    state
        .store
        .create(&event)
        .await
        .map_err(|e| AppError::from_store(e, &id))?;

    info!(event_id = %event.event_id, "Event created");
    Ok(created(event))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event_id = parse_event_id(&id)?;
    let event = state
        .store
        .get(event_id)
        .await
        .map_err(|e| AppError::from_store(e, &id))?;
    Ok(ok(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = parse_json_object(&body)?;
    let patch = validate_event_patch(&payload)?;
    let event_id = parse_event_id(&id)?;

    let event = state
        .store
        .update(event_id, &patch, Utc::now())
        .await
        .map_err(|e| AppError::from_store(e, &id))?;

    info!(event_id = %event_id, "Event updated");
    Ok(ok(event))
}

/// Deleting an id that does not exist still succeeds.
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Ok(event_id) = Uuid::parse_str(&id) else {
        return Ok(no_content());
    };

    state
        .store
        .delete(event_id)
        .await
        .map_err(|e| AppError::from_store(e, &id))?;

    info!(event_id = %event_id, "Event deleted");
    Ok(no_content())
}

pub async fn create_upload_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload = parse_json_object(&body)?;
    let (content_type, extension) = validate_content_type(&payload)?;
    let event_id = parse_event_id(&id)?;

    state
        .store
        .get(event_id)
        .await
        .map_err(|e| AppError::from_store(e, &id))?;

    let key = image_key(event_id, extension);
    let upload_url = state
        .uploads
        .authorize_put(&key, content_type, UPLOAD_URL_TTL)
        .await?;

    state
        .store
        .set_image_key(event_id, &key, Utc::now())
        .await
        .map_err(|e| AppError::from_store(e, &id))?;

    info!(event_id = %event_id, image_key = %key, content_type, "Upload URL issued");
    Ok(ok(UploadAuthorization {
        upload_url,
        image_key: key,
        expires_in: UPLOAD_URL_TTL.as_secs(),
    }))
}
