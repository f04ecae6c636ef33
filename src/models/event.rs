use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An event as persisted and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_id: Uuid,
    pub title: String,
    pub date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated create payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Change requested for a nullable field on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldUpdate<T> {
    #[default]
    Unchanged,
    Clear,
    Set(T),
}

impl<T: Clone> FieldUpdate<T> {
    pub fn apply_to(&self, current: &mut Option<T>) {
        match self {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Clear => *current = None,
            FieldUpdate::Set(value) => *current = Some(value.clone()),
        }
    }
}

/// A validated update payload. `title` and `date` can only be replaced,
/// never cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub location: FieldUpdate<String>,
    pub description: FieldUpdate<String>,
}

/// Truncates to whole microseconds, the resolution of a Postgres
/// `TIMESTAMPTZ`.
pub fn storage_precision(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(6)
}

impl Event {
    pub fn from_new(new: NewEvent, now: DateTime<Utc>) -> Self {
        let now = storage_precision(now);
        Self {
            event_id: Uuid::new_v4(),
            title: new.title,
            date: new.date,
            location: new.location,
            description: new.description,
            image_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `patch` in place. `updated_at` never moves backwards, even if
    /// the caller's clock does.
    pub fn apply(&mut self, patch: &EventPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(date) = &patch.date {
            self.date = date.clone();
        }
        patch.location.apply_to(&mut self.location);
        patch.description.apply_to(&mut self.description);
        self.touch(now);
    }

    pub fn set_image_key(&mut self, key: String, now: DateTime<Utc>) {
        self.image_key = Some(key);
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(storage_precision(now));
    }
}

/// Response body for `POST /events/{id}/upload-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAuthorization {
    pub upload_url: String,
    pub image_key: String,
    pub expires_in: u64,
}
