//! Persistence for events.
//!
//! Handlers only see the [`EventStore`] trait; the concrete backend is picked
//! at startup and injected through `AppState`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Event, EventPatch};

pub use memory::InMemoryEventStore;
pub use postgres::PgEventStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event not found")]
    NotFound,

    #[error("event already exists")]
    Conflict,

    #[error("store failure: {0}")]
    Failure(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Failure(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed storage for events. Single-item writes are atomic per key; there
/// are no cross-item transactions.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Returns at most `limit` events, newest first.
    async fn list(&self, limit: usize) -> StoreResult<Vec<Event>>;

    async fn get(&self, id: Uuid) -> StoreResult<Event>;

    /// Inserts a new event. Fails with [`StoreError::Conflict`] if the id is
    /// already taken.
    async fn create(&self, event: &Event) -> StoreResult<()>;

    /// Applies `patch` to an existing event and returns the result. Fails
    /// with [`StoreError::NotFound`] without side effects if the id is
    /// unknown.
    async fn update(&self, id: Uuid, patch: &EventPatch, now: DateTime<Utc>) -> StoreResult<Event>;

    /// Removes an event. Deleting an unknown id succeeds.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    async fn set_image_key(&self, id: Uuid, key: &str, now: DateTime<Utc>) -> StoreResult<Event>;
}
