use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{EventStore, StoreError, StoreResult};
use crate::models::{storage_precision, Event, EventPatch, FieldUpdate};

const EVENT_COLUMNS: &str =
    "event_id, title, date, location, description, image_key, created_at, updated_at";

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

/// Splits a nullable field update into (should write, new value) binds.
fn nullable_binds(update: &FieldUpdate<String>) -> (bool, Option<&str>) {
    match update {
        FieldUpdate::Unchanged => (false, None),
        FieldUpdate::Clear => (true, None),
        FieldUpdate::Set(value) => (true, Some(value.as_str())),
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn list(&self, limit: usize) -> StoreResult<Vec<Event>> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC LIMIT $1");
        let events = sqlx::query_as::<_, Event>(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Event> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, event: &Event) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO events (event_id, title, date, location, description, image_key, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (event_id) DO NOTHING",
        )
        .bind(event.event_id)
        .bind(&event.title)
        .bind(&event.date)
        .bind(&event.location)
        .bind(&event.description)
        .bind(&event.image_key)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &EventPatch, now: DateTime<Utc>) -> StoreResult<Event> {
        let (set_location, location) = nullable_binds(&patch.location);
        let (set_description, description) = nullable_binds(&patch.description);

        let query = format!(
            "UPDATE events SET
                title = COALESCE($2, title),
                date = COALESCE($3, date),
                location = CASE WHEN $4 THEN $5 ELSE location END,
                description = CASE WHEN $6 THEN $7 ELSE description END,
                updated_at = GREATEST(updated_at, $8)
             WHERE event_id = $1
             RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.date.as_deref())
            .bind(set_location)
            .bind(location)
            .bind(set_description)
            .bind(description)
            .bind(storage_precision(now))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::debug!(event_id = %id, rows = result.rows_affected(), "Delete executed");
        Ok(())
    }

    async fn set_image_key(&self, id: Uuid, key: &str, now: DateTime<Utc>) -> StoreResult<Event> {
        let query = format!(
            "UPDATE events SET image_key = $2, updated_at = GREATEST(updated_at, $3)
             WHERE event_id = $1
             RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(key)
            .bind(storage_precision(now))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}
