use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventStore, StoreError, StoreResult};
use crate::models::{Event, EventPatch};

/// Process-local store, used in tests and when no database is configured.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn list(&self, limit: usize) -> StoreResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut all: Vec<Event> = events.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit);
        Ok(all)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Event> {
        self.events
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, event: &Event) -> StoreResult<()> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.event_id) {
            return Err(StoreError::Conflict);
        }
        events.insert(event.event_id, event.clone());
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &EventPatch, now: DateTime<Utc>) -> StoreResult<Event> {
        let mut events = self.events.write().await;
        let event = events.get_mut(&id).ok_or(StoreError::NotFound)?;
        event.apply(patch, now);
        Ok(event.clone())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.events.write().await.remove(&id);
        Ok(())
    }

    async fn set_image_key(&self, id: Uuid, key: &str, now: DateTime<Utc>) -> StoreResult<Event> {
        let mut events = self.events.write().await;
        let event = events.get_mut(&id).ok_or(StoreError::NotFound)?;
        event.set_image_key(key.to_string(), now);
        Ok(event.clone())
    }
}
