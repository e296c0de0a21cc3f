//! Event repository abstraction and the serialization boundary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::{Event, EventKind, EventMetadata};

/// Stored representation of a domain event.
///
/// This is the wire/storage form: the payload is opaque JSON and the
/// `event_type` tag is the stable discriminator used to decode it.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Event type name for deserialization routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Position of this event in the aggregate stream.
    pub event_version: i64,
    /// Timestamp of event creation.
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

/// Repository trait for loading and appending domain events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Load all events for a given aggregate, ordered by event version.
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError>;

    /// Append new events to an aggregate stream with optimistic concurrency.
    /// `expected_version` is the aggregate's version before this batch was
    /// recorded; implementations must reject the write when the stored
    /// stream has advanced past it.
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;
}

impl<K: EventKind> Event<K> {
    /// Converts the event into its storage representation.
    #[must_use]
    pub fn to_stored(&self) -> StoredEvent {
        let meta = self.metadata();
        StoredEvent {
            event_id: meta.event_id,
            aggregate_id: meta.aggregate_id,
            event_type: meta.event_type.clone(),
            payload: self.to_payload(),
            event_version: meta.event_version,
            occurred_at: meta.occurred_at,
        }
    }

    /// Decodes a stored event back into a typed envelope.
    ///
    /// The `event_type` tag is the decode discriminator: a payload that
    /// does not decode, or that decodes to a variant whose tag differs
    /// from the stored one, is corrupted or foreign data.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownEventType`] when the payload cannot
    /// be decoded for the recorded `event_type`.
    pub fn from_stored(stored: &StoredEvent) -> Result<Self, DomainError> {
        let kind: K = serde_json::from_value(stored.payload.clone()).map_err(|_| {
            DomainError::UnknownEventType {
                aggregate_id: stored.aggregate_id,
                event_type: stored.event_type.clone(),
            }
        })?;
        if kind.event_type() != stored.event_type {
            return Err(DomainError::UnknownEventType {
                aggregate_id: stored.aggregate_id,
                event_type: stored.event_type.clone(),
            });
        }
        Ok(Event::new(
            EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                aggregate_id: stored.aggregate_id,
                event_version: stored.event_version,
                occurred_at: stored.occurred_at,
            },
            kind,
        ))
    }
}
