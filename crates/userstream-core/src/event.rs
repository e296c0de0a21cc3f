//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name for deserialization routing. Stable once shipped.
    pub event_type: String,
    /// Aggregate/stream this event belongs to.
    pub aggregate_id: Uuid,
    /// 1-based position of this event in the aggregate stream.
    /// Strictly increasing, no gaps. Assigned by the aggregate at append time.
    pub event_version: i64,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Trait implemented by each bounded context's event payload enum.
pub trait EventKind:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync
{
    /// Returns the event type tag for this payload variant.
    ///
    /// Tags must be stable across versions of the software: they route
    /// replay dispatch and payload deserialization from storage.
    fn event_type(&self) -> &'static str;
}

/// Immutable envelope pairing an event payload with its stream metadata.
///
/// Envelopes are constructed in exactly two places: by the aggregate engine
/// when a domain operation records a new event, and by [`Event::from_stored`]
/// when replaying persisted history. They are read-only thereafter.
#[derive(Debug, Clone)]
pub struct Event<K: EventKind> {
    metadata: EventMetadata,
    kind: K,
}

impl<K: EventKind> Event<K> {
    pub(crate) fn new(metadata: EventMetadata, kind: K) -> Self {
        Self { metadata, kind }
    }

    /// Returns the identity of the owning aggregate.
    #[must_use]
    pub fn aggregate_id(&self) -> Uuid {
        self.metadata.aggregate_id
    }

    /// Returns the stable event type tag recorded in the envelope.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.metadata.event_type
    }

    /// Returns the position of this event in the aggregate stream.
    #[must_use]
    pub fn event_version(&self) -> i64 {
        self.metadata.event_version
    }

    /// Returns the timestamp of event creation.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata.occurred_at
    }

    /// Returns the event metadata.
    #[must_use]
    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    /// Returns the event payload.
    #[must_use]
    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Serializes the event payload to JSON.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("event payload serialization is infallible")
    }
}
