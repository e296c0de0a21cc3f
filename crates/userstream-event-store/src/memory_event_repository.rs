//! In-memory implementation of the `EventRepository` trait.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use userstream_core::error::DomainError;
use userstream_core::repository::{EventRepository, StoredEvent};

/// In-memory event repository keyed by aggregate id.
///
/// Each stream is an append-only, version-ordered vector. Appends enforce
/// the expected-version precondition: a write whose `expected_version`
/// lags the stored stream fails with `ConcurrencyConflict` and the caller
/// must reload, reconcile, and retry.
#[derive(Debug, Default)]
pub struct MemoryEventRepository {
    streams: Mutex<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl MemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self
            .streams
            .lock()
            .map_err(|_| DomainError::Infrastructure("event store lock poisoned".into()))?;
        let events = streams.get(&aggregate_id).cloned().unwrap_or_default();
        debug!(aggregate_id = %aggregate_id, events = events.len(), "loaded event stream");
        Ok(events)
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut streams = self
            .streams
            .lock()
            .map_err(|_| DomainError::Infrastructure("event store lock poisoned".into()))?;
        let stream = streams.entry(aggregate_id).or_default();

        let actual = i64::try_from(stream.len())
            .map_err(|_| DomainError::Infrastructure("event stream length overflow".into()))?;
        if expected_version != actual {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        // Validate the whole batch before touching the stream: appends are
        // all-or-nothing.
        for (offset, event) in events.iter().enumerate() {
            if event.aggregate_id != aggregate_id {
                return Err(DomainError::IdentityMismatch {
                    aggregate_id,
                    event_aggregate_id: event.aggregate_id,
                });
            }
            let slot = expected_version + 1 + i64::try_from(offset).unwrap_or(i64::MAX);
            if event.event_version != slot {
                return Err(DomainError::CorruptHistory {
                    aggregate_id,
                    expected_version: slot,
                    actual_version: event.event_version,
                });
            }
        }

        stream.extend_from_slice(events);
        debug!(
            aggregate_id = %aggregate_id,
            expected_version,
            appended = events.len(),
            "appended events"
        );
        Ok(())
    }
}
