//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Malformed input to an event or aggregate constructor.
    #[error("validation error: {0}")]
    Validation(String),

    /// An event was applied to an aggregate it does not belong to.
    #[error("event for aggregate {event_aggregate_id} applied to aggregate {aggregate_id}")]
    IdentityMismatch {
        /// The aggregate the event was applied to.
        aggregate_id: Uuid,
        /// The aggregate the event actually belongs to.
        event_aggregate_id: Uuid,
    },

    /// Replay encountered an event type the aggregate cannot project.
    #[error("aggregate {aggregate_id} cannot project event type {event_type:?}")]
    UnknownEventType {
        /// The aggregate that was asked to project the event.
        aggregate_id: Uuid,
        /// The unrecognized event type tag.
        event_type: String,
    },

    /// Reconstruction was given a non-contiguous or misordered version sequence.
    #[error(
        "corrupt history for aggregate {aggregate_id}: expected version {expected_version}, found {actual_version}"
    )]
    CorruptHistory {
        /// The aggregate being reconstructed.
        aggregate_id: Uuid,
        /// The version the stream required next.
        expected_version: i64,
        /// The version actually encountered.
        actual_version: i64,
    },

    /// Optimistic concurrency conflict, raised by event store implementations.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
