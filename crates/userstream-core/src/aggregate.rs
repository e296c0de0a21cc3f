//! Aggregate root engine.
//!
//! The engine is a composed struct rather than a base class: it owns the
//! identity, version counter, uncommitted-event buffer, and a concrete
//! state value. Bounded contexts supply the state and its projection via
//! [`AggregateState`]; every derived-state mutation flows through that
//! single projection, so live operation and replay share one code path.

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::DomainError;
use crate::event::{Event, EventKind, EventMetadata};

/// The event-sourced state of a concrete aggregate.
pub trait AggregateState: Default + Send + Sync {
    /// The event payload type this state folds over.
    type Kind: EventKind;

    /// Projects one event payload onto the state.
    ///
    /// Must be pure and deterministic: the same state and payload always
    /// produce the same new state. Projections never fail — events are
    /// facts that have already happened.
    fn project(&mut self, kind: &Self::Kind);
}

/// Generic aggregate root: identity, version tracking, apply/replay, and
/// the uncommitted-event buffer, shared by every concrete aggregate.
#[derive(Debug)]
pub struct AggregateRoot<S: AggregateState> {
    id: Uuid,
    version: i64,
    state: S,
    uncommitted_events: Vec<Event<S::Kind>>,
}

impl<S: AggregateState> AggregateRoot<S> {
    /// Creates an empty aggregate at version 0 with default state.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            state: S::default(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the aggregate identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the current version (number of events applied).
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Returns the projected state.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Records a new domain event: builds the envelope, projects it,
    /// advances the version, and appends it to the uncommitted buffer.
    ///
    /// The envelope's `event_version` is assigned here, exactly once, as
    /// the current version plus one.
    pub fn record(&mut self, kind: S::Kind, clock: &dyn Clock) {
        let metadata = EventMetadata {
            event_id: Uuid::new_v4(),
            event_type: kind.event_type().to_owned(),
            aggregate_id: self.id,
            event_version: self.version + 1,
            occurred_at: clock.now(),
        };
        let event = Event::new(metadata, kind);
        self.state.project(event.kind());
        self.version += 1;
        self.uncommitted_events.push(event);
    }

    /// Applies a historical event: projects it and advances the version
    /// without touching the uncommitted buffer. This is the replay path.
    ///
    /// # Errors
    ///
    /// - [`DomainError::IdentityMismatch`] if the event belongs to a
    ///   different aggregate.
    /// - [`DomainError::UnknownEventType`] if the envelope's type tag does
    ///   not match its payload (corrupted or foreign input).
    /// - [`DomainError::CorruptHistory`] if the event's version does not
    ///   continue the stream contiguously.
    ///
    /// State is unchanged when any check fails.
    pub fn apply(&mut self, event: &Event<S::Kind>) -> Result<(), DomainError> {
        if event.aggregate_id() != self.id {
            return Err(DomainError::IdentityMismatch {
                aggregate_id: self.id,
                event_aggregate_id: event.aggregate_id(),
            });
        }
        if event.event_type() != event.kind().event_type() {
            return Err(DomainError::UnknownEventType {
                aggregate_id: self.id,
                event_type: event.event_type().to_owned(),
            });
        }
        if event.event_version() != self.version + 1 {
            return Err(DomainError::CorruptHistory {
                aggregate_id: self.id,
                expected_version: self.version + 1,
                actual_version: event.event_version(),
            });
        }
        self.state.project(event.kind());
        self.version += 1;
        Ok(())
    }

    /// Returns the events recorded since the aggregate was loaded or
    /// created, without consuming them.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[Event<S::Kind>] {
        &self.uncommitted_events
    }

    /// Clears the uncommitted buffer after the caller has confirmed
    /// durable storage. Idempotent.
    pub fn mark_events_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    /// Reconstructs an aggregate by replaying an ordered event history.
    ///
    /// The history must start at version 1 and be contiguous. The result's
    /// version equals the last event's version and the uncommitted buffer
    /// is empty. All-or-nothing: no aggregate is produced from a corrupt
    /// history.
    ///
    /// # Errors
    ///
    /// Propagates the first [`AggregateRoot::apply`] failure.
    pub fn reconstruct(id: Uuid, history: &[Event<S::Kind>]) -> Result<Self, DomainError> {
        let mut root = Self::new(id);
        for event in history {
            root.apply(event)?;
        }
        Ok(root)
    }
}
