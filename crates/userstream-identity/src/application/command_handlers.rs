//! Command handlers for the Identity context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load aggregate, execute command, persist events.

use tracing::info;
use userstream_core::clock::Clock;
use userstream_core::command::Command;
use userstream_core::error::DomainError;
use userstream_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

use crate::domain::aggregates::User;
use crate::domain::commands::{DeleteUser, RegisterUser, VerifyUserEmail};
use crate::domain::events::UserEvent;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct UserCommandResult {
    /// The aggregate ID affected or created by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted. Empty for a no-op.
    pub stored_events: Vec<StoredEvent>,
}

/// Reconstitutes a `User` from stored events.
///
/// # Errors
///
/// Returns `DomainError::UnknownEventType` if an event cannot be decoded,
/// or a replay error from the aggregate engine.
pub(crate) fn reconstitute(
    user_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<User, DomainError> {
    let mut history = Vec::with_capacity(existing_events.len());
    for stored in existing_events {
        history.push(UserEvent::from_stored(stored)?);
    }
    User::reconstruct(user_id, &history)
}

/// Handles the `RegisterUser` command: creates the aggregate and persists
/// its `user.created` event with an expected version of 0.
///
/// # Errors
///
/// Returns `DomainError::Validation` for malformed input, or a store error
/// (including `ConcurrencyConflict` when the id is already taken).
pub async fn handle_register_user(
    command: &RegisterUser,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<UserCommandResult, DomainError> {
    let mut user = User::register(
        command.user_id,
        &command.username,
        &command.email,
        &command.password,
        clock,
    )?;

    let stored_events: Vec<StoredEvent> = user
        .uncommitted_events()
        .iter()
        .map(UserEvent::to_stored)
        .collect();

    repo.append_events(user.id(), 0, &stored_events).await?;
    user.mark_events_committed();

    info!(
        command = command.command_type(),
        aggregate_id = %command.user_id,
        events = stored_events.len(),
        "user registered"
    );

    Ok(UserCommandResult {
        aggregate_id: command.user_id,
        stored_events,
    })
}

/// Handles the `VerifyUserEmail` command: reconstitutes the aggregate,
/// verifies the email, and persists the resulting event. Verifying an
/// already-verified (or deleted) account succeeds without persisting
/// anything.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown user, or a
/// load/replay/append error.
pub async fn handle_verify_user_email(
    command: &VerifyUserEmail,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<UserCommandResult, DomainError> {
    let existing_events = repo.load_events(command.user_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(command.user_id));
    }
    let mut user = reconstitute(command.user_id, &existing_events)?;
    let expected_version = user.version();

    user.verify_email(clock);

    let stored_events: Vec<StoredEvent> = user
        .uncommitted_events()
        .iter()
        .map(UserEvent::to_stored)
        .collect();

    if !stored_events.is_empty() {
        repo.append_events(command.user_id, expected_version, &stored_events)
            .await?;
        user.mark_events_committed();
    }

    info!(
        command = command.command_type(),
        aggregate_id = %command.user_id,
        events = stored_events.len(),
        "email verification handled"
    );

    Ok(UserCommandResult {
        aggregate_id: command.user_id,
        stored_events,
    })
}

/// Handles the `DeleteUser` command: reconstitutes the aggregate, deletes
/// it, and persists the resulting event. Deleting an already-deleted
/// account succeeds without persisting anything.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown user, or a
/// load/replay/append error.
pub async fn handle_delete_user(
    command: &DeleteUser,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<UserCommandResult, DomainError> {
    let existing_events = repo.load_events(command.user_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(command.user_id));
    }
    let mut user = reconstitute(command.user_id, &existing_events)?;
    let expected_version = user.version();

    user.delete(clock);

    let stored_events: Vec<StoredEvent> = user
        .uncommitted_events()
        .iter()
        .map(UserEvent::to_stored)
        .collect();

    if !stored_events.is_empty() {
        repo.append_events(command.user_id, expected_version, &stored_events)
            .await?;
        user.mark_events_committed();
    }

    info!(
        command = command.command_type(),
        aggregate_id = %command.user_id,
        events = stored_events.len(),
        "user deletion handled"
    );

    Ok(UserCommandResult {
        aggregate_id: command.user_id,
        stored_events,
    })
}
