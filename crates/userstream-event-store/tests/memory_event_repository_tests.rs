//! Integration tests for the in-memory event repository, including the
//! full register/verify/reload flow through the identity command handlers.

use chrono::{DateTime, TimeZone, Utc};
use userstream_core::error::DomainError;
use userstream_core::repository::{EventRepository, StoredEvent};
use userstream_event_store::MemoryEventRepository;
use userstream_identity::application::command_handlers::{
    handle_delete_user, handle_register_user, handle_verify_user_email,
};
use userstream_identity::domain::commands::{DeleteUser, RegisterUser, VerifyUserEmail};
use userstream_test_support::FixedClock;
use uuid::Uuid;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

fn stored_event(aggregate_id: Uuid, event_version: i64) -> StoredEvent {
    StoredEvent {
        event_id: Uuid::new_v4(),
        aggregate_id,
        event_type: "user.email_verified".to_owned(),
        payload: serde_json::json!({ "EmailVerified": { "user_id": aggregate_id } }),
        event_version,
        occurred_at: fixed_now(),
    }
}

fn register_command(user_id: Uuid) -> RegisterUser {
    RegisterUser {
        user_id,
        username: "alice".to_owned(),
        email: "a@x.com".to_owned(),
        password: "longenough".to_owned(),
    }
}

#[tokio::test]
async fn test_append_then_load_round_trips_in_order() {
    let repo = MemoryEventRepository::new();
    let aggregate_id = Uuid::new_v4();
    let batch = vec![stored_event(aggregate_id, 1), stored_event(aggregate_id, 2)];

    repo.append_events(aggregate_id, 0, &batch).await.unwrap();
    let loaded = repo.load_events(aggregate_id).await.unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].event_version, 1);
    assert_eq!(loaded[1].event_version, 2);
    assert_eq!(loaded[0].event_id, batch[0].event_id);
}

#[tokio::test]
async fn test_load_unknown_aggregate_returns_empty_stream() {
    let repo = MemoryEventRepository::new();

    let loaded = repo.load_events(Uuid::new_v4()).await.unwrap();

    assert!(loaded.is_empty());
}

#[tokio::test]
async fn test_append_with_stale_expected_version_conflicts() {
    let repo = MemoryEventRepository::new();
    let aggregate_id = Uuid::new_v4();
    repo.append_events(aggregate_id, 0, &[stored_event(aggregate_id, 1)])
        .await
        .unwrap();

    // A second writer that loaded at version 0 loses the race.
    let result = repo
        .append_events(aggregate_id, 0, &[stored_event(aggregate_id, 1)])
        .await;

    match result.unwrap_err() {
        DomainError::ConcurrencyConflict {
            aggregate_id: id,
            expected,
            actual,
        } => {
            assert_eq!(id, aggregate_id);
            assert_eq!(expected, 0);
            assert_eq!(actual, 1);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }

    // The losing write must not have touched the stream.
    assert_eq!(repo.load_events(aggregate_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_append_rejects_batch_that_does_not_continue_the_stream() {
    let repo = MemoryEventRepository::new();
    let aggregate_id = Uuid::new_v4();

    let result = repo
        .append_events(
            aggregate_id,
            0,
            &[stored_event(aggregate_id, 1), stored_event(aggregate_id, 3)],
        )
        .await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::CorruptHistory {
            expected_version: 2,
            actual_version: 3,
            ..
        }
    ));
    // All-or-nothing: the valid prefix was not kept.
    assert!(repo.load_events(aggregate_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_append_rejects_events_for_a_different_aggregate() {
    let repo = MemoryEventRepository::new();
    let aggregate_id = Uuid::new_v4();
    let foreign_id = Uuid::new_v4();

    let result = repo
        .append_events(aggregate_id, 0, &[stored_event(foreign_id, 1)])
        .await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::IdentityMismatch { .. }
    ));
}

#[tokio::test]
async fn test_register_verify_reload_flow() {
    let repo = MemoryEventRepository::new();
    let clock = FixedClock(fixed_now());
    let user_id = Uuid::new_v4();

    // Register: one stored event at version 1.
    let registered = handle_register_user(&register_command(user_id), &clock, &repo)
        .await
        .unwrap();
    assert_eq!(registered.stored_events.len(), 1);

    // Verify: a second event at version 2.
    let verified = handle_verify_user_email(&VerifyUserEmail { user_id }, &clock, &repo)
        .await
        .unwrap();
    assert_eq!(verified.stored_events.len(), 1);
    assert_eq!(verified.stored_events[0].event_version, 2);

    // Verifying again is a successful no-op that persists nothing.
    let again = handle_verify_user_email(&VerifyUserEmail { user_id }, &clock, &repo)
        .await
        .unwrap();
    assert!(again.stored_events.is_empty());

    let stream = repo.load_events(user_id).await.unwrap();
    assert_eq!(stream.len(), 2);
    assert_eq!(stream[0].event_type, "user.created");
    assert_eq!(stream[1].event_type, "user.email_verified");
}

#[tokio::test]
async fn test_registering_the_same_user_id_twice_conflicts() {
    let repo = MemoryEventRepository::new();
    let clock = FixedClock(fixed_now());
    let user_id = Uuid::new_v4();

    handle_register_user(&register_command(user_id), &clock, &repo)
        .await
        .unwrap();

    let result = handle_register_user(&register_command(user_id), &clock, &repo).await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::ConcurrencyConflict { expected: 0, actual: 1, .. }
    ));
}

#[tokio::test]
async fn test_delete_is_terminal_across_reloads() {
    let repo = MemoryEventRepository::new();
    let clock = FixedClock(fixed_now());
    let user_id = Uuid::new_v4();

    handle_register_user(&register_command(user_id), &clock, &repo)
        .await
        .unwrap();
    handle_delete_user(&DeleteUser { user_id }, &clock, &repo)
        .await
        .unwrap();

    // Deleting again and verifying after deletion are both no-ops.
    let deleted_again = handle_delete_user(&DeleteUser { user_id }, &clock, &repo)
        .await
        .unwrap();
    assert!(deleted_again.stored_events.is_empty());

    let verify = handle_verify_user_email(&VerifyUserEmail { user_id }, &clock, &repo)
        .await
        .unwrap();
    assert!(verify.stored_events.is_empty());

    assert_eq!(repo.load_events(user_id).await.unwrap().len(), 2);
}
