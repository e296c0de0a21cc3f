//! Domain events for the Identity context.

use serde::{Deserialize, Serialize};
use userstream_core::event::{Event, EventKind};
use uuid::Uuid;

/// Emitted when a user account is registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreated {
    /// The user identifier.
    pub user_id: Uuid,
    /// The chosen username.
    pub username: String,
    /// The email address.
    pub email: String,
    /// Hash of the chosen password. The raw password is never recorded.
    pub password_hash: String,
}

/// Emitted when a user's email address is verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEmailVerified {
    /// The user identifier.
    pub user_id: Uuid,
}

/// Emitted when a user account is soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDeleted {
    /// The user identifier.
    pub user_id: Uuid,
}

/// Event type identifier for [`UserCreated`].
pub const USER_CREATED_EVENT_TYPE: &str = "user.created";

/// Event type identifier for [`UserEmailVerified`].
pub const USER_EMAIL_VERIFIED_EVENT_TYPE: &str = "user.email_verified";

/// Event type identifier for [`UserDeleted`].
pub const USER_DELETED_EVENT_TYPE: &str = "user.deleted";

/// Event payload variants for the Identity context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UserEventKind {
    /// A user account has been registered.
    Created(UserCreated),
    /// A user's email address has been verified.
    EmailVerified(UserEmailVerified),
    /// A user account has been soft-deleted.
    Deleted(UserDeleted),
}

impl EventKind for UserEventKind {
    fn event_type(&self) -> &'static str {
        match self {
            UserEventKind::Created(_) => USER_CREATED_EVENT_TYPE,
            UserEventKind::EmailVerified(_) => USER_EMAIL_VERIFIED_EVENT_TYPE,
            UserEventKind::Deleted(_) => USER_DELETED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Identity context.
pub type UserEvent = Event<UserEventKind>;
