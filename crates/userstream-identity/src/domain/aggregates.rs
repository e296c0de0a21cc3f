//! Aggregate roots for the Identity context.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use userstream_core::aggregate::{AggregateRoot, AggregateState};
use userstream_core::clock::Clock;
use userstream_core::error::DomainError;
use uuid::Uuid;

use super::events::{UserCreated, UserDeleted, UserEmailVerified, UserEvent, UserEventKind};

/// Minimum accepted password length, in bytes.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Event-sourced state of a user account.
///
/// Every field here is derived: it changes only inside [`AggregateState::project`],
/// so live operation and replay produce identical state.
#[derive(Debug, Default)]
pub struct UserState {
    username: String,
    email: String,
    password_hash: String,
    is_email_verified: bool,
    is_deleted: bool,
}

impl AggregateState for UserState {
    type Kind = UserEventKind;

    fn project(&mut self, kind: &UserEventKind) {
        match kind {
            UserEventKind::Created(e) => {
                self.username = e.username.clone();
                self.email = e.email.clone();
                self.password_hash = e.password_hash.clone();
            }
            UserEventKind::EmailVerified(_) => self.is_email_verified = true,
            UserEventKind::Deleted(_) => self.is_deleted = true,
        }
    }
}

/// The aggregate root for a user account.
///
/// Account state is sourced from the event stream. The login-session
/// fields (tokens, last login) are deliberately transient: they are not
/// part of the event history and reset on every reload.
#[derive(Debug)]
pub struct User {
    root: AggregateRoot<UserState>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Registers a new user account. The resulting aggregate is at
    /// version 1 with a single uncommitted `user.created` event.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a nil id, empty username,
    /// malformed email, or a password shorter than [`MIN_PASSWORD_LENGTH`].
    pub fn register(
        id: Uuid,
        username: &str,
        email: &str,
        password: &str,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        if id.is_nil() {
            return Err(DomainError::Validation("user id must not be nil".into()));
        }
        if username.trim().is_empty() {
            return Err(DomainError::Validation("username must not be empty".into()));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(DomainError::Validation(format!(
                "malformed email address: {email:?}"
            )));
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let mut root = AggregateRoot::new(id);
        root.record(
            UserEventKind::Created(UserCreated {
                user_id: id,
                username: username.to_owned(),
                email: email.to_owned(),
                password_hash: hash_password(password),
            }),
            clock,
        );
        Ok(Self::with_root(root))
    }

    /// Reconstructs a user by replaying a persisted event history.
    ///
    /// # Errors
    ///
    /// Propagates replay failures from the aggregate engine:
    /// identity mismatch, unknown event type, or corrupt history.
    pub fn reconstruct(id: Uuid, history: &[UserEvent]) -> Result<Self, DomainError> {
        Ok(Self::with_root(AggregateRoot::reconstruct(id, history)?))
    }

    fn with_root(root: AggregateRoot<UserState>) -> Self {
        Self {
            root,
            access_token: None,
            refresh_token: None,
            last_login: None,
        }
    }

    /// Marks the user's email address as verified.
    ///
    /// A successful no-op when the email is already verified or the
    /// account is deleted: no event is recorded and the version is
    /// unchanged.
    pub fn verify_email(&mut self, clock: &dyn Clock) {
        if self.root.state().is_email_verified || self.root.state().is_deleted {
            return;
        }
        let user_id = self.root.id();
        self.root.record(
            UserEventKind::EmailVerified(UserEmailVerified { user_id }),
            clock,
        );
    }

    /// Soft-deletes the account. Deletion is terminal.
    ///
    /// A successful no-op when the account is already deleted.
    pub fn delete(&mut self, clock: &dyn Clock) {
        if self.root.state().is_deleted {
            return;
        }
        let user_id = self.root.id();
        self.root
            .record(UserEventKind::Deleted(UserDeleted { user_id }), clock);
    }

    /// Returns the aggregate identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.root.id()
    }

    /// Returns the current version (number of events applied).
    #[must_use]
    pub fn version(&self) -> i64 {
        self.root.version()
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.root.state().username
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.root.state().email
    }

    /// Returns the password hash.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.root.state().password_hash
    }

    /// Returns whether the email address has been verified.
    #[must_use]
    pub fn is_email_verified(&self) -> bool {
        self.root.state().is_email_verified
    }

    /// Returns whether the account has been soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.root.state().is_deleted
    }

    /// Returns uncommitted events pending persistence.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[UserEvent] {
        self.root.uncommitted_events()
    }

    /// Clears uncommitted events after persistence. Idempotent.
    pub fn mark_events_committed(&mut self) {
        self.root.mark_events_committed();
    }

    /// Stores the session tokens for the current login. Transient: not
    /// event-sourced, never persisted with the stream.
    pub fn set_session_tokens(&mut self, access_token: String, refresh_token: String) {
        self.access_token = Some(access_token);
        self.refresh_token = Some(refresh_token);
    }

    /// Drops the current session tokens.
    pub fn clear_session(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
    }

    /// Returns whether both session tokens are present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// Records the time of the current login. Transient, like the tokens.
    pub fn record_login(&mut self, clock: &dyn Clock) {
        self.last_login = Some(clock.now());
    }

    /// Returns the time of the last recorded login, if any.
    #[must_use]
    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    /// Returns the current access token, if logged in.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the current refresh token, if logged in.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}

fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
