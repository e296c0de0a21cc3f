//! Commands for the Identity context.

use userstream_core::command::Command;
use uuid::Uuid;

/// Command to register a new user account.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    /// The identifier for the new user.
    pub user_id: Uuid,
    /// The chosen username.
    pub username: String,
    /// The email address.
    pub email: String,
    /// The raw password. Hashed by the aggregate, never stored.
    pub password: String,
}

impl Command for RegisterUser {
    fn command_type(&self) -> &'static str {
        "user.register"
    }
}

/// Command to verify a user's email address.
#[derive(Debug, Clone)]
pub struct VerifyUserEmail {
    /// The user identifier.
    pub user_id: Uuid,
}

impl Command for VerifyUserEmail {
    fn command_type(&self) -> &'static str {
        "user.verify_email"
    }
}

/// Command to soft-delete a user account.
#[derive(Debug, Clone)]
pub struct DeleteUser {
    /// The user identifier.
    pub user_id: Uuid,
}

impl Command for DeleteUser {
    fn command_type(&self) -> &'static str {
        "user.delete"
    }
}
