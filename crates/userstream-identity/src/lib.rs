//! Userstream — Identity bounded context.
//!
//! Responsible for user registration, email verification, soft deletion,
//! and the transient login-session fields.

pub mod application;
pub mod domain;
