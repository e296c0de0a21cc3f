//! Application layer for the Identity context.

pub mod command_handlers;
