//! Application layer for the Narrative context.

pub mod command_handlers;
pub mod query_handlers;
