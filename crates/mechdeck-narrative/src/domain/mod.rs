//! Domain model for the Narrative context.

pub mod aggregates;
pub mod commands;
pub mod conditions;
pub mod events;
pub mod loader;
pub mod story;
pub mod template;
