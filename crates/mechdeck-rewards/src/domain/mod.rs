//! Domain model for the Rewards context.

pub mod aggregates;
pub mod catalog;
pub mod commands;
pub mod draw;
pub mod processor;
