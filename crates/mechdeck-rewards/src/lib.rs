//! mechdeck: Rewards context.
//!
//! Resolves the reward intents a story queues into concrete changes to a
//! player's collection, equipment, stats, currencies and unlocks, and keeps
//! a ledger of what was granted.

pub mod application;
pub mod domain;
