//! mechdeck Core: shared domain abstractions.
//!
//! This crate defines the types and traits that the narrative and reward
//! contexts share: weakly-typed story values, reward intents, the card
//! catalog contract, persistence traits, and the clock/RNG seams used to keep
//! domain logic deterministic. It contains no infrastructure code.

pub mod catalog;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ordered;
pub mod repository;
pub mod reward;
pub mod rng;
pub mod value;
