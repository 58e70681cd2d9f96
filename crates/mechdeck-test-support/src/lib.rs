//! Shared test mocks and utilities for the mechdeck engine.

mod catalog;
mod clock;
mod repository;
mod rng;

pub use catalog::{CountingCatalog, sample_cards};
pub use clock::{FixedClock, fixed_now};
pub use repository::{
    FailingProgressRepository, FailingRewardLedger, RecordingProgressRepository,
    RecordingRewardLedger,
};
pub use rng::{MockRng, SequenceRng};
