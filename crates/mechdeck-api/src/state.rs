//! Shared application state.

use std::sync::{Arc, Mutex};

use mechdeck_core::catalog::CardCatalog;
use mechdeck_core::clock::Clock;
use mechdeck_core::repository::{ProgressRepository, RewardLedger};
use mechdeck_core::rng::DeterministicRng;
use mechdeck_narrative::domain::loader::StorySource;
use mechdeck_store::fallback::FallbackProgressRepository;

use crate::session::PlayerSessions;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for timestamps.
    pub clock: Arc<dyn Clock>,
    /// RNG for card draws; locked only around synchronous processing.
    pub rng: Arc<Mutex<dyn DeterministicRng>>,
    /// Where stories are read from.
    pub stories: Arc<dyn StorySource>,
    /// Card lookup for rewards.
    pub catalog: Arc<dyn CardCatalog>,
    /// Story progress store, with an in-memory fallback.
    pub progress: Arc<dyn ProgressRepository>,
    /// Reward ledger.
    pub ledger: Arc<dyn RewardLedger>,
    /// Per-player reward state and active story.
    pub sessions: Arc<PlayerSessions>,
}

impl AppState {
    /// Create new application state with empty player sessions.
    ///
    /// `progress` is wrapped so that players keep advancing on in-memory
    /// progress while the store is failing.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng>>,
        stories: Arc<dyn StorySource>,
        catalog: Arc<dyn CardCatalog>,
        progress: Arc<dyn ProgressRepository>,
        ledger: Arc<dyn RewardLedger>,
    ) -> Self {
        Self {
            clock,
            rng,
            stories,
            catalog,
            progress: Arc::new(FallbackProgressRepository::new(progress)),
            ledger,
            sessions: Arc::new(PlayerSessions::new()),
        }
    }
}
