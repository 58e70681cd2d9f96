//! Command handlers for the Rewards context.
//!
//! Rewards are applied to the player first; the ledger write that follows is
//! fire-and-forget. A ledger outage is logged and reported in the outcome
//! but never undoes or fails a grant.

use std::sync::Mutex;

use mechdeck_core::catalog::CardCatalog;
use mechdeck_core::clock::Clock;
use mechdeck_core::error::DomainError;
use mechdeck_core::repository::{RewardLedger, RewardLedgerEntry};
use mechdeck_core::rng::DeterministicRng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::aggregates::PlayerState;
use crate::domain::commands::{ClaimRewards, ProcessRewards, SyncMechStats};
use crate::domain::processor::{ProcessingResult, RewardProcessor, ledger_entry};

/// Result of processing a batch of reward intents.
#[derive(Debug, Clone, Serialize)]
pub struct RewardsOutcome {
    /// One result per intent, in order.
    pub results: Vec<ProcessingResult>,
    /// How many successful grants reached the ledger.
    pub ledger_recorded: usize,
}

fn ensure_owner(player: &PlayerState, user_id: uuid::Uuid) -> Result<(), DomainError> {
    if player.user_id == user_id {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "player state belongs to {}, not {user_id}",
            player.user_id
        )))
    }
}

/// Appends entries one by one, logging and skipping any that fail.
/// Returns how many were written.
pub async fn record_ledger_entries(ledger: &dyn RewardLedger, entries: &[RewardLedgerEntry]) -> usize {
    let mut recorded = 0;
    for entry in entries {
        match ledger.append(entry).await {
            Ok(()) => recorded += 1,
            Err(e) => warn!(
                user_id = %entry.user_id,
                story_id = %entry.story_id,
                reward_type = %entry.reward_type,
                error = %e,
                "reward ledger append failed"
            ),
        }
    }
    recorded
}

/// Handles the `ProcessRewards` command: resolves every intent against the
/// catalog, applies the grants to `player`, then records successful grants
/// in the ledger.
///
/// The `Mutex` is locked only around the synchronous processing so no guard
/// is held across an await.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `player` belongs to another user and
/// `DomainError::Infrastructure` if the RNG mutex is poisoned.
pub async fn handle_process_rewards(
    command: &ProcessRewards,
    player: &mut PlayerState,
    catalog: &dyn CardCatalog,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng>,
    ledger: &dyn RewardLedger,
) -> Result<RewardsOutcome, DomainError> {
    ensure_owner(player, command.user_id)?;

    let results = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        RewardProcessor::new(catalog, clock).process(player, &command.intents, &mut *rng_guard)
    };

    let granted_at = clock.now();
    let entries: Vec<RewardLedgerEntry> = results
        .iter()
        .filter_map(|result| ledger_entry(command.user_id, &command.story_id, result, granted_at))
        .collect();
    let ledger_recorded = record_ledger_entries(ledger, &entries).await;

    debug!(
        user_id = %command.user_id,
        story_id = %command.story_id,
        intents = command.intents.len(),
        granted = entries.len(),
        ledger_recorded,
        "rewards processed"
    );

    Ok(RewardsOutcome {
        results,
        ledger_recorded,
    })
}

/// Handles the `ClaimRewards` command: marks every granted entry of the
/// player as claimed and returns them.
///
/// # Errors
///
/// Returns `DomainError::Persistence` if the ledger fails.
pub async fn handle_claim_rewards(
    command: &ClaimRewards,
    clock: &dyn Clock,
    ledger: &dyn RewardLedger,
) -> Result<Vec<RewardLedgerEntry>, DomainError> {
    ledger.claim_all(command.user_id, clock.now()).await
}

/// Handles the `SyncMechStats` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `player` belongs to another user.
pub fn handle_sync_mech_stats(
    command: &SyncMechStats,
    player: &mut PlayerState,
) -> Result<(), DomainError> {
    ensure_owner(player, command.user_id)?;
    player.sync_mech_stats(command.stats.clone());
    Ok(())
}
