//! Query handlers for the Rewards context.

use std::collections::BTreeMap;

use mechdeck_core::catalog::Card;
use mechdeck_core::error::DomainError;
use mechdeck_core::repository::{RewardLedger, RewardLedgerEntry};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{PlayerState, StatModifier, UnlockRecord};

/// Read model of a player's reward state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    /// The player.
    pub user_id: Uuid,
    /// Cards owned but not equipped.
    pub collection: Vec<Card>,
    /// Equipped cards by slot.
    pub equipment: BTreeMap<String, Card>,
    /// Story stat-modifier ledger.
    pub stat_modifiers: Vec<StatModifier>,
    /// Net modifier per stat.
    pub stat_totals: BTreeMap<String, i64>,
    /// Live mech stats while in battle.
    pub mech_stats: Option<BTreeMap<String, i64>>,
    /// Currency balances.
    pub currencies: BTreeMap<String, i64>,
    /// Unlocks in grant order.
    pub unlocks: Vec<UnlockRecord>,
}

/// Builds the read model for `player`.
#[must_use]
pub fn player_view(player: &PlayerState) -> PlayerView {
    let stat_totals = player
        .stat_modifiers()
        .iter()
        .map(|m| (m.stat.clone(), player.stat_modifier_total(&m.stat)))
        .collect();

    PlayerView {
        user_id: player.user_id,
        collection: player.collection().to_vec(),
        equipment: player.equipment().clone(),
        stat_modifiers: player.stat_modifiers().to_vec(),
        stat_totals,
        mech_stats: player.mech_stats().cloned(),
        currencies: player.currencies().clone(),
        unlocks: player.unlocks().to_vec(),
    }
}

/// Granted but unclaimed ledger entries for a player.
///
/// # Errors
///
/// Returns `DomainError::Persistence` if the ledger fails.
pub async fn pending_rewards(
    user_id: Uuid,
    ledger: &dyn RewardLedger,
) -> Result<Vec<RewardLedgerEntry>, DomainError> {
    ledger.pending_for_user(user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mechdeck_test_support::{FailingRewardLedger, RecordingRewardLedger, sample_cards};

    #[test]
    fn test_player_view_totals_modifiers_per_stat() {
        // Arrange
        let mut player = PlayerState::new(Uuid::new_v4());
        player.apply_stat_boost("armor", 2, None);
        player.apply_stat_boost("armor", 3, Some(1));
        player.apply_stat_boost("speed", -1, None);
        player.equip("arm", sample_cards()[0].clone());

        // Act
        let view = player_view(&player);

        // Assert
        assert_eq!(view.stat_totals["armor"], 5);
        assert_eq!(view.stat_totals["speed"], -1);
        assert_eq!(view.stat_modifiers.len(), 3);
        assert_eq!(view.equipment["arm"].id, "laser-lance");
        assert!(view.mech_stats.is_none());
    }

    #[tokio::test]
    async fn test_pending_rewards_for_new_player_is_empty() {
        let ledger = RecordingRewardLedger::new();

        let pending = pending_rewards(Uuid::new_v4(), &ledger).await.unwrap();

        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_pending_rewards_propagates_ledger_failure() {
        let result = pending_rewards(Uuid::new_v4(), &FailingRewardLedger).await;
        assert!(matches!(result, Err(DomainError::Persistence(_))));
    }
}
