//! Aggregate root for the Rewards context.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mechdeck_core::catalog::Card;
use mechdeck_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One story-granted stat modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatModifier {
    /// Stat name.
    pub stat: String,
    /// Signed amount.
    pub value: i64,
    /// Battles the modifier lasts; `None` is permanent.
    pub duration: Option<u32>,
}

/// A granted unlock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRecord {
    /// Feature unlocked.
    pub feature: String,
    /// Kind of unlock.
    pub unlock_type: String,
    /// When it was granted.
    pub unlocked_at: DateTime<Utc>,
}

/// Everything rewards can change about a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// The player.
    pub user_id: Uuid,
    collection: Vec<Card>,
    equipment: BTreeMap<String, Card>,
    stat_modifiers: Vec<StatModifier>,
    mech_stats: Option<BTreeMap<String, i64>>,
    currencies: BTreeMap<String, i64>,
    unlocks: Vec<UnlockRecord>,
}

impl PlayerState {
    /// An empty player.
    #[must_use]
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            collection: Vec::new(),
            equipment: BTreeMap::new(),
            stat_modifiers: Vec::new(),
            mech_stats: None,
            currencies: BTreeMap::new(),
            unlocks: Vec::new(),
        }
    }

    /// Cards owned but not equipped.
    #[must_use]
    pub fn collection(&self) -> &[Card] {
        &self.collection
    }

    /// Equipped cards by slot.
    #[must_use]
    pub fn equipment(&self) -> &BTreeMap<String, Card> {
        &self.equipment
    }

    /// Story stat-modifier ledger, oldest first.
    #[must_use]
    pub fn stat_modifiers(&self) -> &[StatModifier] {
        &self.stat_modifiers
    }

    /// Net modifier for `stat` across the ledger.
    #[must_use]
    pub fn stat_modifier_total(&self, stat: &str) -> i64 {
        self.stat_modifiers
            .iter()
            .filter(|m| m.stat == stat)
            .fold(0, |sum, m| sum.saturating_add(m.value))
    }

    /// Live stats of the mech in battle, if one is.
    #[must_use]
    pub fn mech_stats(&self) -> Option<&BTreeMap<String, i64>> {
        self.mech_stats.as_ref()
    }

    /// Currency balances.
    #[must_use]
    pub fn currencies(&self) -> &BTreeMap<String, i64> {
        &self.currencies
    }

    /// Unlocks in grant order.
    #[must_use]
    pub fn unlocks(&self) -> &[UnlockRecord] {
        &self.unlocks
    }

    /// Adds a card to the collection.
    pub fn add_card(&mut self, card: Card) {
        self.collection.push(card);
    }

    /// Puts `card` into `slot`; a card already there goes back to the
    /// collection and is returned.
    pub fn equip(&mut self, slot: &str, card: Card) -> Option<Card> {
        let displaced = self.equipment.insert(slot.to_owned(), card);
        if let Some(previous) = &displaced {
            self.collection.push(previous.clone());
        }
        displaced
    }

    /// Records a stat modifier and applies it to the live mech when that
    /// stat exists there. Returns the new live value, if any.
    pub fn apply_stat_boost(&mut self, stat: &str, value: i64, duration: Option<u32>) -> Option<i64> {
        self.stat_modifiers.push(StatModifier {
            stat: stat.to_owned(),
            value,
            duration,
        });
        let live = self.mech_stats.as_mut()?.get_mut(stat)?;
        *live = live.saturating_add(value);
        Some(*live)
    }

    /// Credits `amount` of `currency` and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `amount` is not positive.
    pub fn add_currency(&mut self, currency: &str, amount: i64) -> Result<i64, DomainError> {
        if amount <= 0 {
            return Err(DomainError::Validation(format!(
                "currency amount must be positive, got {amount}"
            )));
        }
        let balance = self.currencies.entry(currency.to_owned()).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(*balance)
    }

    /// Appends an unlock. Repeated unlocks accumulate.
    pub fn unlock(&mut self, feature: &str, unlock_type: &str, unlocked_at: DateTime<Utc>) {
        self.unlocks.push(UnlockRecord {
            feature: feature.to_owned(),
            unlock_type: unlock_type.to_owned(),
            unlocked_at,
        });
    }

    /// Replaces the live mech stats; `None` means the player left battle.
    pub fn sync_mech_stats(&mut self, stats: Option<BTreeMap<String, i64>>) {
        self.mech_stats = stats;
    }
}
