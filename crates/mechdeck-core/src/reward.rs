//! Reward intents: deferred instructions to grant the player something.
//!
//! Story actions queue intents; the reward processor resolves them against
//! the card catalog and the player's state. The set of kinds is closed so a
//! new kind cannot slip through the processor unhandled.

use serde::{Deserialize, Serialize};

use crate::catalog::CardFilter;

/// A reward waiting to be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RewardIntent {
    /// A specific card by id, or a random card of the given rarity.
    Card {
        /// Exact card to grant.
        #[serde(default)]
        card_id: Option<String>,
        /// Rarity filter used when no id is given.
        #[serde(default)]
        rarity: Option<String>,
    },
    /// A card that can go straight into an equipment slot.
    Equipment {
        /// Card to grant.
        card_id: String,
        /// Slot to equip into.
        #[serde(default)]
        slot: Option<String>,
        /// Equip immediately instead of adding to the collection.
        #[serde(default)]
        auto_equip: bool,
    },
    /// A signed modifier to a named stat.
    StatBoost {
        /// Stat name, e.g. `armor`.
        stat: String,
        /// Signed amount to add.
        value: i64,
        /// Number of battles the boost is meant to last; `None` is permanent.
        #[serde(default)]
        duration: Option<u32>,
    },
    /// Currency added to a named ledger.
    Currency {
        /// Currency name, e.g. `credits`.
        currency: String,
        /// Amount to add; must be positive.
        amount: i64,
    },
    /// A feature unlock.
    Unlock {
        /// Feature being unlocked.
        feature: String,
        /// Kind of unlock, e.g. `mode` or `card_back`.
        #[serde(default = "default_unlock_type")]
        unlock_type: String,
    },
    /// A random card, optionally filtered.
    RandomCard {
        /// Rarity filter.
        #[serde(default)]
        rarity: Option<String>,
        /// Card type filter.
        #[serde(default)]
        card_type: Option<String>,
        /// Element filter.
        #[serde(default)]
        element: Option<String>,
    },
    /// Several random cards drawn one at a time.
    CardPack {
        /// Number of draws.
        #[serde(default = "default_pack_size")]
        pack_size: u32,
        /// Rarity weights walked in document order.
        #[serde(default)]
        rarity_weights: Option<RarityWeights>,
        /// Card type filter applied to every draw.
        #[serde(default)]
        card_type: Option<String>,
        /// Element filter applied to every draw.
        #[serde(default)]
        element: Option<String>,
    },
}

fn default_unlock_type() -> String {
    "feature".to_owned()
}

fn default_pack_size() -> u32 {
    3
}

impl RewardIntent {
    /// Stable name of the intent kind, matching its `type` tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Card { .. } => "card",
            Self::Equipment { .. } => "equipment",
            Self::StatBoost { .. } => "stat_boost",
            Self::Currency { .. } => "currency",
            Self::Unlock { .. } => "unlock",
            Self::RandomCard { .. } => "random_card",
            Self::CardPack { .. } => "card_pack",
        }
    }

    /// The catalog filter a random draw for this intent uses, if any.
    #[must_use]
    pub fn draw_filter(&self) -> Option<CardFilter> {
        match self {
            Self::Card {
                card_id: None,
                rarity,
            } => Some(CardFilter {
                rarity: rarity.clone(),
                ..CardFilter::default()
            }),
            Self::RandomCard {
                rarity,
                card_type,
                element,
            } => Some(CardFilter {
                rarity: rarity.clone(),
                card_type: card_type.clone(),
                element: element.clone(),
            }),
            Self::CardPack {
                card_type, element, ..
            } => Some(CardFilter {
                rarity: None,
                card_type: card_type.clone(),
                element: element.clone(),
            }),
            _ => None,
        }
    }
}

/// Rarity → weight pairs in the order they were authored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RarityWeights(#[serde(with = "crate::ordered")] pub Vec<(String, u32)>);

impl RarityWeights {
    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().map(|(_, w)| *w).fold(0, u32::saturating_add)
    }

    /// Returns the rarity whose cumulative weight first reaches `roll`.
    ///
    /// `roll` is expected in `[1, total]`; anything above the total selects
    /// nothing.
    #[must_use]
    pub fn select(&self, roll: u32) -> Option<&str> {
        let mut cumulative = 0u32;
        for (rarity, weight) in &self.0 {
            cumulative = cumulative.saturating_add(*weight);
            if roll <= cumulative && *weight > 0 {
                return Some(rarity);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intents_use_snake_case_tags_and_camel_case_fields() {
        let intents: Vec<RewardIntent> = serde_json::from_str(
            r#"[
                {"type": "card", "cardId": "c-1"},
                {"type": "stat_boost", "stat": "armor", "value": -2, "duration": 3},
                {"type": "unlock", "feature": "arena"},
                {"type": "card_pack", "packSize": 5, "rarityWeights": {"common": 3, "rare": 1}}
            ]"#,
        )
        .unwrap();

        assert_eq!(
            intents[0],
            RewardIntent::Card {
                card_id: Some("c-1".into()),
                rarity: None
            }
        );
        assert_eq!(intents[1].kind(), "stat_boost");
        assert_eq!(
            intents[2],
            RewardIntent::Unlock {
                feature: "arena".into(),
                unlock_type: "feature".into()
            }
        );
        match &intents[3] {
            RewardIntent::CardPack {
                pack_size,
                rarity_weights: Some(weights),
                ..
            } => {
                assert_eq!(*pack_size, 5);
                assert_eq!(weights.total(), 4);
            }
            other => panic!("expected CardPack, got {other:?}"),
        }
    }

    #[test]
    fn test_select_walks_cumulative_weights_in_order() {
        let weights = RarityWeights(vec![("common".into(), 3), ("rare".into(), 1)]);

        assert_eq!(weights.select(1), Some("common"));
        assert_eq!(weights.select(3), Some("common"));
        assert_eq!(weights.select(4), Some("rare"));
        assert_eq!(weights.select(5), None);
    }

    #[test]
    fn test_select_skips_zero_weights() {
        let weights = RarityWeights(vec![("legendary".into(), 0), ("common".into(), 2)]);

        assert_eq!(weights.select(1), Some("common"));
        assert_eq!(weights.total(), 2);
    }
}
