//! Reward resolution.
//!
//! Each intent becomes exactly one [`ProcessingResult`]. A failed intent
//! never stops the rest of the batch.

use chrono::{DateTime, Utc};
use mechdeck_core::catalog::{Card, CardCatalog};
use mechdeck_core::clock::Clock;
use mechdeck_core::repository::{RewardLedgerEntry, RewardStatus};
use mechdeck_core::reward::RewardIntent;
use mechdeck_core::rng::DeterministicRng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use super::aggregates::PlayerState;
use super::draw::{draw_card, roll_rarity};

/// Most cards one pack can draw; larger `packSize` values are clamped.
pub const MAX_PACK_SIZE: u32 = 20;

/// Outcome of one reward intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    /// The intent's `type` tag.
    pub reward_type: &'static str,
    /// Whether anything was granted.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Cards granted, if any.
    pub cards: Vec<Card>,
    /// The intent that was processed.
    pub intent: RewardIntent,
}

impl ProcessingResult {
    fn granted(intent: &RewardIntent, message: String, cards: Vec<Card>) -> Self {
        Self {
            reward_type: intent.kind(),
            success: true,
            message,
            cards,
            intent: intent.clone(),
        }
    }

    fn failed(intent: &RewardIntent, message: String) -> Self {
        Self {
            reward_type: intent.kind(),
            success: false,
            message,
            cards: Vec::new(),
            intent: intent.clone(),
        }
    }
}

/// Applies reward intents to a player using a card catalog.
pub struct RewardProcessor<'a> {
    catalog: &'a dyn CardCatalog,
    clock: &'a dyn Clock,
}

impl<'a> RewardProcessor<'a> {
    /// Creates a processor over `catalog`.
    #[must_use]
    pub fn new(catalog: &'a dyn CardCatalog, clock: &'a dyn Clock) -> Self {
        Self { catalog, clock }
    }

    /// Processes `intents` in order against `player`.
    pub fn process(
        &self,
        player: &mut PlayerState,
        intents: &[RewardIntent],
        rng: &mut dyn DeterministicRng,
    ) -> Vec<ProcessingResult> {
        intents
            .iter()
            .map(|intent| self.process_one(player, intent, rng))
            .collect()
    }

    fn process_one(
        &self,
        player: &mut PlayerState,
        intent: &RewardIntent,
        rng: &mut dyn DeterministicRng,
    ) -> ProcessingResult {
        match intent {
            RewardIntent::Card {
                card_id: Some(card_id),
                ..
            } => match self.catalog.card_by_id(card_id) {
                Some(card) => grant_cards(player, intent, vec![card]),
                None => ProcessingResult::failed(intent, format!("card {card_id} not found")),
            },
            RewardIntent::Card { card_id: None, .. } | RewardIntent::RandomCard { .. } => {
                let filter = intent.draw_filter().unwrap_or_default();
                match draw_card(self.catalog, &filter, rng) {
                    Some(card) => grant_cards(player, intent, vec![card]),
                    None => ProcessingResult::failed(intent, "no card matches the filter".to_owned()),
                }
            }
            RewardIntent::CardPack {
                pack_size,
                rarity_weights,
                ..
            } => {
                let base = intent.draw_filter().unwrap_or_default();
                let draws = (*pack_size).min(MAX_PACK_SIZE);
                if draws < *pack_size {
                    warn!(pack_size, max = MAX_PACK_SIZE, "card pack size clamped");
                }
                let mut cards = Vec::new();
                for _ in 0..draws {
                    let filter = match rarity_weights.as_ref().and_then(|w| roll_rarity(w, rng)) {
                        Some(rarity) => base.with_rarity(rarity),
                        None => base.clone(),
                    };
                    if let Some(card) = draw_card(self.catalog, &filter, rng) {
                        cards.push(card);
                    }
                }
                if cards.is_empty() {
                    ProcessingResult::failed(intent, "card pack drew no cards".to_owned())
                } else {
                    grant_cards(player, intent, cards)
                }
            }
            RewardIntent::Equipment {
                card_id,
                slot,
                auto_equip,
            } => {
                let Some(card) = self.catalog.card_by_id(card_id) else {
                    return ProcessingResult::failed(intent, format!("card {card_id} not found"));
                };
                match slot.as_deref().filter(|_| *auto_equip) {
                    Some(slot) => {
                        let message = format!("equipped {} in {slot}", card.name);
                        player.equip(slot, card.clone());
                        ProcessingResult::granted(intent, message, vec![card])
                    }
                    None => grant_cards(player, intent, vec![card]),
                }
            }
            RewardIntent::StatBoost {
                stat,
                value,
                duration,
            } => {
                let message = match player.apply_stat_boost(stat, *value, *duration) {
                    Some(live) => format!("{stat} {value:+}, now {live}"),
                    None => format!("{stat} {value:+}"),
                };
                ProcessingResult::granted(intent, message, Vec::new())
            }
            RewardIntent::Currency { currency, amount } => {
                match player.add_currency(currency, *amount) {
                    Ok(balance) => ProcessingResult::granted(
                        intent,
                        format!("+{amount} {currency}, balance {balance}"),
                        Vec::new(),
                    ),
                    Err(e) => ProcessingResult::failed(intent, e.to_string()),
                }
            }
            RewardIntent::Unlock {
                feature,
                unlock_type,
            } => {
                player.unlock(feature, unlock_type, self.clock.now());
                ProcessingResult::granted(intent, format!("unlocked {unlock_type} {feature}"), Vec::new())
            }
        }
    }
}

fn grant_cards(player: &mut PlayerState, intent: &RewardIntent, cards: Vec<Card>) -> ProcessingResult {
    for card in &cards {
        player.add_card(card.clone());
    }
    let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
    let message = format!("granted {}", names.join(", "));
    ProcessingResult::granted(intent, message, cards)
}

/// Hex SHA-256 over `user|story|payload`. Identical grants share a key.
#[must_use]
pub fn dedupe_key(user_id: Uuid, story_id: &str, payload: &serde_json::Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b"|");
    hasher.update(story_id.as_bytes());
    hasher.update(b"|");
    hasher.update(payload.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Ledger entry for a successful result; `None` for a failed one.
#[must_use]
pub fn ledger_entry(
    user_id: Uuid,
    story_id: &str,
    result: &ProcessingResult,
    granted_at: DateTime<Utc>,
) -> Option<RewardLedgerEntry> {
    if !result.success {
        return None;
    }
    let intent = serde_json::to_value(&result.intent).ok()?;
    let key = dedupe_key(user_id, story_id, &intent);
    let card_ids: Vec<&str> = result.cards.iter().map(|c| c.id.as_str()).collect();
    Some(RewardLedgerEntry {
        entry_id: Uuid::new_v4(),
        user_id,
        story_id: story_id.to_owned(),
        reward_type: result.reward_type.to_owned(),
        payload: serde_json::json!({
            "intent": intent,
            "cardIds": card_ids,
            "message": result.message,
        }),
        status: RewardStatus::Granted,
        dedupe_key: key,
        granted_at,
        claimed_at: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mechdeck_core::reward::RarityWeights;
    use mechdeck_test_support::{CountingCatalog, FixedClock, MockRng, SequenceRng, fixed_now, sample_cards};

    fn run(
        catalog: &CountingCatalog,
        player: &mut PlayerState,
        intents: &[RewardIntent],
        rng: &mut dyn DeterministicRng,
    ) -> Vec<ProcessingResult> {
        let clock = FixedClock(fixed_now());
        RewardProcessor::new(catalog, &clock).process(player, intents, rng)
    }

    fn pack(pack_size: u32, card_type: Option<&str>) -> RewardIntent {
        RewardIntent::CardPack {
            pack_size,
            rarity_weights: None,
            card_type: card_type.map(str::to_owned),
            element: None,
        }
    }

    #[test]
    fn test_card_pack_calls_catalog_once_per_draw() {
        // Arrange
        let catalog = CountingCatalog::new(sample_cards());
        let mut player = PlayerState::new(Uuid::new_v4());

        // Act
        let results = run(&catalog, &mut player, &[pack(3, None)], &mut MockRng);

        // Assert
        assert_eq!(catalog.all_cards_calls(), 3);
        assert!(results[0].success);
        assert_eq!(results[0].cards.len(), 3);
        assert_eq!(player.collection().len(), 3);
    }

    #[test]
    fn test_oversized_card_pack_is_clamped() {
        // Arrange
        let catalog = CountingCatalog::new(sample_cards());
        let mut player = PlayerState::new(Uuid::new_v4());

        // Act
        let results = run(&catalog, &mut player, &[pack(u32::MAX, None)], &mut MockRng);

        // Assert
        assert_eq!(catalog.all_cards_calls(), MAX_PACK_SIZE as usize);
        assert!(results[0].success);
        assert_eq!(results[0].cards.len(), MAX_PACK_SIZE as usize);
        assert_eq!(player.collection().len(), MAX_PACK_SIZE as usize);
    }

    #[test]
    fn test_card_pack_continues_past_misses() {
        // Arrange
        let catalog = CountingCatalog::new(sample_cards());
        let mut player = PlayerState::new(Uuid::new_v4());

        // Act
        let results = run(&catalog, &mut player, &[pack(3, Some("reactor"))], &mut MockRng);

        // Assert
        assert_eq!(catalog.all_cards_calls(), 3);
        assert!(!results[0].success);
        assert!(results[0].cards.is_empty());
        assert!(player.collection().is_empty());
    }

    #[test]
    fn test_card_pack_with_weights_draws_each_rarity() {
        // Arrange
        let catalog = CountingCatalog::new(sample_cards());
        let mut player = PlayerState::new(Uuid::new_v4());
        let intent = RewardIntent::CardPack {
            pack_size: 2,
            rarity_weights: Some(RarityWeights(vec![
                ("common".to_owned(), 3),
                ("rare".to_owned(), 1),
            ])),
            card_type: None,
            element: None,
        };
        // roll 4 -> rare, pick 0; roll 1 -> common, pick 1
        let mut rng = SequenceRng::new(vec![4, 0, 1, 1]);

        // Act
        let results = run(&catalog, &mut player, &[intent], &mut rng);

        // Assert
        let ids: Vec<&str> = results[0].cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["frost-cannon", "plasma-shield"]);
        assert_eq!(rng.consumed(), 4);
    }

    #[test]
    fn test_specific_card_and_random_card() {
        let catalog = CountingCatalog::new(sample_cards());
        let mut player = PlayerState::new(Uuid::new_v4());
        let intents = [
            RewardIntent::Card {
                card_id: Some("overclock".into()),
                rarity: None,
            },
            RewardIntent::Card {
                card_id: Some("ghost".into()),
                rarity: None,
            },
            RewardIntent::RandomCard {
                rarity: Some("rare".into()),
                card_type: Some("weapon".into()),
                element: None,
            },
        ];

        let results = run(&catalog, &mut player, &intents, &mut MockRng);

        assert!(results[0].success);
        assert!(!results[1].success);
        assert!(results[1].message.contains("ghost"));
        assert_eq!(results[2].cards[0].id, "frost-cannon");
        assert_eq!(player.collection().len(), 2);
    }

    #[test]
    fn test_equipment_auto_equips_into_slot() {
        // Arrange
        let catalog = CountingCatalog::new(sample_cards());
        let mut player = PlayerState::new(Uuid::new_v4());
        let equip = |card_id: &str| RewardIntent::Equipment {
            card_id: card_id.into(),
            slot: Some("arm".into()),
            auto_equip: true,
        };

        // Act
        let results = run(
            &catalog,
            &mut player,
            &[equip("laser-lance"), equip("frost-cannon")],
            &mut MockRng,
        );

        // Assert
        assert!(results.iter().all(|r| r.success));
        assert_eq!(player.equipment()["arm"].id, "frost-cannon");
        assert_eq!(player.collection()[0].id, "laser-lance");
    }

    #[test]
    fn test_equipment_without_auto_equip_goes_to_collection() {
        let catalog = CountingCatalog::new(sample_cards());
        let mut player = PlayerState::new(Uuid::new_v4());
        let intent = RewardIntent::Equipment {
            card_id: "plasma-shield".into(),
            slot: Some("core".into()),
            auto_equip: false,
        };

        run(&catalog, &mut player, &[intent], &mut MockRng);

        assert!(player.equipment().is_empty());
        assert_eq!(player.collection()[0].id, "plasma-shield");
    }

    #[test]
    fn test_currency_stat_boost_and_unlock() {
        // Arrange
        let catalog = CountingCatalog::new(Vec::new());
        let mut player = PlayerState::new(Uuid::new_v4());
        let intents = [
            RewardIntent::Currency {
                currency: "credits".into(),
                amount: 40,
            },
            RewardIntent::Currency {
                currency: "credits".into(),
                amount: 0,
            },
            RewardIntent::StatBoost {
                stat: "armor".into(),
                value: -1,
                duration: None,
            },
            RewardIntent::Unlock {
                feature: "arena".into(),
                unlock_type: "mode".into(),
            },
        ];

        // Act
        let results = run(&catalog, &mut player, &intents, &mut MockRng);

        // Assert
        let outcomes: Vec<bool> = results.iter().map(|r| r.success).collect();
        assert_eq!(outcomes, vec![true, false, true, true]);
        assert_eq!(player.currencies()["credits"], 40);
        assert_eq!(player.stat_modifier_total("armor"), -1);
        assert_eq!(player.unlocks()[0].unlocked_at, fixed_now());
        assert_eq!(results[2].reward_type, "stat_boost");
    }

    #[test]
    fn test_ledger_entry_only_for_successes() {
        // Arrange
        let user_id = Uuid::new_v4();
        let catalog = CountingCatalog::new(sample_cards());
        let mut player = PlayerState::new(user_id);
        let intents = [
            RewardIntent::Card {
                card_id: Some("overclock".into()),
                rarity: None,
            },
            RewardIntent::Currency {
                currency: "credits".into(),
                amount: -1,
            },
        ];
        let results = run(&catalog, &mut player, &intents, &mut MockRng);

        // Act
        let entries: Vec<RewardLedgerEntry> = results
            .iter()
            .filter_map(|r| ledger_entry(user_id, "hangar", r, fixed_now()))
            .collect();

        // Assert
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.reward_type, "card");
        assert_eq!(entry.status, RewardStatus::Granted);
        assert_eq!(entry.payload["cardIds"][0], "overclock");
        assert_eq!(entry.dedupe_key.len(), 64);
    }

    #[test]
    fn test_dedupe_key_is_stable_per_user_story_and_payload() {
        let user_id = Uuid::new_v4();
        let payload = serde_json::json!({"type": "unlock", "feature": "arena"});

        let a = dedupe_key(user_id, "hangar", &payload);
        let b = dedupe_key(user_id, "hangar", &payload);
        let c = dedupe_key(user_id, "dock", &payload);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
