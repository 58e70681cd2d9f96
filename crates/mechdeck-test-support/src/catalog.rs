//! Test catalog: a fixed card list that counts lookups.

use std::sync::atomic::{AtomicUsize, Ordering};

use mechdeck_core::catalog::{Card, CardCatalog};

/// A catalog over a fixed card list. Counts `all_cards` and `card_by_id`
/// calls so tests can assert how many times the resolver hit the catalog.
#[derive(Debug, Default)]
pub struct CountingCatalog {
    cards: Vec<Card>,
    all_cards_calls: AtomicUsize,
    by_id_calls: AtomicUsize,
}

impl CountingCatalog {
    /// Creates a catalog over `cards`.
    #[must_use]
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            ..Self::default()
        }
    }

    /// Number of `all_cards` calls so far.
    #[must_use]
    pub fn all_cards_calls(&self) -> usize {
        self.all_cards_calls.load(Ordering::SeqCst)
    }

    /// Number of `card_by_id` calls so far.
    #[must_use]
    pub fn by_id_calls(&self) -> usize {
        self.by_id_calls.load(Ordering::SeqCst)
    }
}

impl CardCatalog for CountingCatalog {
    fn card_by_id(&self, id: &str) -> Option<Card> {
        self.by_id_calls.fetch_add(1, Ordering::SeqCst);
        self.cards.iter().find(|c| c.id == id).cloned()
    }

    fn all_cards(&self) -> Vec<Card> {
        self.all_cards_calls.fetch_add(1, Ordering::SeqCst);
        self.cards.clone()
    }
}

/// Four cards covering two rarities, three types and two elements.
///
/// # Panics
///
/// Never; the literal JSON matches `Card`.
#[must_use]
pub fn sample_cards() -> Vec<Card> {
    serde_json::from_value(serde_json::json!([
        {
            "id": "laser-lance",
            "name": "Laser Lance",
            "type": "weapon",
            "rarity": "common",
            "element": "fire",
            "damage": 4,
            "cost": 2,
            "description": "A focused beam."
        },
        {
            "id": "plasma-shield",
            "name": "Plasma Shield",
            "type": "armor",
            "rarity": "common",
            "cost": 1,
            "description": "Absorbs the first hit."
        },
        {
            "id": "frost-cannon",
            "name": "Frost Cannon",
            "type": "weapon",
            "rarity": "rare",
            "element": "ice",
            "damage": 7,
            "cost": 4,
            "description": "Slows the target."
        },
        {
            "id": "overclock",
            "name": "Overclock",
            "type": "program",
            "rarity": "rare",
            "cost": 0,
            "description": "Draw two cards."
        }
    ]))
    .unwrap()
}
