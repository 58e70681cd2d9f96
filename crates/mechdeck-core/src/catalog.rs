//! Card catalog contract.
//!
//! Card definitions are owned by the card editor, not by this engine. The
//! reward processor only needs to look cards up, so the catalog is a
//! read-only trait here and concrete catalogs live with their data source.

use serde::{Deserialize, Serialize};

/// A card definition as published by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Card type, e.g. `weapon`, `armor`, `spell`.
    #[serde(rename = "type")]
    pub card_type: String,
    /// Rarity tier, e.g. `common`, `rare`.
    pub rarity: String,
    /// Elemental affinity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    /// Base damage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    /// Energy cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i32>,
    /// Flavor or rules text.
    #[serde(default)]
    pub description: String,
}

/// Optional rarity/type/element constraints for a random draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    /// Required rarity.
    pub rarity: Option<String>,
    /// Required card type.
    pub card_type: Option<String>,
    /// Required element.
    pub element: Option<String>,
}

impl CardFilter {
    /// Filter on rarity only.
    #[must_use]
    pub fn rarity(rarity: impl Into<String>) -> Self {
        Self {
            rarity: Some(rarity.into()),
            ..Self::default()
        }
    }

    /// Returns a copy constrained to `rarity`.
    #[must_use]
    pub fn with_rarity(&self, rarity: impl Into<String>) -> Self {
        Self {
            rarity: Some(rarity.into()),
            ..self.clone()
        }
    }

    /// Whether `card` satisfies every constraint (case-insensitive).
    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        fn same(want: Option<&String>, have: Option<&str>) -> bool {
            match want {
                None => true,
                Some(want) => have.is_some_and(|have| have.eq_ignore_ascii_case(want)),
            }
        }

        same(self.rarity.as_ref(), Some(card.rarity.as_str()))
            && same(self.card_type.as_ref(), Some(card.card_type.as_str()))
            && same(self.element.as_ref(), card.element.as_deref())
    }
}

/// Read-only card lookup.
pub trait CardCatalog: Send + Sync {
    /// Looks up a single card.
    fn card_by_id(&self, id: &str) -> Option<Card>;

    /// Returns every card in the catalog.
    fn all_cards(&self) -> Vec<Card>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(rarity: &str, card_type: &str, element: Option<&str>) -> Card {
        Card {
            id: "c".into(),
            name: "Test".into(),
            card_type: card_type.into(),
            rarity: rarity.into(),
            element: element.map(str::to_owned),
            damage: None,
            cost: None,
            description: String::new(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(CardFilter::default().matches(&card("common", "weapon", None)));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filter = CardFilter::rarity("RARE");
        assert!(filter.matches(&card("rare", "weapon", None)));
        assert!(!filter.matches(&card("common", "weapon", None)));
    }

    #[test]
    fn test_element_filter_rejects_cards_without_element() {
        let filter = CardFilter {
            element: Some("fire".into()),
            ..CardFilter::default()
        };
        assert!(filter.matches(&card("common", "spell", Some("Fire"))));
        assert!(!filter.matches(&card("common", "spell", None)));
    }

    #[test]
    fn test_card_type_serializes_as_type() {
        let json = serde_json::to_value(card("rare", "armor", None)).unwrap();
        assert_eq!(json["type"], "armor");
        assert!(json.get("element").is_none());
    }
}
