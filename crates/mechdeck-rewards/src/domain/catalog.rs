//! Card catalog backed by a JSON array of cards.

use std::path::Path;

use mechdeck_core::catalog::{Card, CardCatalog};
use mechdeck_core::error::DomainError;

/// An immutable catalog loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct JsonCardCatalog {
    cards: Vec<Card>,
}

impl JsonCardCatalog {
    /// Builds a catalog from an in-memory card list.
    #[must_use]
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Parses a JSON array of cards.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Parse` if the JSON is not an array of cards.
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let cards: Vec<Card> = serde_json::from_str(raw)
            .map_err(|e| DomainError::Parse(format!("card catalog: {e}")))?;
        Ok(Self::new(cards))
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the file cannot be read and
    /// `DomainError::Parse` if it is not a valid card array.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Infrastructure(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True when the catalog holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardCatalog for JsonCardCatalog {
    fn card_by_id(&self, id: &str) -> Option<Card> {
        self.cards.iter().find(|card| card.id == id).cloned()
    }

    fn all_cards(&self) -> Vec<Card> {
        self.cards.clone()
    }
}
