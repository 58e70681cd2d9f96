//! Random card draws and weighted rarity rolls.

use mechdeck_core::catalog::{Card, CardCatalog, CardFilter};
use mechdeck_core::reward::RarityWeights;
use mechdeck_core::rng::DeterministicRng;

/// Rolls a rarity: a uniform integer in `[1, total]` walked against the
/// cumulative weights in authored order.
///
/// Returns `None` when every weight is zero.
pub fn roll_rarity(weights: &RarityWeights, rng: &mut dyn DeterministicRng) -> Option<String> {
    let total = weights.total();
    if total == 0 {
        return None;
    }
    let roll = rng.next_u32_range(1, total);
    weights.select(roll).map(str::to_owned)
}

/// Draws one card matching `filter`, uniformly among the matches.
///
/// Calls [`CardCatalog::all_cards`] exactly once.
pub fn draw_card(
    catalog: &dyn CardCatalog,
    filter: &CardFilter,
    rng: &mut dyn DeterministicRng,
) -> Option<Card> {
    let mut matches: Vec<Card> = catalog
        .all_cards()
        .into_iter()
        .filter(|card| filter.matches(card))
        .collect();
    let index = rng.pick_index(matches.len())?;
    Some(matches.swap_remove(index))
}
