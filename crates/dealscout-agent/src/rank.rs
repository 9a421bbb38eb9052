//! Deal scoring and ranking over the merged item set.

use std::cmp::Ordering;

use dealscout_core::Item;

const DISCOUNT_WEIGHT: f64 = 0.6;
const RATING_WEIGHT: f64 = 8.0;
/// How many of the top-ranked items may carry the best-deal flag.
pub const BEST_DEAL_SLOTS: usize = 3;
/// A top-ranked item needs a score above this to be flagged.
pub const BEST_DEAL_MIN_SCORE: f64 = 10.0;

/// `discount * 0.6 + rating * 8`, with missing values counted as zero.
#[must_use]
pub fn deal_score(item: &Item) -> f64 {
    item.discount_percent.unwrap_or(0.0) * DISCOUNT_WEIGHT
        + item.rating.unwrap_or(0.0) * RATING_WEIGHT
}

/// Scores every item, sorts by descending score (ties keep input order),
/// and flags best deals among the top three.
#[must_use]
pub fn rank_items(mut items: Vec<Item>) -> Vec<Item> {
    for item in &mut items {
        item.deal_score = Some(deal_score(item));
        item.is_best_deal = false;
    }

    items.sort_by(|a, b| {
        let (a, b) = (a.deal_score.unwrap_or(0.0), b.deal_score.unwrap_or(0.0));
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });

    for item in items.iter_mut().take(BEST_DEAL_SLOTS) {
        item.is_best_deal = item.deal_score.is_some_and(|s| s > BEST_DEAL_MIN_SCORE);
    }
    items
}
