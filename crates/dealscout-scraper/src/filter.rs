//! Price / rating filtering and deduplication of scraped items.

use std::collections::HashSet;

use dealscout_core::{ExtractionRequest, Item, Source};

/// Why an item failed the request's constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Price,
    Rating,
}

/// Price and rating constraints resolved from an [`ExtractionRequest`].
///
/// A bound of `None` means the caller did not ask for it. Items with an
/// unknown price or rating only fail when the matching bound is active.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
}

impl ItemFilter {
    #[must_use]
    pub fn from_request(request: &ExtractionRequest) -> Self {
        Self {
            min_price: request.min_price_bound(),
            max_price: request.max_price_bound(),
            min_rating: request.rating_floor(),
        }
    }

    fn has_price_bound(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// Checks price first, then rating.
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] the item runs into.
    pub fn check(&self, item: &Item) -> Result<(), Rejection> {
        if self.has_price_bound() {
            let Some(price) = item.price else {
                return Err(Rejection::Price);
            };
            if self.min_price.is_some_and(|min| price < min)
                || self.max_price.is_some_and(|max| price > max)
            {
                return Err(Rejection::Price);
            }
        }

        if let Some(floor) = self.min_rating {
            match item.rating {
                Some(rating) if rating >= floor => {}
                _ => return Err(Rejection::Rating),
            }
        }

        Ok(())
    }
}

/// Drops repeat [`Item::key`]s; the first occurrence wins.
#[must_use]
pub fn dedup_items(items: Vec<Item>) -> Vec<Item> {
    let mut seen: HashSet<(Source, String)> = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let (source, id) = item.key();
            seen.insert((source, id.to_owned()))
        })
        .collect()
}
