//! Better-alternative selection and qualitative side-by-side comparison.

use std::cmp::Ordering;

use dealscout_core::{ComparisonVerdict, Item};
use serde::Serialize;

use crate::inference::Inference;
use crate::plan::parse_payload;

/// Most items sent for one qualitative comparison.
pub const MAX_COMPARED_ITEMS: usize = 3;

pub const COMPARISON_SYSTEM_PROMPT: &str = r#"You compare shopping products for a buyer in India.
For each product in the user's JSON list, reply with ONLY a JSON array (no prose) of:
{"asin": string, "pros": [string], "cons": [string], "bestFor": string}
Keep each pro and con under ten words. "bestFor" names the kind of buyer the product suits.
Use the same "asin" values you were given."#;

/// Picks a cheaper item that is rated at least as well as `reference`.
///
/// A candidate qualifies when it has a different id, a rating no lower than
/// the reference's, and a positive price strictly below the reference price.
/// The highest-rated qualifier wins; ties go to the lower price, then to the
/// earlier candidate. Missing ratings count as zero; a missing price never
/// qualifies.
#[must_use]
pub fn find_better_alternative<'a>(reference: &Item, candidates: &'a [Item]) -> Option<&'a Item> {
    let reference_price = reference.price?;
    let reference_rating = reference.rating.unwrap_or(0.0);

    candidates
        .iter()
        .filter(|c| c.id != reference.id)
        .filter(|c| c.rating.unwrap_or(0.0) >= reference_rating)
        .filter(|c| c.price.is_some_and(|p| p > 0.0 && p < reference_price))
        .fold(None, |best: Option<&Item>, candidate| match best {
            Some(best) if !outranks(candidate, best) => Some(best),
            _ => Some(candidate),
        })
}

/// Higher rating first, then lower price.
fn outranks(candidate: &Item, incumbent: &Item) -> bool {
    let rating = candidate
        .rating
        .unwrap_or(0.0)
        .partial_cmp(&incumbent.rating.unwrap_or(0.0))
        .unwrap_or(Ordering::Equal);
    match rating {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.price.unwrap_or(f64::MAX) < incumbent.price.unwrap_or(f64::MAX),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparedItem<'a> {
    asin: &'a str,
    title: &'a str,
    platform: &'a str,
    price: Option<f64>,
    original_price: Option<f64>,
    rating: Option<f64>,
    discount_percent: Option<f64>,
}

/// Asks `inference` for pros, cons and audience for up to three items.
///
/// Never fails: an inference error or an unreadable answer yields an empty
/// list. Verdicts for ids that were not submitted are dropped.
pub async fn compare_products<I: Inference>(inference: &I, items: &[Item]) -> Vec<ComparisonVerdict> {
    let compared: Vec<ComparedItem<'_>> = items
        .iter()
        .take(MAX_COMPARED_ITEMS)
        .map(|item| ComparedItem {
            asin: &item.id,
            title: &item.title,
            platform: item.source.as_str(),
            price: item.price,
            original_price: item.original_price,
            rating: item.rating,
            discount_percent: item.discount_percent,
        })
        .collect();
    if compared.is_empty() {
        return Vec::new();
    }

    let prompt = match serde_json::to_string(&compared) {
        Ok(prompt) => prompt,
        Err(e) => {
            tracing::warn!(error = %e, "could not encode comparison prompt");
            return Vec::new();
        }
    };

    let raw = match inference.complete(COMPARISON_SYSTEM_PROMPT, &prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "comparison inference failed");
            return Vec::new();
        }
    };

    let Some(verdicts) = parse_payload(&raw)
        .and_then(|payload| serde_json::from_value::<Vec<ComparisonVerdict>>(payload).ok())
    else {
        tracing::warn!(raw = %raw, "comparison output unreadable");
        return Vec::new();
    };

    verdicts
        .into_iter()
        .filter(|verdict| compared.iter().any(|item| item.asin == verdict.id))
        .collect()
}
