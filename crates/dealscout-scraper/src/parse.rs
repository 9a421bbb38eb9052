//! Text-to-number helpers for storefront price, rating and discount markup.
//!
//! Storefront text arrives in many shapes (`"₹2,999"`, `"2,999."`,
//! `"4.3 out of 5 stars"`, `"23% off"`). These helpers turn it into typed
//! values and discard anything outside plausible bounds so parsing artifacts
//! never reach the ranker.

use std::sync::LazyLock;

use regex::Regex;

/// Smallest price accepted as real (INR).
pub const MIN_PLAUSIBLE_PRICE: f64 = 1.0;
/// Largest price accepted as real (INR).
pub const MAX_PLAUSIBLE_PRICE: f64 = 10_000_000.0;
/// Discount above which an item counts as a deal without a badge.
pub const DEAL_DISCOUNT_THRESHOLD: f64 = 20.0;

static RUPEE_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"₹\s*([\d,]+(?:\.\d+)?)").expect("valid rupee regex"));
static OUT_OF_RATING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*out of").expect("valid rating regex"));
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("valid number regex"));
static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("valid percent regex"));

/// Keeps the value only if it is a plausible price.
#[must_use]
pub fn sane_price(price: f64) -> Option<f64> {
    (price.is_finite() && (MIN_PLAUSIBLE_PRICE..=MAX_PLAUSIBLE_PRICE).contains(&price))
        .then_some(price)
}

/// Parses a run of digits, ignoring every other character.
///
/// Suited to split-price markup where the whole-rupee part sits in its own
/// element (`"2,999."`).
#[must_use]
pub fn parse_digits(text: &str) -> Option<f64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}

/// Parses a price label such as `"₹2,999.00"` or `"2,999"`.
///
/// When the text carries a rupee sign, the first rupee-prefixed amount wins
/// so labels like `"₹2,999₹3,999"` do not fuse into one number.
#[must_use]
pub fn parse_amount(text: &str) -> Option<f64> {
    if let Some(amount) = find_rupee_amount(text) {
        return Some(amount);
    }
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// First rupee-prefixed amount anywhere in free text.
#[must_use]
pub fn find_rupee_amount(text: &str) -> Option<f64> {
    RUPEE_AMOUNT
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
}

/// Parses a star rating on the 0 to 5 scale.
///
/// Prefers the `"4.3 out of 5"` phrasing; otherwise takes the first number.
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    let captured = OUT_OF_RATING
        .captures(text)
        .or_else(|| FIRST_NUMBER.captures(text))?;
    let value = captured.get(1)?.as_str().parse::<f64>().ok()?;
    (0.0..=5.0).contains(&value).then_some(value)
}

/// Parses an explicit `"N% off"` marker.
#[must_use]
pub fn parse_percent(text: &str) -> Option<f64> {
    let value = PERCENT
        .captures(text)?
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()?;
    (0.0..=100.0).contains(&value).then_some(value)
}

/// Discount derived from list and sale price, rounded to a whole percent.
///
/// Only defined when the list price is strictly above the sale price.
#[must_use]
pub fn derive_discount(original: Option<f64>, sale: Option<f64>) -> Option<f64> {
    match (original, sale) {
        (Some(original), Some(sale)) if original > sale && sale > 0.0 => {
            Some(((original - sale) / original * 100.0).round())
        }
        _ => None,
    }
}

/// A deal is either badged by the storefront or discounted past the threshold.
#[must_use]
pub fn is_deal(discount_percent: Option<f64>, has_badge: bool) -> bool {
    has_badge || discount_percent.is_some_and(|d| d > DEAL_DISCOUNT_THRESHOLD)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
