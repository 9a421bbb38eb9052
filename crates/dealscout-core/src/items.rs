//! Product records as they travel from the extractors to the API.
//!
//! Field names on the wire keep the storefront vocabulary the presentation
//! layer already consumes: the identifier serializes as `asin` and the source
//! tag as `platform`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A storefront the extractors know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Amazon,
    Flipkart,
}

impl Source {
    /// Every known source, in scrape order.
    pub const ALL: [Source; 2] = [Source::Amazon, Source::Flipkart];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Amazon => "amazon",
            Source::Flipkart => "flipkart",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amazon" => Ok(Source::Amazon),
            "flipkart" => Ok(Source::Flipkart),
            other => Err(CoreError::UnknownSource(other.to_owned())),
        }
    }
}

/// One scraped product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Site-scoped catalog identifier (ASIN on Amazon, `data-id` on Flipkart).
    #[serde(rename = "asin", alias = "id")]
    pub id: String,

    pub title: String,

    /// Absolute detail-page URL. Empty when no link could be recovered.
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub image: Option<String>,

    /// Current selling price in INR; `None` when unrecoverable.
    #[serde(default)]
    pub price: Option<f64>,

    /// List / MRP price in INR.
    #[serde(default)]
    pub original_price: Option<f64>,

    /// Star rating on a 0 to 5 scale.
    #[serde(default)]
    pub rating: Option<f64>,

    #[serde(rename = "platform")]
    pub source: Source,

    #[serde(default)]
    pub discount_percent: Option<f64>,

    #[serde(default)]
    pub is_deal: bool,

    /// Set by the ranker only.
    #[serde(default)]
    pub is_best_deal: bool,

    /// Set by the ranker only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_score: Option<f64>,
}

impl Item {
    /// Builds an item with only the required fields populated.
    #[must_use]
    pub fn new(source: Source, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: String::new(),
            image: None,
            price: None,
            original_price: None,
            rating: None,
            source,
            discount_percent: None,
            is_deal: false,
            is_best_deal: false,
            deal_score: None,
        }
    }

    /// Deduplication key: the same catalog id on two sources is two products.
    #[must_use]
    pub fn key(&self) -> (Source, &str) {
        (self.source, self.id.as_str())
    }
}

/// Qualitative per-item comparison produced by the inference capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonVerdict {
    #[serde(rename = "asin", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub best_for: String,
}

/// Feature bullets and description scraped from a product detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub features: Vec<String>,
    pub description: String,
}
