//! Extraction request shape and the defaults that fill it in.

use serde::{Deserialize, Serialize};

use crate::items::Source;
use crate::CoreError;

/// Which storefronts a request targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSelector {
    #[default]
    All,
    Amazon,
    Flipkart,
}

impl SourceSelector {
    #[must_use]
    pub fn sources(self) -> Vec<Source> {
        match self {
            SourceSelector::All => Source::ALL.to_vec(),
            SourceSelector::Amazon => vec![Source::Amazon],
            SourceSelector::Flipkart => vec![Source::Flipkart],
        }
    }
}

/// Request-independent defaults for extraction.
///
/// Constructed once (usually via [`ExtractionDefaults::default`]) and passed to
/// every place that resolves a caller-supplied request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionDefaults {
    /// Per-source result limit when the caller gives none.
    pub limit: usize,
    /// Floor applied to every per-source limit so the ranker always has
    /// candidates to choose from, however small the caller's limit.
    pub min_limit: usize,
    /// Ceiling applied to every per-source limit.
    pub max_limit: usize,
    pub min_price: f64,
    pub max_price: Option<f64>,
    pub min_rating: f64,
}

impl Default for ExtractionDefaults {
    fn default() -> Self {
        Self {
            limit: 5,
            min_limit: 5,
            max_limit: 20,
            min_price: 0.0,
            max_price: None,
            min_rating: 0.0,
        }
    }
}

impl ExtractionDefaults {
    /// Resolves a caller-requested per-source limit into `[min_limit, max_limit]`.
    #[must_use]
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.limit)
            .clamp(self.min_limit, self.max_limit.max(self.min_limit))
    }
}

/// Arguments of one `product-scraper` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub search: String,
    pub limit: usize,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub platform: SourceSelector,
}

impl ExtractionRequest {
    /// A request for `search` with every other field taken from `defaults`.
    #[must_use]
    pub fn new(search: impl Into<String>, defaults: &ExtractionDefaults) -> Self {
        Self {
            search: search.into(),
            limit: defaults.resolve_limit(None),
            min_price: Some(defaults.min_price),
            max_price: defaults.max_price,
            min_rating: Some(defaults.min_rating),
            platform: SourceSelector::All,
        }
    }

    /// # Errors
    ///
    /// Returns [`CoreError::EmptySearchTerm`] when the search term is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.search.trim().is_empty() {
            return Err(CoreError::EmptySearchTerm);
        }
        Ok(())
    }

    /// Lower price bound, if one was actually requested (zero means none).
    #[must_use]
    pub fn min_price_bound(&self) -> Option<f64> {
        self.min_price.filter(|p| p.is_finite() && *p > 0.0)
    }

    /// Upper price bound, if one was actually requested.
    #[must_use]
    pub fn max_price_bound(&self) -> Option<f64> {
        self.max_price.filter(|p| p.is_finite())
    }

    /// Rating floor, if one was actually requested (zero means none).
    #[must_use]
    pub fn rating_floor(&self) -> Option<f64> {
        self.min_rating.filter(|r| r.is_finite() && *r > 0.0)
    }
}
