//! Per-source item extraction from search-result pages.
//!
//! Each storefront implements [`SiteExtractor`]: how to find candidate item
//! nodes, and how to turn one node into an [`Item`]. [`extract_items`] drives
//! the batch, applying the request's filters as it goes so that only
//! qualifying items count toward the result limit.

pub mod amazon;
pub mod details;
pub mod flipkart;

use std::collections::HashSet;

use dealscout_core::{ExtractionRequest, Item, Source};
use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::error::ScraperError;
use crate::filter::{ItemFilter, Rejection};

pub use amazon::AmazonExtractor;
pub use flipkart::FlipkartExtractor;

/// Why a candidate node produced no item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingId,
    MissingTitle,
    Sponsored,
}

/// Outcome of parsing one candidate node.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Item(Box<Item>),
    Skip(SkipReason),
}

/// Storefront-specific markup knowledge.
pub trait SiteExtractor: Send + Sync {
    fn source(&self) -> Source;

    /// Candidate item nodes, with the name of the strategy that found them.
    fn candidate_nodes<'a>(&self, document: &'a Html) -> (Option<&'static str>, Vec<ElementRef<'a>>);

    /// Parses one candidate node. `base` resolves relative links.
    ///
    /// # Errors
    ///
    /// Returns an error when the node is malformed in a way that should be
    /// recorded as a per-item failure rather than a skip.
    fn parse_node(&self, node: &ElementRef<'_>, base: &Url) -> Result<Candidate, ScraperError>;
}

/// Returns the extractor for `source`.
#[must_use]
pub fn extractor_for(source: Source) -> &'static dyn SiteExtractor {
    match source {
        Source::Amazon => &AmazonExtractor,
        Source::Flipkart => &FlipkartExtractor,
    }
}

/// Per-source counters logged after every extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionDiagnostics {
    pub node_strategy: Option<&'static str>,
    pub node_count: usize,
    pub processed: usize,
    pub skipped_no_id: usize,
    pub skipped_no_title: usize,
    pub skipped_sponsored: usize,
    pub skipped_price_filter: usize,
    pub skipped_rating_filter: usize,
    pub skipped_duplicate: usize,
    pub failed: Vec<String>,
}

impl ExtractionDiagnostics {
    pub fn log(&self, source: Source, kept: usize) {
        tracing::info!(
            source = %source,
            strategy = self.node_strategy.unwrap_or("none"),
            nodes = self.node_count,
            processed = self.processed,
            kept,
            no_id = self.skipped_no_id,
            no_title = self.skipped_no_title,
            sponsored = self.skipped_sponsored,
            price_filtered = self.skipped_price_filter,
            rating_filtered = self.skipped_rating_filter,
            duplicates = self.skipped_duplicate,
            failed = self.failed.len(),
            "extraction finished"
        );
        for failure in &self.failed {
            tracing::debug!(source = %source, error = %failure, "item extraction failed");
        }
    }
}

/// Items recovered from one page plus what happened to the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub items: Vec<Item>,
    pub diagnostics: ExtractionDiagnostics,
}

/// Extracts up to `request.limit` qualifying items from `html`.
///
/// Sponsored nodes, filtered-out items and duplicates never take a slot.
/// A node that fails to parse is recorded and the batch continues.
#[must_use]
pub fn extract_items(
    site: &dyn SiteExtractor,
    html: &str,
    base: &Url,
    request: &ExtractionRequest,
) -> Extraction {
    let document = Html::parse_document(html);
    let filter = ItemFilter::from_request(request);
    let (node_strategy, nodes) = site.candidate_nodes(&document);

    let mut diagnostics = ExtractionDiagnostics {
        node_strategy,
        node_count: nodes.len(),
        ..ExtractionDiagnostics::default()
    };
    let mut items = Vec::new();
    let mut seen = HashSet::new();

    for (index, node) in nodes.iter().enumerate() {
        if items.len() >= request.limit {
            break;
        }
        diagnostics.processed += 1;

        let item = match site.parse_node(node, base) {
            Ok(Candidate::Item(item)) => *item,
            Ok(Candidate::Skip(SkipReason::MissingId)) => {
                diagnostics.skipped_no_id += 1;
                continue;
            }
            Ok(Candidate::Skip(SkipReason::MissingTitle)) => {
                diagnostics.skipped_no_title += 1;
                continue;
            }
            Ok(Candidate::Skip(SkipReason::Sponsored)) => {
                diagnostics.skipped_sponsored += 1;
                continue;
            }
            Err(e) => {
                diagnostics.failed.push(format!("node {index}: {e}"));
                continue;
            }
        };

        match filter.check(&item) {
            Ok(()) => {}
            Err(Rejection::Price) => {
                diagnostics.skipped_price_filter += 1;
                continue;
            }
            Err(Rejection::Rating) => {
                diagnostics.skipped_rating_filter += 1;
                continue;
            }
        }

        if !seen.insert(item.id.clone()) {
            diagnostics.skipped_duplicate += 1;
            continue;
        }

        items.push(item);
    }

    Extraction { items, diagnostics }
}

/// Resolves a possibly-relative `href` against the storefront origin.
pub(crate) fn resolve_url(base: &Url, href: &str, site: Source) -> Result<String, ScraperError> {
    base.join(href.trim())
        .map(String::from)
        .map_err(|e| ScraperError::Extraction {
            site,
            reason: format!("unresolvable link \"{href}\": {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealscout_core::ExtractionDefaults;

    /// Test extractor: every `li` is a node; `data-id`, text and `data-price`
    /// map straight onto the item; `data-broken` fails the node.
    struct ListExtractor;

    impl SiteExtractor for ListExtractor {
        fn source(&self) -> Source {
            Source::Amazon
        }

        fn candidate_nodes<'a>(
            &self,
            document: &'a Html,
        ) -> (Option<&'static str>, Vec<ElementRef<'a>>) {
            (
                Some("li"),
                document.select(crate::strategy::selector!("li")).collect(),
            )
        }

        fn parse_node(&self, node: &ElementRef<'_>, _base: &Url) -> Result<Candidate, ScraperError> {
            let attrs = node.value();
            if attrs.attr("data-broken").is_some() {
                return Err(ScraperError::Extraction {
                    site: Source::Amazon,
                    reason: "broken node".to_owned(),
                });
            }
            if attrs.attr("data-ad").is_some() {
                return Ok(Candidate::Skip(SkipReason::Sponsored));
            }
            let Some(id) = attrs.attr("data-id") else {
                return Ok(Candidate::Skip(SkipReason::MissingId));
            };
            let mut item = Item::new(Source::Amazon, id, crate::strategy::text_of(node));
            item.price = attrs.attr("data-price").and_then(|p| p.parse().ok());
            Ok(Candidate::Item(Box::new(item)))
        }
    }

    fn base() -> Url {
        Url::parse("https://www.amazon.in/").expect("base url")
    }

    fn request(limit: usize) -> ExtractionRequest {
        let mut request = ExtractionRequest::new("mouse", &ExtractionDefaults::default());
        request.limit = limit;
        request
    }

    #[test]
    fn broken_node_does_not_abort_batch() {
        let html = r#"<ul>
            <li data-id="A">Alpha</li>
            <li data-broken="1" data-id="B">Beta</li>
            <li data-id="C">Gamma</li>
        </ul>"#;
        let out = extract_items(&ListExtractor, html, &base(), &request(5));
        let ids: Vec<_> = out.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["A", "C"]);
        assert_eq!(out.diagnostics.failed.len(), 1);
        assert!(out.diagnostics.failed[0].contains("broken node"));
    }

    #[test]
    fn skipped_nodes_do_not_consume_limit() {
        let html = r#"<ul>
            <li data-ad="1" data-id="AD">Sponsored</li>
            <li>No id</li>
            <li data-id="A" data-price="500">Alpha</li>
            <li data-id="B" data-price="5000">Beta</li>
            <li data-id="A" data-price="600">Alpha again</li>
            <li data-id="C" data-price="900">Gamma</li>
            <li data-id="D" data-price="950">Delta</li>
        </ul>"#;
        let mut req = request(2);
        req.max_price = Some(1_000.0);

        let out = extract_items(&ListExtractor, html, &base(), &req);
        let ids: Vec<_> = out.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["A", "C"]);

        let d = out.diagnostics;
        assert_eq!(d.node_strategy, Some("li"));
        assert_eq!(d.node_count, 7);
        assert_eq!(d.skipped_sponsored, 1);
        assert_eq!(d.skipped_no_id, 1);
        assert_eq!(d.skipped_price_filter, 1);
        assert_eq!(d.skipped_duplicate, 1);
        assert_eq!(d.processed, 6, "stops once the limit is reached");
    }

    #[test]
    fn empty_page_yields_no_items() {
        let out = extract_items(&ListExtractor, "<html></html>", &base(), &request(5));
        assert!(out.items.is_empty());
        assert_eq!(out.diagnostics.node_count, 0);
    }

    #[test]
    fn resolve_url_joins_relative_paths() {
        assert_eq!(
            resolve_url(&base(), "/dp/B0TEST", Source::Amazon).expect("resolved"),
            "https://www.amazon.in/dp/B0TEST"
        );
        assert_eq!(
            resolve_url(&base(), "https://other.example/x", Source::Amazon).expect("resolved"),
            "https://other.example/x"
        );
    }
}
