//! Multi-source search orchestration.

use dealscout_core::{AppConfig, ExtractionRequest, Item, ProductDetails, Source};
use futures::future::join_all;
use reqwest::Url;

use crate::error::ScraperError;
use crate::extract::details::extract_details;
use crate::extract::{extract_items, extractor_for};
use crate::fetch::{PageFetcher, SourceEndpoints};
use crate::filter::dedup_items;

/// Items from every source that answered, plus the ones that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub items: Vec<Item>,
    pub failed_sources: Vec<Source>,
}

/// Scrapes storefront search pages and product pages.
pub struct Scraper {
    fetcher: PageFetcher,
    endpoints: SourceEndpoints,
}

impl Scraper {
    #[must_use]
    pub fn new(fetcher: PageFetcher, endpoints: SourceEndpoints) -> Self {
        Self { fetcher, endpoints }
    }

    /// Builds a scraper from the page-load settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let fetcher = PageFetcher::new(
            config.page_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )?;
        let endpoints = SourceEndpoints {
            amazon: config.amazon_base_url.clone(),
            flipkart: config.flipkart_base_url.clone(),
        };
        Ok(Self::new(fetcher, endpoints))
    }

    /// Scrapes every source the request selects, concurrently.
    ///
    /// A source that fails is logged and left out; the call fails only when
    /// every selected source failed.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidRequest`] when the search term is blank.
    /// - [`ScraperError::AllSourcesFailed`] when no source produced a page.
    pub async fn search(&self, request: &ExtractionRequest) -> Result<SearchOutcome, ScraperError> {
        request.validate()?;

        let sources = request.platform.sources();
        let requested = sources.len();
        let results = join_all(
            sources
                .iter()
                .map(|&source| self.search_source(source, request)),
        )
        .await;

        let mut outcome = SearchOutcome::default();
        for (source, result) in sources.into_iter().zip(results) {
            match result {
                Ok(items) => outcome.items.extend(items),
                Err(e) => {
                    tracing::warn!(
                        source = %source,
                        search = %request.search,
                        error = %e,
                        "source extraction failed"
                    );
                    outcome.failed_sources.push(source);
                }
            }
        }

        if outcome.failed_sources.len() == requested {
            return Err(ScraperError::AllSourcesFailed {
                search: request.search.clone(),
            });
        }

        outcome.items = dedup_items(outcome.items);
        Ok(outcome)
    }

    async fn search_source(
        &self,
        source: Source,
        request: &ExtractionRequest,
    ) -> Result<Vec<Item>, ScraperError> {
        let url = self.endpoints.search_url(source, &request.search)?;
        let base = self.endpoints.base_url(source)?;
        tracing::debug!(source = %source, url = %url, "loading search page");

        let html = self.fetcher.fetch_html(&url).await?;
        let extraction = extract_items(extractor_for(source), &html, &base, request);
        extraction.diagnostics.log(source, extraction.items.len());
        Ok(extraction.items)
    }

    /// Loads a product page and pulls its feature list and description.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] for an unparsable URL, or any
    /// fetch error from [`PageFetcher::fetch_html`].
    pub async fn details(&self, url: &str, source: Source) -> Result<ProductDetails, ScraperError> {
        let parsed = Url::parse(url.trim()).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let html = self.fetcher.fetch_html(&parsed).await?;
        let details = extract_details(source, &html);
        tracing::debug!(
            source = %source,
            features = details.features.len(),
            has_description = !details.description.is_empty(),
            "product details extracted"
        );
        Ok(details)
    }
}
