//! HTTP page loader shared by every source within one worker.
//!
//! One [`PageFetcher`] plays the role of a browser session: a single
//! connection pool and header profile, with each page load an independent
//! request so one source's failure never disturbs another's.

use std::time::Duration;

use dealscout_core::Source;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Lowercase markers that show up on interstitial bot-check pages.
const BLOCK_MARKERS: [&str; 3] = ["captcha", "robot check", "automated access"];

/// Loads storefront HTML with a desktop-browser header profile.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx responses
/// as typed errors. Transient errors are retried with exponential backoff up
/// to `max_retries` additional attempts.
pub struct PageFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PageFetcher {
    /// Creates a `PageFetcher` with a bounded page-load timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        page_timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(page_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(browser_headers())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches a page body, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status.
    /// - [`ScraperError::Http`]: network failure or timeout after all retries.
    pub async fn fetch_html(&self, url: &Url) -> Result<String, ScraperError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        domain: url.host_str().unwrap_or_default().to_owned(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                Ok(response.text().await?)
            }
        })
        .await?;

        if looks_blocked(&body) {
            tracing::warn!(url = %url, "page carries bot-check markers; results may be missing");
        }

        Ok(body)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        reqwest::header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers
}

/// Heuristic check for captcha / bot-wall interstitials.
#[must_use]
pub fn looks_blocked(body: &str) -> bool {
    let lower = body.to_lowercase();
    BLOCK_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Storefront origins, overridable so tests can point at a mock server.
#[derive(Debug, Clone)]
pub struct SourceEndpoints {
    pub amazon: String,
    pub flipkart: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            amazon: "https://www.amazon.in".to_owned(),
            flipkart: "https://www.flipkart.com".to_owned(),
        }
    }
}

impl SourceEndpoints {
    /// Parsed origin for `source`, used to resolve relative links.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] when the configured origin does not parse.
    pub fn base_url(&self, source: Source) -> Result<Url, ScraperError> {
        let raw = match source {
            Source::Amazon => &self.amazon,
            Source::Flipkart => &self.flipkart,
        };
        let normalised = format!("{}/", raw.trim_end_matches('/'));
        Url::parse(&normalised).map_err(|e| ScraperError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }

    /// Search-results page URL for `term` on `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] when the configured origin does not parse.
    pub fn search_url(&self, source: Source, term: &str) -> Result<Url, ScraperError> {
        let base = self.base_url(source)?;
        let (path, param) = match source {
            Source::Amazon => ("s", "k"),
            Source::Flipkart => ("search", "q"),
        };
        let mut url = base.join(path).map_err(|e| ScraperError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut().append_pair(param, term.trim());
        Ok(url)
    }
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
