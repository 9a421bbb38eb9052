//! Feature bullets and description from a single product page.

use dealscout_core::{ProductDetails, Source};
use scraper::{Html, Selector};

use crate::strategy::{selector, text_of};

fn texts(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|el| text_of(&el))
        .filter(|text| !text.is_empty())
        .collect()
}

fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .map(|el| text_of(&el))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Parses a detail page for `source`. Missing sections come back empty.
#[must_use]
pub fn extract_details(source: Source, html: &str) -> ProductDetails {
    let document = Html::parse_document(html);
    match source {
        Source::Amazon => ProductDetails {
            features: texts(&document, selector!("#feature-bullets li span.a-list-item")),
            description: first_text(&document, selector!("#productDescription")),
        },
        Source::Flipkart => {
            let mut features = texts(&document, selector!(r"div._2cM9lP div.yN\+eNk"));
            if features.is_empty() {
                features = texts(&document, selector!("div._2cM9lP li"));
            }
            ProductDetails {
                features,
                description: first_text(&document, selector!("div._1mXcCf")),
            }
        }
    }
}
