//! Flipkart search-result markup.
//!
//! Flipkart ships obfuscated class names that rotate with every frontend
//! release, so each field lists the current class first and the previous
//! generations after it.

use std::collections::HashSet;

use dealscout_core::{Item, Source};
use reqwest::Url;
use scraper::{ElementRef, Html};

use super::{resolve_url, Candidate, SiteExtractor, SkipReason};
use crate::error::ScraperError;
use crate::parse::{
    derive_discount, find_rupee_amount, is_deal, parse_amount, parse_percent, parse_rating,
    sane_price,
};
use crate::strategy::{
    first_match, first_nodes, has_match, select_attr, select_text, selector, text_of,
    FieldStrategy, NodeStrategy,
};

const MIN_TITLE_LEN: usize = 3;
const AD_LABELS: [&str; 2] = ["Ad", "Sponsored"];

pub struct FlipkartExtractor;

fn data_id_nodes(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(selector!("div[data-id]")).collect()
}

/// Card bodies without a `div[data-id]` wrapper: climb to the nearest
/// ancestor that carries `data-id`.
fn card_ancestor_nodes(document: &Html) -> Vec<ElementRef<'_>> {
    let mut seen = HashSet::new();
    document
        .select(selector!(".RGLWAk"))
        .filter_map(|card| {
            card.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().attr("data-id").is_some())
        })
        .filter(|el| seen.insert(el.id()))
        .collect()
}

const NODE_STRATEGIES: &[(&str, NodeStrategy)] = &[
    ("data-id", data_id_nodes),
    ("card-ancestor", card_ancestor_nodes),
];

fn title_from_class(node: &ElementRef<'_>) -> Option<String> {
    select_text(
        node,
        selector!(".pIpigb, .KzDlHZ, ._4rR01T, .s1Q9rs, ._2WkVRV, .IRpwS_"),
    )
}

fn title_from_image_alt(node: &ElementRef<'_>) -> Option<String> {
    select_attr(node, selector!("img"), "alt")
}

const TITLE: &[FieldStrategy<String>] = &[title_from_class, title_from_image_alt];

fn price_from_class(node: &ElementRef<'_>) -> Option<f64> {
    select_text(node, selector!(".hZ3P6w, ._30jeq3, ._16Jk6d, .Nx9bqj"))
        .and_then(|text| parse_amount(&text))
        .and_then(sane_price)
}

fn price_in_text(node: &ElementRef<'_>) -> Option<f64> {
    find_rupee_amount(&text_of(node)).and_then(sane_price)
}

const PRICE: &[FieldStrategy<f64>] = &[price_from_class, price_in_text];

fn list_price(node: &ElementRef<'_>) -> Option<f64> {
    select_text(node, selector!(".yRaY8j, ._3I9_wc, ._2p6lqe"))
        .and_then(|text| parse_amount(&text))
        .and_then(sane_price)
}

fn rating(node: &ElementRef<'_>) -> Option<f64> {
    select_text(node, selector!(".CjyrHS, ._3LWZlK, .XQDdHH")).and_then(|text| parse_rating(&text))
}

fn discount_marker(node: &ElementRef<'_>) -> Option<f64> {
    node.select(selector!(
        r#".UkUFwK, ._3Ay6Sb, [class*="percent"], [class*="discount"]"#
    ))
    .find_map(|el| parse_percent(&text_of(&el)))
}

fn is_sponsored(node: &ElementRef<'_>) -> bool {
    has_match(node, selector!("[class*='sponsored'], [class*='Sponsored']"))
        || node
            .select(selector!("span, div"))
            .any(|el| AD_LABELS.contains(&text_of(&el).as_str()))
}

impl SiteExtractor for FlipkartExtractor {
    fn source(&self) -> Source {
        Source::Flipkart
    }

    fn candidate_nodes<'a>(&self, document: &'a Html) -> (Option<&'static str>, Vec<ElementRef<'a>>) {
        first_nodes(document, NODE_STRATEGIES)
    }

    fn parse_node(&self, node: &ElementRef<'_>, base: &Url) -> Result<Candidate, ScraperError> {
        let Some(id) = node
            .value()
            .attr("data-id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
        else {
            return Ok(Candidate::Skip(SkipReason::MissingId));
        };

        if is_sponsored(node) {
            return Ok(Candidate::Skip(SkipReason::Sponsored));
        }

        let Some(title) = first_match(node, TITLE).filter(|t| t.chars().count() >= MIN_TITLE_LEN)
        else {
            return Ok(Candidate::Skip(SkipReason::MissingTitle));
        };

        let mut item = Item::new(Source::Flipkart, id, title);
        if let Some(href) = select_attr(node, selector!("a[href]"), "href") {
            item.url = resolve_url(base, &href, Source::Flipkart)?;
        }
        item.image = select_attr(node, selector!("img"), "src");
        item.price = first_match(node, PRICE);
        item.original_price = list_price(node);
        item.rating = rating(node);
        item.discount_percent =
            discount_marker(node).or_else(|| derive_discount(item.original_price, item.price));
        item.is_deal = is_deal(item.discount_percent, false);

        Ok(Candidate::Item(Box::new(item)))
    }
}
