//! Amazon search-result markup.

use dealscout_core::{Item, Source};
use reqwest::Url;
use scraper::{ElementRef, Html};

use super::{resolve_url, Candidate, SiteExtractor, SkipReason};
use crate::error::ScraperError;
use crate::parse::{
    derive_discount, find_rupee_amount, is_deal, parse_amount, parse_digits, parse_rating,
    sane_price,
};
use crate::strategy::{
    first_match, first_nodes, has_match, select_attr, select_text, selector, text_of,
    FieldStrategy, NodeStrategy,
};

/// Titles shorter than this are layout fragments, not product names.
const MIN_TITLE_LEN: usize = 3;

pub struct AmazonExtractor;

// -----------------------------------------------------------------------
// candidate nodes
// -----------------------------------------------------------------------

fn search_result_nodes(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .select(selector!(r#"div[data-component-type="s-search-result"]"#))
        .collect()
}

fn asin_nodes(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .select(selector!("div[data-asin]"))
        .filter(|node| {
            node.value()
                .attr("data-asin")
                .is_some_and(|asin| !asin.trim().is_empty())
        })
        .collect()
}

fn result_item_nodes(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .select(selector!(".s-result-item[data-asin]"))
        .collect()
}

const NODE_STRATEGIES: &[(&str, NodeStrategy)] = &[
    ("search-result", search_result_nodes),
    ("data-asin", asin_nodes),
    ("result-item", result_item_nodes),
];

// -----------------------------------------------------------------------
// fields
// -----------------------------------------------------------------------

fn title_from_heading(node: &ElementRef<'_>) -> Option<String> {
    select_text(node, selector!("h2"))
}

fn title_from_text_classes(node: &ElementRef<'_>) -> Option<String> {
    select_text(
        node,
        selector!(".a-size-medium, .a-size-base-plus, .a-text-normal, [class*='title']"),
    )
}

const TITLE: &[FieldStrategy<String>] = &[title_from_heading, title_from_text_classes];

fn link_href(node: &ElementRef<'_>) -> Option<String> {
    select_attr(node, selector!("a[href*='/dp/'], a[href*='/gp/'], h2 a"), "href")
}

fn image_src(node: &ElementRef<'_>) -> Option<String> {
    select_attr(node, selector!("img[src*='images-amazon'], img.s-image"), "src")
}

fn image_lazy_src(node: &ElementRef<'_>) -> Option<String> {
    select_attr(node, selector!("img.s-image"), "data-src")
}

const IMAGE: &[FieldStrategy<String>] = &[image_src, image_lazy_src];

fn price_whole(node: &ElementRef<'_>) -> Option<f64> {
    select_text(node, selector!(".a-price:not(.a-text-price) .a-price-whole"))
        .and_then(|text| parse_digits(&text))
        .and_then(sane_price)
}

fn price_offscreen(node: &ElementRef<'_>) -> Option<f64> {
    select_text(node, selector!(".a-price:not(.a-text-price) .a-offscreen"))
        .filter(|text| text.contains('₹'))
        .and_then(|text| parse_amount(&text))
        .and_then(sane_price)
}

fn price_in_text(node: &ElementRef<'_>) -> Option<f64> {
    find_rupee_amount(&text_of(node)).and_then(sane_price)
}

const PRICE: &[FieldStrategy<f64>] = &[price_whole, price_offscreen, price_in_text];

fn list_price(node: &ElementRef<'_>) -> Option<f64> {
    select_text(node, selector!(".a-price.a-text-price .a-offscreen, .a-text-strike"))
        .filter(|text| text.contains('₹'))
        .and_then(|text| parse_amount(&text))
        .and_then(sane_price)
}

fn rating_from_text(node: &ElementRef<'_>) -> Option<f64> {
    select_text(node, selector!(".a-icon-alt, i.a-icon-star"))
        .and_then(|text| parse_rating(&text))
}

fn rating_from_label(node: &ElementRef<'_>) -> Option<f64> {
    select_attr(node, selector!("[aria-label*='stars']"), "aria-label")
        .and_then(|label| parse_rating(&label))
}

const RATING: &[FieldStrategy<f64>] = &[rating_from_text, rating_from_label];

fn is_sponsored(node: &ElementRef<'_>) -> bool {
    node.value().attr("data-component-type") == Some("s-sponsored-result")
        || has_match(
            node,
            selector!(
                r#"[data-component-type="s-sponsored-result"], .s-sponsored-label-info-icon, .puis-sponsored-label-text"#
            ),
        )
}

impl SiteExtractor for AmazonExtractor {
    fn source(&self) -> Source {
        Source::Amazon
    }

    fn candidate_nodes<'a>(&self, document: &'a Html) -> (Option<&'static str>, Vec<ElementRef<'a>>) {
        first_nodes(document, NODE_STRATEGIES)
    }

    fn parse_node(&self, node: &ElementRef<'_>, base: &Url) -> Result<Candidate, ScraperError> {
        let Some(asin) = node
            .value()
            .attr("data-asin")
            .map(str::trim)
            .filter(|asin| !asin.is_empty())
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

        let mut item = Item::new(Source::Amazon, asin, title);
        if let Some(href) = link_href(node) {
            item.url = resolve_url(base, &href, Source::Amazon)?;
        }
        item.image = first_match(node, IMAGE);
        item.price = first_match(node, PRICE);
        item.original_price = list_price(node);
        item.rating = first_match(node, RATING);
        item.discount_percent = derive_discount(item.original_price, item.price);
        item.is_deal = is_deal(item.discount_percent, has_match(node, selector!(".a-badge-text")));

        Ok(Candidate::Item(Box::new(item)))
    }
}
