//! Ordered fallback strategies for pulling one field out of a markup node.
//!
//! Every field an extractor recovers is described as a slice of independent
//! strategy functions, tried in order; the first `Some` wins. Site markup
//! churn then means editing one slice instead of a nested branch.

use scraper::{ElementRef, Html, Selector};

/// Recovers one field from a candidate node.
pub(crate) type FieldStrategy<T> = fn(&ElementRef<'_>) -> Option<T>;

/// Locates candidate item nodes in a whole document.
pub(crate) type NodeStrategy = for<'a> fn(&'a Html) -> Vec<ElementRef<'a>>;

/// Parses a CSS selector once and caches it for the life of the process.
macro_rules! selector {
    ($css:literal) => {{
        static SELECTOR: std::sync::LazyLock<scraper::Selector> = std::sync::LazyLock::new(|| {
            scraper::Selector::parse($css).expect(concat!("valid selector: ", $css))
        });
        &*SELECTOR
    }};
}
pub(crate) use selector;

/// Runs `strategies` in order against `node`, returning the first hit.
pub(crate) fn first_match<T>(node: &ElementRef<'_>, strategies: &[FieldStrategy<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy(node))
}

/// Runs node strategies in order, returning the name and nodes of the first
/// strategy that found anything.
pub(crate) fn first_nodes<'a>(
    document: &'a Html,
    strategies: &[(&'static str, NodeStrategy)],
) -> (Option<&'static str>, Vec<ElementRef<'a>>) {
    for &(name, strategy) in strategies {
        let nodes = strategy(document);
        if !nodes.is_empty() {
            return (Some(name), nodes);
        }
    }
    (None, Vec::new())
}

/// Whitespace-collapsed text content of an element.
pub(crate) fn text_of(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first descendant matching `selector`, if non-empty.
pub(crate) fn select_text(node: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    node.select(selector)
        .map(|el| text_of(&el))
        .find(|text| !text.is_empty())
}

/// Attribute value of the first descendant matching `selector` that carries it.
pub(crate) fn select_attr(node: &ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    node.select(selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

pub(crate) fn has_match(node: &ElementRef<'_>, selector: &Selector) -> bool {
    node.select(selector).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Html {
        Html::parse_fragment(
            r#"<div id="root">
                 <span class="a"></span>
                 <span class="a">  first
                   hit </span>
                 <img class="pic" data-src="/lazy.jpg">
                 <img class="pic" src="/eager.jpg">
               </div>"#,
        )
    }

    fn root(html: &Html) -> ElementRef<'_> {
        html.select(selector!("#root")).next().expect("root node")
    }

    #[test]
    fn select_text_skips_empty_matches_and_collapses_whitespace() {
        let html = doc();
        assert_eq!(
            select_text(&root(&html), selector!("span.a")).as_deref(),
            Some("first hit")
        );
    }

    #[test]
    fn select_attr_finds_first_element_with_attribute() {
        let html = doc();
        assert_eq!(
            select_attr(&root(&html), selector!("img.pic"), "src").as_deref(),
            Some("/eager.jpg")
        );
    }

    #[test]
    fn first_match_stops_at_first_hit() {
        fn missing(_: &ElementRef<'_>) -> Option<String> {
            None
        }
        fn lazy(node: &ElementRef<'_>) -> Option<String> {
            select_attr(node, selector!("img"), "data-src")
        }
        fn eager(node: &ElementRef<'_>) -> Option<String> {
            select_attr(node, selector!("img"), "src")
        }

        let html = doc();
        let strategies: &[FieldStrategy<String>] = &[missing, lazy, eager];
        assert_eq!(
            first_match(&root(&html), strategies).as_deref(),
            Some("/lazy.jpg")
        );
    }

    #[test]
    fn first_nodes_reports_winning_strategy() {
        fn none(_: &Html) -> Vec<ElementRef<'_>> {
            Vec::new()
        }
        fn spans(html: &Html) -> Vec<ElementRef<'_>> {
            html.select(selector!("span")).collect()
        }

        let html = doc();
        let strategies: &[(&'static str, NodeStrategy)] = &[("none", none), ("spans", spans)];
        let (name, nodes) = first_nodes(&html, strategies);
        assert_eq!(name, Some("spans"));
        assert_eq!(nodes.len(), 2);
    }
}
