//! Thin adapter over the `scraper` (html5ever) node tree.
//!
//! Parsing follows the WHATWG tree-construction rules, so broken markup is
//! repaired rather than rejected. `Html` is `!Send`; keep it on one thread.

use scraper::{ElementRef, Html};

/// Parse a full HTML document. Never fails.
#[must_use]
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Every element in the document, in document order, starting at `<html>`.
pub(crate) fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
}

/// Every element below `element`, in document order, excluding `element` itself.
pub(crate) fn descendant_elements<'a>(
    element: ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Class tokens in attribute order. Empty when the attribute is missing or blank.
pub(crate) fn class_tokens<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    element
        .value()
        .attr("class")
        .map(|raw| raw.split_whitespace().collect())
        .unwrap_or_default()
}

/// Attribute value, treating an empty value as absent.
pub(crate) fn non_empty_attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|v| !v.is_empty())
}

/// Elements whose bodies are code or inert markup, not page text.
const NON_TEXT_CONTAINERS: [&str; 3] = ["script", "style", "template"];

/// Descendant text nodes in document order.
///
/// Text sitting directly inside a `script`, `style` or `template` below
/// `element` is skipped. Asked of such an element itself, its own body is
/// returned.
fn text_nodes<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    let root = element.id();
    element.descendants().filter_map(move |node| {
        let text = node.value().as_text()?;
        let parent = node.parent()?;
        let hidden = parent.id() != root
            && parent
                .value()
                .as_element()
                .is_some_and(|el| NON_TEXT_CONTAINERS.contains(&el.name()));
        if hidden {
            None
        } else {
            Some(&**text)
        }
    })
}

/// All descendant text nodes concatenated as-is.
pub(crate) fn raw_text(element: ElementRef<'_>) -> String {
    text_nodes(element).collect()
}

/// Descendant text nodes, each trimmed, empty ones dropped, joined with no separator.
pub(crate) fn stripped_text(element: ElementRef<'_>) -> String {
    text_nodes(element)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}
