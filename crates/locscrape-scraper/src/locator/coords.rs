//! Geo-coordinate recovery for a listing container.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use super::document::{descendant_elements, non_empty_attr};

/// Google-Maps style `@lat,lng` pair inside a link.
static MAP_AT_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([-0-9.]+),([-0-9.]+)").expect("valid regex"));

/// Latitude/longitude as the exact strings found on the page.
pub(crate) type Coordinates = (String, String);

/// Recover coordinates for `container`.
///
/// The container's own `data-lat`/`data-lng` win when both are non-empty.
/// Otherwise the first descendant map link is inspected. Either way the
/// result is all-or-nothing: a lone latitude is never returned.
pub(crate) fn recover_coordinates(container: ElementRef<'_>) -> Option<Coordinates> {
    data_attribute_coordinates(container).or_else(|| map_link_coordinates(container))
}

fn data_attribute_coordinates(container: ElementRef<'_>) -> Option<Coordinates> {
    let lat = non_empty_attr(container, "data-lat")?;
    let lng = non_empty_attr(container, "data-lng")?;
    Some((lat.to_owned(), lng.to_owned()))
}

fn map_link_coordinates(container: ElementRef<'_>) -> Option<Coordinates> {
    let href = first_map_href(container)?;
    let Some(caps) = MAP_AT_PAIR_RE.captures(href) else {
        tracing::trace!(href, "map link has no @lat,lng pair");
        return None;
    };
    Some((caps[1].to_owned(), caps[2].to_owned()))
}

/// `href` of the first descendant anchor pointing at a maps service.
///
/// Only the first such anchor is considered, even if a later one would carry
/// coordinates.
fn first_map_href<'a>(container: ElementRef<'a>) -> Option<&'a str> {
    descendant_elements(container)
        .filter(|el| el.value().name() == "a")
        .find_map(|anchor| anchor.value().attr("href").filter(|h| h.contains("maps")))
}
