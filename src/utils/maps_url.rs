//! Helpers for the Google Maps links found in saved-places exports.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const SEARCH_URL: &str = "http://maps.google.com/";

fn place_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"!1s(0x[0-9a-fA-F]+:0x[0-9a-fA-F]+)").expect("place ref pattern is valid")
    })
}

fn is_maps_url(url: &str) -> bool {
    url.contains("google.com/maps")
}

/// The `0x…:0x…` feature id embedded in a place URL's data segment.
pub fn place_ref_from_url(url: &str) -> Option<String> {
    if !is_maps_url(url) {
        return None;
    }
    place_ref_pattern()
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Decoded place name from `/maps/place/<name>/...`, e.g. `Westdam 59`.
pub fn place_name_from_url(url: &str) -> Option<String> {
    if !is_maps_url(url) || !url.contains("/place/") {
        return None;
    }

    let path = url.split('?').next().unwrap_or(url);
    let segment = path.rsplit("/place/").next()?.split("/data=").next()?;
    let segment = segment.split('/').next().unwrap_or(segment);
    if segment.is_empty() {
        return None;
    }

    let spaced = segment.replace('+', " ");
    let decoded = urlencoding::decode(&spaced)
        .map(|name| name.into_owned())
        .unwrap_or(spaced);
    let name = decoded.trim();

    (!name.is_empty()).then(|| name.to_string())
}

/// A search link for places that came without a URL.
pub fn search_url(title: &str) -> String {
    match Url::parse_with_params(SEARCH_URL, &[("q", title)]) {
        Ok(url) => url.to_string(),
        Err(_) => SEARCH_URL.to_string(),
    }
}
