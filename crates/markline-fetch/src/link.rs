//! `Link` header pagination
//!
//! The release endpoint paginates with cursor links:
//!
//! ```text
//! <https://host/...?cursor=100:-1:1>; rel="previous"; results="false"; cursor="100:-1:1",
//! <https://host/...?cursor=100:1:0>; rel="next"; results="true"; cursor="100:1:0"
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static LINK_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<([^>]*)>((?:\s*;\s*[A-Za-z_]+="[^"]*")*)"#).expect("link entry pattern")
});

static LINK_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z_]+)="([^"]*)""#).expect("link param pattern"));

/// One entry of a `Link` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Target URL
    pub url: String,
    /// Whether the target page has results
    pub results: bool,
    /// Cursor to request the target page
    pub cursor: Option<String>,
}

/// Parse a `Link` header into entries keyed by `rel`
#[must_use]
pub fn parse_link_header(header: &str) -> HashMap<String, PageLink> {
    let mut links = HashMap::new();
    for entry in LINK_ENTRY.captures_iter(header) {
        let url = entry.get(1).map_or("", |m| m.as_str()).to_string();
        let params: HashMap<&str, &str> = entry
            .get(2)
            .map(|m| {
                LINK_PARAM
                    .captures_iter(m.as_str())
                    .filter_map(|p| Some((p.get(1)?.as_str(), p.get(2)?.as_str())))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(rel) = params.get("rel") {
            links.insert(
                (*rel).to_string(),
                PageLink {
                    url,
                    results: params.get("results").is_some_and(|r| *r == "true"),
                    cursor: params.get("cursor").map(|c| (*c).to_string()),
                },
            );
        }
    }
    links
}

/// Cursor of the next page, if it has results
#[must_use]
pub fn next_cursor(header: &str) -> Option<String> {
    parse_link_header(header)
        .remove("next")
        .filter(|link| link.results)
        .and_then(|link| link.cursor)
}
