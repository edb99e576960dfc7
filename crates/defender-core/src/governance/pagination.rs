//! RFC 5988 Link header construction.
//!
//! Relation order is part of the wire contract: `first, prev, last, next`,
//! each present only when it applies. The list is built in that order and
//! never sorted.

use url::Url;

use crate::domain::PageDescriptor;

/// Highest page number passed on to a fetcher.
pub const MAX_PAGE: u64 = 1_000_000;

/// Parse the `page` query value. Missing, malformed or zero means page 1;
/// anything above `MAX_PAGE` is clamped to it.
pub fn requested_page(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|page| *page >= 1)
        .map_or(1, |page| page.min(MAX_PAGE))
}

/// Builds navigation links for a listing URL.
#[derive(Debug, Clone)]
pub struct Paginator {
    per_page: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PageDescriptor::DEFAULT_PER_PAGE)
    }
}

impl Paginator {
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn describe(&self, current_page: u64, total_count: u64) -> PageDescriptor {
        PageDescriptor::new(current_page, self.per_page, total_count)
    }

    /// Link header value for `page`, or `None` when everything fits on one
    /// page.
    ///
    /// `base_url` is the request URL; its query parameters other than `page`
    /// are carried into every target.
    pub fn build_links(&self, base_url: &str, page: &PageDescriptor) -> Option<String> {
        let total_pages = page.total_pages();
        if total_pages <= 1 {
            return None;
        }

        let mut relations: Vec<(&str, u64)> = Vec::with_capacity(4);
        if page.has_previous() {
            relations.push(("first", 1));
            relations.push(("prev", page.current_page - 1));
        }
        if page.has_next() {
            relations.push(("last", total_pages));
            relations.push(("next", page.current_page + 1));
        }

        if relations.is_empty() {
            return None;
        }

        let links: Vec<String> = relations
            .into_iter()
            .map(|(rel, target)| format!("<{}>; rel=\"{}\"", page_url(base_url, target), rel))
            .collect();

        Some(links.join(", "))
    }
}

fn page_url(base_url: &str, page: u64) -> String {
    let Ok(mut url) = Url::parse(base_url) else {
        // Relative or otherwise unparsable: drop the query and append page.
        let path = base_url.split('?').next().unwrap_or(base_url);
        return format!("{path}?page={page}");
    };

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    url.set_fragment(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("page", &page.to_string());
    }

    url.into()
}
