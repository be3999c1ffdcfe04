//! Builds `next`/`previous` links for paginated responses.

use axum::http::Uri;
use foodgram_domain::pagination::{Page, PageRequest};

/// Assemble a [`Page`] for `results`, deriving links from the request URI.
pub fn paginate<T>(uri: &Uri, request: PageRequest, count: u64, results: Vec<T>) -> Page<T> {
    let next = request
        .has_next(count)
        .then(|| page_link(uri, request.page + 1));
    let previous = request
        .has_previous()
        .then(|| page_link(uri, request.page - 1));
    Page {
        count,
        next,
        previous,
        results,
    }
}

/// Rewrite `uri` so its `page` query parameter equals `page`, keeping every
/// other parameter in its original order.
pub fn page_link(uri: &Uri, page: u32) -> String {
    let mut pairs: Vec<String> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some("page"))
        .map(str::to_owned)
        .collect();
    pairs.push(format!("page={page}"));
    format!("{}?{}", uri.path(), pairs.join("&"))
}
