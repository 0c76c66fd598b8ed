use crate::{UrlError, UrlResult};
use url::Url;

/// Query parameters that identify a campaign rather than a page
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Returns true for the schemes a fetch worker knows how to retrieve
pub fn is_crawlable_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https" | "file")
}

/// Normalizes a URL into the key used for deduplication
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http`, `https` and `file` schemes
/// 3. Require a host for `http`/`https` (the parser lowercases it)
/// 4. Empty path becomes `/`
/// 5. Remove the fragment
/// 6. Remove tracking query parameters, sort the rest by key
/// 7. Remove an empty query string
///
/// # Examples
///
/// ```
/// use sumi_index::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.com/a?utm_source=x#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/a");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_crawlable_scheme(url.scheme()) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.scheme() != "file" && url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    if url.path().is_empty() {
        url.set_path("/");
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let params = retained_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

fn retained_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
