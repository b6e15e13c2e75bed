use super::types::{LinkError, NormalizedUrl};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

const DEFAULT_SCHEME: &str = "https";

static SCHEME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").unwrap());

/// Turn user-supplied text into an absolute URL.
///
/// Missing schemes default to https, the host is lowercased and any fragment
/// is dropped. Path and query are kept as given.
pub fn normalize(raw: &str) -> Result<NormalizedUrl, LinkError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LinkError::InvalidUrl(raw.to_string()));
    }

    let candidate = if SCHEME_REGEX.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, trimmed)
    };

    let mut url = Url::parse(&candidate).map_err(|_| LinkError::InvalidUrl(raw.to_string()))?;

    if url.host_str().map_or(true, str::is_empty) {
        url = promote_path_to_host(&url).ok_or_else(|| LinkError::InvalidUrl(raw.to_string()))?;
    }

    if let Some(host) = url.host_str() {
        let lower = host.to_lowercase();
        if lower != host {
            url.set_host(Some(&lower))
                .map_err(|_| LinkError::InvalidUrl(raw.to_string()))?;
        }
    }

    NormalizedUrl::from_url(url).ok_or_else(|| LinkError::InvalidUrl(raw.to_string()))
}

/// `scheme:///example.com/video` style input: the first path segment is the host.
fn promote_path_to_host(url: &Url) -> Option<Url> {
    let path = url.path().trim_start_matches('/');
    if path.is_empty() {
        return None;
    }

    let (host, rest) = path.split_once('/').unwrap_or((path, ""));
    if host.is_empty() {
        return None;
    }

    let mut rebuilt = format!("{}://{}/{}", url.scheme(), host, rest);
    if let Some(query) = url.query() {
        rebuilt.push('?');
        rebuilt.push_str(query);
    }

    Url::parse(&rebuilt)
        .ok()
        .filter(|u| u.host_str().is_some_and(|h| !h.is_empty()))
}
