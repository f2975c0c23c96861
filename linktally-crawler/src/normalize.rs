use crate::error::{CrawlError, Result};
use url::Url;

/// Reduce an absolute URL to its dedupe key: lowercased host + path, with
/// one trailing slash stripped. Scheme, query, and fragment never make it
/// into the key, so URLs a browser would treat as the same page collapse
/// to one entry.
pub fn normalize_url(url_str: &str) -> Result<String> {
    let parsed = Url::parse(url_str)
        .map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", url_str, e)))?;
    normalize_parsed(&parsed)
}

/// Same as [`normalize_url`] for callers already holding a parsed URL.
pub fn normalize_parsed(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| CrawlError::InvalidUrl(format!("no host in {}", url)))?;

    // Path case is preserved; many servers treat paths case-sensitively.
    let mut key = format!("{}{}", host.to_ascii_lowercase(), url.path());
    if key.ends_with('/') {
        key.pop();
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scheme() {
        let key = normalize_url("https://example.com/about").unwrap();
        assert_eq!(key, "example.com/about");

        let key = normalize_url("http://example.com/about").unwrap();
        assert_eq!(key, "example.com/about");
    }

    #[test]
    fn test_strips_trailing_slash() {
        let key = normalize_url("https://example.com/about/").unwrap();
        assert_eq!(key, "example.com/about");
    }

    #[test]
    fn test_lowercases_host_only() {
        let key = normalize_url("https://EXAMPLE.com/About/").unwrap();
        assert_eq!(key, "example.com/About");
    }

    #[test]
    fn test_equivalent_urls_share_a_key() {
        let a = normalize_url("https://EXAMPLE.com/about/").unwrap();
        let b = normalize_url("http://example.com/about").unwrap();
        assert_eq!(a, "example.com/about");
        assert_eq!(a, b);
    }

    #[test]
    fn test_strips_only_one_trailing_slash() {
        let key = normalize_url("https://example.com/a//").unwrap();
        assert_eq!(key, "example.com/a/");
    }

    #[test]
    fn test_root_collapses_to_bare_host() {
        assert_eq!(normalize_url("https://example.com").unwrap(), "example.com");
        assert_eq!(normalize_url("https://example.com/").unwrap(), "example.com");
    }

    #[test]
    fn test_drops_query_and_fragment() {
        let key = normalize_url("https://example.com/search?q=rust#results").unwrap();
        assert_eq!(key, "example.com/search");
    }

    #[test]
    fn test_idempotent_under_reparse() {
        let key = normalize_url("https://EXAMPLE.com/blog/post/").unwrap();
        let again = normalize_url(&format!("https://{}", key)).unwrap();
        assert_eq!(key, again);
    }

    #[test]
    fn test_rejects_relative_url() {
        let result = normalize_url("/about");
        assert!(matches!(result, Err(CrawlError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_url_without_host() {
        let result = normalize_url("mailto:someone@example.com");
        assert!(matches!(result, Err(CrawlError::InvalidUrl(_))));
    }

    #[test]
    fn test_parsed_url_matches_string_form() {
        let url = Url::parse("https://example.com/docs/").unwrap();
        assert_eq!(
            normalize_parsed(&url).unwrap(),
            normalize_url("https://example.com/docs/").unwrap()
        );
    }
}
