// src/checker/resolve.rs
// =============================================================================
// Turns href values into absolute addresses and sorts them into internal and
// external links.
//
// Rules:
// - An href is parsed as a URI reference and resolved against the base
//   (scheme, authority and path merging, as a browser does it)
// - Anything that fails to parse is skipped
// - Anything that does not resolve to http:// or https:// is skipped too
//   (javascript:, mailto:, tel:, data:, ...). Skipped links are not counted.
// - A link is internal when its host is the page host or a subdomain of it
//
// The host comparison is a plain string suffix check: no punycode
// normalization, no port handling, no special treatment for IP addresses.
// =============================================================================

use url::Url;

use crate::model::LinkKind;

/// Resolves `href` against `base`.
///
/// Returns None for malformed references and for non-network schemes.
///
/// Examples:
///   base = "https://example.com/page"
///   href = "/docs" -> Some("https://example.com/docs")
///   href = "../other" -> Some("https://example.com/other")
///   href = "https://other.com" -> Some("https://other.com/")
///   href = "javascript:void(0)" -> None
pub fn resolve(href: &str, base: &Url) -> Option<Url> {
    // join() handles both cases: an absolute href replaces the base entirely
    let resolved = match base.join(href) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!(href, error = %e, "skipping malformed href");
            return None;
        }
    };

    if is_network_scheme(&resolved) && resolved.host_str().is_some() {
        Some(resolved)
    } else {
        tracing::trace!(href, scheme = resolved.scheme(), "skipping non-network href");
        None
    }
}

fn is_network_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Internal if `url`'s host is `page_host` or ends with `.page_host`.
pub fn classify(url: &Url, page_host: &str) -> LinkKind {
    let host = url.host_str().unwrap_or_default();

    let same_site = host == page_host
        || host
            .strip_suffix(page_host)
            .is_some_and(|prefix| prefix.ends_with('.'));

    if same_site {
        LinkKind::Internal
    } else {
        LinkKind::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page/").unwrap()
    }

    fn resolved(href: &str) -> Option<String> {
        resolve(href, &base()).map(|u| u.to_string())
    }

    #[test]
    fn test_resolve_relative_links() {
        assert_eq!(resolved("/docs").as_deref(), Some("https://example.com/docs"));
        assert_eq!(resolved("../about").as_deref(), Some("https://example.com/about"));
        assert_eq!(resolved("child").as_deref(), Some("https://example.com/page/child"));
        assert_eq!(resolved("//cdn.example.org/x").as_deref(), Some("https://cdn.example.org/x"));
        assert_eq!(resolved("#top").as_deref(), Some("https://example.com/page/#top"));
    }

    #[test]
    fn test_resolve_absolute_link() {
        assert_eq!(resolved("http://other.com/b").as_deref(), Some("http://other.com/b"));
    }

    #[test]
    fn test_skip_non_network_schemes() {
        assert_eq!(resolved("javascript:void(0)"), None);
        assert_eq!(resolved("mailto:test@example.com"), None);
        assert_eq!(resolved("tel:+123456"), None);
        assert_eq!(resolved("data:text/plain,hi"), None);
        assert_eq!(resolved("ftp://example.com/file"), None);
    }

    #[test]
    fn test_skip_malformed() {
        assert_eq!(resolved("http://[::1"), None);
        assert_eq!(resolved("https://exa mple.com/"), None);
    }

    #[test]
    fn test_classify_by_host_suffix() {
        let internal = |s: &str| classify(&Url::parse(s).unwrap(), "example.com");

        assert_eq!(internal("https://example.com/a"), LinkKind::Internal);
        assert_eq!(internal("http://blog.example.com/a"), LinkKind::Internal);
        assert_eq!(internal("https://example.com:8443/a"), LinkKind::Internal);
        assert_eq!(internal("https://other.com/b"), LinkKind::External);
        assert_eq!(internal("https://notexample.com/"), LinkKind::External);
        assert_eq!(internal("https://example.com.evil.net/"), LinkKind::External);
    }
}
