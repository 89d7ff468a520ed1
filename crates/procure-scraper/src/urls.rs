//! Search URL construction and product link normalization.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use procure_core::{SourceConfig, QUERY_PLACEHOLDER};
use reqwest::Url;

/// Everything except RFC 3986 unreserved characters is escaped, so a space
/// becomes `%20` (never `+`) in both path and query-string templates.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Substitutes the percent-encoded `query` into the source's search template.
///
/// Given template `"https://www.homedepot.com/s/{query}"` and query
/// `"2x4x8 lumber"`, returns `"https://www.homedepot.com/s/2x4x8%20lumber"`.
#[must_use]
pub fn build_search_url(source: &SourceConfig, query: &str) -> String {
    let encoded = utf8_percent_encode(query, QUERY_ENCODE_SET).to_string();
    source
        .search_url_template
        .replace(QUERY_PLACEHOLDER, &encoded)
}

/// Makes a product `href` absolute against the store's base URL.
///
/// An href that already parses as a URL (any scheme) is returned unchanged.
/// Everything else, protocol-relative hrefs included, is joined to
/// `base_url` with [`reqwest::Url::join`]. If `base_url` itself does not
/// parse, the two are concatenated with exactly one `/` between them.
#[must_use]
pub fn resolve_url(href: &str, base_url: &str) -> String {
    let href = href.trim();
    if Url::parse(href).is_ok() {
        return href.to_owned();
    }
    match Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(joined) => joined.to_string(),
        Err(e) => {
            tracing::debug!(href, base_url, error = %e, "falling back to string join for href");
            format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                href.trim_start_matches('/')
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use procure_core::SelectorSet;

    use super::*;

    fn source_with_template(template: &str) -> SourceConfig {
        SourceConfig {
            name: "Test Store".to_owned(),
            base_url: "https://www.example.com".to_owned(),
            search_url_template: template.to_owned(),
            selectors: SelectorSet {
                container: ".product".to_owned(),
                title: "a".to_owned(),
                price: ".price".to_owned(),
                delivery: ".delivery".to_owned(),
            },
        }
    }

    #[test]
    fn search_url_encodes_spaces_as_percent_20() {
        let source = source_with_template("https://www.homedepot.com/s/{query}");
        assert_eq!(
            build_search_url(&source, "2x4x8 lumber"),
            "https://www.homedepot.com/s/2x4x8%20lumber"
        );
    }

    #[test]
    fn search_url_fills_query_string_template() {
        let source = source_with_template("https://www.lowes.com/search?searchTerm={query}");
        assert_eq!(
            build_search_url(&source, "deck screws"),
            "https://www.lowes.com/search?searchTerm=deck%20screws"
        );
    }

    #[test]
    fn search_url_keeps_unreserved_characters() {
        let source = source_with_template("https://www.example.com/s/{query}");
        assert_eq!(
            build_search_url(&source, "1/2-in. pvc_pipe"),
            "https://www.example.com/s/1%2F2-in.%20pvc_pipe"
        );
    }

    #[test]
    fn resolve_url_joins_relative_path() {
        assert_eq!(
            resolve_url("/p/12345", "https://www.example.com"),
            "https://www.example.com/p/12345"
        );
    }

    #[test]
    fn resolve_url_avoids_double_slash() {
        assert_eq!(
            resolve_url("/p/12345", "https://www.example.com/"),
            "https://www.example.com/p/12345"
        );
        assert_eq!(
            resolve_url("p/12345", "https://www.example.com"),
            "https://www.example.com/p/12345"
        );
    }

    #[test]
    fn resolve_url_returns_absolute_href_unchanged() {
        let href = "https://www.lowes.com/pd/stud/1000074211";
        assert_eq!(resolve_url(href, "https://www.example.com"), href);
    }

    #[test]
    fn resolve_url_handles_protocol_relative_href() {
        assert_eq!(
            resolve_url("//images.example.com/p/1", "https://www.example.com"),
            "https://images.example.com/p/1"
        );
    }

    #[test]
    fn resolve_url_joins_relative_href_with_embedded_url() {
        let resolved = resolve_url(
            "/p/12345?ref=https://partner.example.net",
            "https://www.example.com",
        );
        assert_eq!(
            resolved,
            "https://www.example.com/p/12345?ref=https://partner.example.net"
        );
    }

    #[test]
    fn resolve_url_keeps_non_http_schemes_unchanged() {
        assert_eq!(
            resolve_url("mailto:orders@example.com", "https://www.example.com"),
            "mailto:orders@example.com"
        );
    }

    #[test]
    fn resolve_url_falls_back_when_base_does_not_parse() {
        assert_eq!(resolve_url("/p/7", "www.example.com/"), "www.example.com/p/7");
    }
}
