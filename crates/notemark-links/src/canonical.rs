use url::Url;

use crate::error::LinkError;

/// Normalizes a URL into its cache key form.
///
/// Parsing lowercases the scheme and host and drops default ports; the
/// fragment is removed here since it never reaches the server.
pub fn canonicalize(raw: &str) -> Result<Url, LinkError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| LinkError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LinkError::UnsupportedScheme(url.scheme().to_string()));
    }
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.test/ok", "https://example.test/ok")]
    #[case("HTTPS://Example.TEST:443/ok#top", "https://example.test/ok")]
    #[case("http://example.test:80", "http://example.test/")]
    #[case("http://example.test:8080/a?b=c", "http://example.test:8080/a?b=c")]
    #[case("  https://example.test/x  ", "https://example.test/x")]
    fn canonical_forms(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canonicalize(raw).unwrap().as_str(), expected);
    }

    #[test]
    fn rejects_relative_urls() {
        assert!(matches!(
            canonicalize("img/logo.png"),
            Err(LinkError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            canonicalize("mailto:me@example.test"),
            Err(LinkError::UnsupportedScheme("mailto".into()))
        );
    }
}
