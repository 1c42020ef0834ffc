//! Short-link domain derived from the API URL.
//!
//! YOURLS returns bare keywords from `lookup-url-substr` and from a
//! duplicate `shorturl` call; they are qualified with the origin of the
//! configured API URL.

use url::Url;

/// `scheme://host[:port]` of `api_url`, or an empty string when the URL has
/// no parseable host.
pub fn derive_domain(api_url: &str) -> String {
    let Ok(parsed) = Url::parse(api_url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    }
}

/// Join a domain and a keyword into a short URL.
pub fn qualify(domain: &str, keyword: &str) -> String {
    format!("{domain}/{keyword}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_path_and_query() {
        assert_eq!(derive_domain("http://sho.rt/yourls-api.php"), "http://sho.rt");
        assert_eq!(
            derive_domain("https://sho.rt/sub/yourls-api.php?x=1"),
            "https://sho.rt"
        );
    }

    #[test]
    fn keeps_explicit_port() {
        assert_eq!(
            derive_domain("http://localhost:8080/yourls-api.php"),
            "http://localhost:8080"
        );
        // default ports are normalized away by the parser
        assert_eq!(derive_domain("https://sho.rt:443/api"), "https://sho.rt");
    }

    #[test]
    fn unparseable_host_yields_empty_domain() {
        assert_eq!(derive_domain("http://"), "");
        assert_eq!(derive_domain("not a url"), "");
    }

    #[test]
    fn qualify_degrades_to_bare_keyword() {
        assert_eq!(qualify("http://sho.rt", "1f"), "http://sho.rt/1f");
        assert_eq!(qualify("", "1f"), "/1f");
    }
}
