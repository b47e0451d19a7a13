//! Listing page addressing
//!
//! The board paginates through a single query string; only `page` varies
//! between requests.

use url::Url;

/// Fixed filter parameters sent with every listing request
const LISTING_QUERY: &str = "q=&cid=0&lid=0&jid=0&in_title=0&has_salary=0&is_ge=0&for_scroll=yes";

/// Builds the URL of listing page `page` under `base_url`
///
/// # Example
///
/// ```
/// use jobs_harvest::crawler::listing_url;
///
/// assert_eq!(
///     listing_url("https://jobs.ge", 3),
///     "https://jobs.ge/en/?page=3&q=&cid=0&lid=0&jid=0&in_title=0&has_salary=0&is_ge=0&for_scroll=yes"
/// );
/// ```
pub fn listing_url(base_url: &str, page: u32) -> String {
    format!(
        "{}/en/?page={}&{}",
        base_url.trim_end_matches('/'),
        page,
        LISTING_QUERY
    )
}

/// Reads the page number a listing URL actually addresses
///
/// Used on the final URL after redirects, so a server that bounces an
/// out-of-range page back to an earlier one is caught as a repeat.
pub fn page_number_of(url: &str) -> Option<u32> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_trailing_slash() {
        assert_eq!(
            listing_url("http://127.0.0.1:8080/", 1),
            listing_url("http://127.0.0.1:8080", 1)
        );
    }

    #[test]
    fn test_page_number_round_trip() {
        let url = listing_url("https://jobs.ge", 17);
        assert_eq!(page_number_of(&url), Some(17));
    }

    #[test]
    fn test_page_number_missing() {
        assert_eq!(page_number_of("https://jobs.ge/en/"), None);
        assert_eq!(page_number_of("https://jobs.ge/en/?page=abc"), None);
        assert_eq!(page_number_of("not a url"), None);
    }
}
