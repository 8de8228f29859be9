//! Pure construction of paginated request URLs.

use thiserror::Error;
use url::Url;

use crate::constants::DEFAULT_PAGE_SIZE;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid request URL: {0}")]
    Join(#[from] url::ParseError),
    #[error("base URL cannot carry path segments")]
    CannotBeABase,
}

/// The effective filter configuration for one query epoch.
///
/// An empty `tag` or `search_term` means "no filter". When both are set
/// the tag wins; see [`build_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub search_term: String,
    pub tag: String,
    pub page_size: u64,
}

impl FeedQuery {
    #[must_use]
    pub fn new(search_term: impl Into<String>, tag: impl Into<String>, page_size: u64) -> Self {
        Self {
            search_term: search_term.into(),
            tag: tag.into(),
            page_size,
        }
    }
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self::new("", "", DEFAULT_PAGE_SIZE)
    }
}

/// Build the request URL for one page of the feed.
///
/// Precedence: a non-empty tag produces a tag-filtered request and the
/// search term is ignored entirely; otherwise a non-empty search term
/// produces a search request; otherwise the unfiltered listing. All three
/// carry `limit` and `skip` as `&`-joined query parameters.
///
/// # Errors
///
/// Returns an error if `base` cannot be extended with path segments.
pub fn build_request(base: &Url, query: &FeedQuery, skip: u64) -> Result<Url, QueryError> {
    let mut url = if !query.tag.is_empty() {
        let mut url = base.join("posts/tag/")?;
        url.path_segments_mut()
            .map_err(|()| QueryError::CannotBeABase)?
            .pop_if_empty()
            .push(&query.tag);
        url
    } else if !query.search_term.is_empty() {
        let mut url = base.join("posts/search")?;
        url.query_pairs_mut().append_pair("q", &query.search_term);
        url
    } else {
        base.join("posts")?
    };

    url.query_pairs_mut()
        .append_pair("limit", &query.page_size.to_string())
        .append_pair("skip", &skip.to_string());

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://dummyjson.com").unwrap()
    }

    #[test]
    fn test_unfiltered_listing() {
        let query = FeedQuery::new("", "", 10);
        let url = build_request(&base(), &query, 20).unwrap();
        assert_eq!(url.as_str(), "https://dummyjson.com/posts?limit=10&skip=20");
    }

    #[test]
    fn test_search_request_is_well_formed() {
        let query = FeedQuery::new("rust async", "", 10);
        let url = build_request(&base(), &query, 0).unwrap();
        // Exactly one '?', '&'-joined pairs.
        assert_eq!(url.as_str().matches('?').count(), 1);
        assert_eq!(url.path(), "/posts/search");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "rust async".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("skip".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_tag_takes_precedence_over_search() {
        let query = FeedQuery::new("ignored", "history", 5);
        let url = build_request(&base(), &query, 15).unwrap();
        assert_eq!(url.path(), "/posts/tag/history");
        assert!(!url.as_str().contains("ignored"));
        assert_eq!(
            url.query(),
            Some("limit=5&skip=15"),
            "pagination must survive the tag path"
        );
    }

    #[test]
    fn test_tag_is_percent_encoded() {
        let query = FeedQuery::new("", "sci fi/space", 10);
        let url = build_request(&base(), &query, 0).unwrap();
        assert_eq!(url.path(), "/posts/tag/sci%20fi%2Fspace");
    }

    #[test]
    fn test_deterministic() {
        let query = FeedQuery::new("x", "", 10);
        let a = build_request(&base(), &query, 30).unwrap();
        let b = build_request(&base(), &query, 30).unwrap();
        assert_eq!(a, b);
    }
}
