//! Realtime search results source.

use reqwest::Url;

use super::{normalize_origin, Discriminant, PageSource, DEFAULT_ORIGIN};
use crate::error::ConfigurationError;

const CONTENT_MARKER: &str = "tweet-text";
const METADATA_MARKER: &str = "tweet-timestamp";

/// Watches the realtime results page of a search term.
#[derive(Debug, Clone)]
pub struct SearchFeedSource {
    discriminant: Discriminant,
    origin: String,
    url: String,
}

impl SearchFeedSource {
    pub fn new(term: impl Into<String>) -> Result<Self, ConfigurationError> {
        Self::with_origin(term, DEFAULT_ORIGIN)
    }

    pub fn with_origin(term: impl Into<String>, origin: &str) -> Result<Self, ConfigurationError> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(ConfigurationError::Invalid("search term is empty".into()));
        }

        let origin = normalize_origin(origin)?;
        let mut url = Url::parse(&format!("{origin}/search")).map_err(|e| {
            ConfigurationError::InvalidOrigin {
                origin: origin.clone(),
                reason: e.to_string(),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("f", "realtime")
            .append_pair("q", &term);

        Ok(Self {
            discriminant: Discriminant::Search(term),
            origin,
            url: url.into(),
        })
    }

    pub fn term(&self) -> &str {
        self.discriminant.key()
    }
}

impl PageSource for SearchFeedSource {
    fn name(&self) -> &str {
        self.discriminant.key()
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn origin(&self) -> &str {
        &self.origin
    }

    fn content_marker(&self) -> &str {
        CONTENT_MARKER
    }

    fn metadata_marker(&self) -> &str {
        METADATA_MARKER
    }

    fn discriminant(&self) -> Option<&Discriminant> {
        Some(&self.discriminant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_the_term() {
        let src = SearchFeedSource::new("milk chocolate").unwrap();
        assert_eq!(
            src.url(),
            "https://twitter.com/search?f=realtime&q=milk+chocolate"
        );
        assert_eq!(src.cache_key(), "milk chocolate");
        assert_eq!(src.term(), "milk chocolate");
    }

    #[test]
    fn uses_search_markers() {
        let src = SearchFeedSource::with_origin("#rust", "http://127.0.0.1:9000").unwrap();
        assert_eq!(src.url(), "http://127.0.0.1:9000/search?f=realtime&q=%23rust");
        assert_eq!(src.content_marker(), "tweet-text");
        assert_eq!(src.metadata_marker(), "tweet-timestamp");
    }

    #[test]
    fn rejects_blank_terms() {
        assert!(SearchFeedSource::new("   ").is_err());
    }
}
