//! Page source abstraction layer.
//!
//! This module defines the [`PageSource`] trait and the common [`Item`]
//! type.  Concrete sources live in sub-modules: [`user`] watches a profile
//! feed and [`search`] watches a realtime search page.
//!
//! ## Adding a new source
//!
//! 1. Create a new file in this directory (e.g. `hashtag.rs`).
//! 2. Define a struct holding the page URL and implement [`PageSource`]:
//!    the two class markers are all the extraction step needs.
//! 3. Add `mod hashtag;` below and re-export your struct.
//!
//! Fetching, de-duplication, persistence and dispatch are source-agnostic.

mod extract;
mod item;
mod search;
mod user;

pub use extract::extract_items;
pub use item::{render, Item};
pub use search::SearchFeedSource;
pub use user::UserFeedSource;

use reqwest::Url;

use crate::error::{ConfigurationError, ParseError};

/// Site every built-in source points at unless told otherwise.
pub const DEFAULT_ORIGIN: &str = "https://twitter.com";

/// Shared cache key used when a source has no discriminant.
pub const FALLBACK_CACHE_KEY: &str = "posts";

/// The value that tells one watched page apart from another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discriminant {
    User(String),
    Search(String),
}

impl Discriminant {
    pub fn key(&self) -> &str {
        match self {
            Discriminant::User(name) => name,
            Discriminant::Search(term) => term,
        }
    }
}

/// Trait that every watched page must implement.
///
/// A source knows where its page lives and which class markers identify
/// the content nodes (`<p>`) and metadata links (`<a>`) of each post.
pub trait PageSource: Send {
    /// Human-readable label used in logs.
    fn name(&self) -> &str;

    /// Absolute URL of the page to fetch.
    fn url(&self) -> &str;

    /// Scheme and host prefixed to relative post links.
    fn origin(&self) -> &str;

    fn content_marker(&self) -> &str;

    fn metadata_marker(&self) -> &str;

    fn discriminant(&self) -> Option<&Discriminant> {
        None
    }

    /// Key of this watcher's list in the shared cache.
    fn cache_key(&self) -> &str {
        self.discriminant()
            .map(Discriminant::key)
            .unwrap_or(FALLBACK_CACHE_KEY)
    }

    /// Turn one fetched page into candidate items, in page order.
    fn extract(&self, markup: &[u8]) -> Result<Vec<Item>, ParseError> {
        extract_items(
            markup,
            self.content_marker(),
            self.metadata_marker(),
            self.origin(),
        )
    }
}

/// Validate an origin and return it without a trailing slash.
pub(crate) fn normalize_origin(origin: &str) -> Result<String, ConfigurationError> {
    let parsed = Url::parse(origin).map_err(|e| ConfigurationError::InvalidOrigin {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(ConfigurationError::InvalidOrigin {
            origin: origin.to_string(),
            reason: "expected scheme and host".into(),
        });
    }
    Ok(origin.trim_end_matches('/').to_string())
}
