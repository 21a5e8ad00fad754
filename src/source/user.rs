//! Profile feed source.

use super::{normalize_origin, Discriminant, PageSource, DEFAULT_ORIGIN};
use crate::error::ConfigurationError;

const CONTENT_MARKER: &str = "ProfileTweet-text";
const METADATA_MARKER: &str = "ProfileTweet-timestamp";

/// Watches the post feed of a single user.
#[derive(Debug, Clone)]
pub struct UserFeedSource {
    discriminant: Discriminant,
    origin: String,
    url: String,
}

impl UserFeedSource {
    /// Watch `username` on the default origin.
    pub fn new(username: impl Into<String>) -> Result<Self, ConfigurationError> {
        Self::with_origin(username, DEFAULT_ORIGIN)
    }

    /// Watch `username` on another host serving the same markup.
    pub fn with_origin(
        username: impl Into<String>,
        origin: &str,
    ) -> Result<Self, ConfigurationError> {
        let username = username.into();
        let handle = username.trim().trim_start_matches('@');
        if handle.is_empty()
            || handle.contains(['/', '?', '#'])
            || handle.contains(char::is_whitespace)
        {
            return Err(ConfigurationError::Invalid(format!(
                "invalid username {username:?}"
            )));
        }
        let handle = handle.to_string();

        let origin = normalize_origin(origin)?;
        let url = format!("{origin}/{handle}");
        Ok(Self {
            discriminant: Discriminant::User(handle),
            origin,
            url,
        })
    }

    pub fn username(&self) -> &str {
        self.discriminant.key()
    }
}

impl PageSource for UserFeedSource {
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
