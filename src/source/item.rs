//! The post record shared by every source, store and sink.
//!
//! An `Item` is built once from a content node and its metadata link and is
//! never modified afterwards.  Its identity is the permalink alone: two
//! items with the same link are the same post even if the page re-rendered
//! the text or the date label differently.

use std::fmt;
use std::hash::{Hash, Hasher};

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// A single post discovered on a watched page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    content: String,
    author: String,
    published_label: String,
    permalink: String,
}

impl Item {
    pub fn new(
        content: impl Into<String>,
        author: impl Into<String>,
        published_label: impl Into<String>,
        permalink: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
            published_label: published_label.into(),
            permalink: permalink.into(),
        }
    }

    /// Build an item from a content body and the attributes of its
    /// metadata link.
    ///
    /// * `href`: site-relative path such as `/alice/status/42`; its first
    ///   segment is the author handle.
    /// * `title`: the site's human-readable timestamp label, kept verbatim.
    /// * `origin`: base URL `href` is resolved against to form the
    ///   permalink; absolute and scheme-relative hrefs keep their own host.
    pub fn from_link(content: &str, href: &str, title: &str, origin: &str) -> Self {
        let (path, permalink) = match Url::parse(origin).and_then(|base| base.join(href)) {
            Ok(link) => (link.path().to_string(), link.to_string()),
            Err(_) => (
                href.to_string(),
                format!("{}{}", origin.trim_end_matches('/'), href),
            ),
        };

        let author = path
            .split('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or_default();

        Self::new(content.trim(), author, title.trim(), permalink)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn published_label(&self) -> &str {
        &self.published_label
    }

    /// The unique key of this post.
    pub fn permalink(&self) -> &str {
        &self.permalink
    }
}

// ---------------------------------------------------------------------------
// Identity by permalink
// ---------------------------------------------------------------------------

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.permalink == other.permalink
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.permalink.hash(state);
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a post from its named fields.
pub fn render(content: &str, author: &str, date: &str, link: &str) -> String {
    format!("{content}\nAuthor: {author}\nDate: {date}\nLink: {link}")
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(
            &self.content,
            &self.author,
            &self.published_label,
            &self.permalink,
        ))
    }
}
