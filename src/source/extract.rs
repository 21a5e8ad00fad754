//! Post extraction from raw page markup.
//!
//! A page lists posts as two independent, same-ordered node lists: text
//! paragraphs carrying the content marker and timestamp links carrying the
//! metadata marker.  The lists are zipped by position.  If the page yields
//! more of one kind than the other, the surplus trailing nodes are dropped.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::Item;
use crate::error::ParseError;

/// Extract items from `markup`.
///
/// This is a pure function (no I/O) so tests can exercise it directly.
pub fn extract_items(
    markup: &[u8],
    content_marker: &str,
    metadata_marker: &str,
    origin: &str,
) -> Result<Vec<Item>, ParseError> {
    let text = String::from_utf8(markup.to_vec())?;
    let content_selector = class_selector("p", content_marker)?;
    let metadata_selector = class_selector("a", metadata_marker)?;

    let document = Html::parse_document(&text);
    let contents: Vec<ElementRef> = document.select(&content_selector).collect();
    let metadata: Vec<ElementRef> = document.select(&metadata_selector).collect();

    if contents.len() != metadata.len() {
        debug!(
            contents = contents.len(),
            metadata = metadata.len(),
            "content and metadata node counts differ; pairing the shorter prefix"
        );
    }

    let items = contents
        .iter()
        .zip(metadata.iter())
        .filter_map(|(content, meta)| {
            let Some(href) = meta.value().attr("href") else {
                warn!(marker = metadata_marker, "metadata link without href; skipping post");
                return None;
            };
            let title = meta.value().attr("title").unwrap_or_default();
            let body: String = content.text().collect();
            Some(Item::from_link(&body, href, title, origin))
        })
        .collect();

    Ok(items)
}

/// Selector for `tag` elements whose class list contains `marker`.
fn class_selector(tag: &str, marker: &str) -> Result<Selector, ParseError> {
    let valid = !marker.is_empty()
        && marker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ParseError::Selector {
            marker: marker.to_string(),
            reason: "class markers may only contain letters, digits, '-' and '_'".into(),
        });
    }

    Selector::parse(&format!("{tag}.{marker}")).map_err(|e| ParseError::Selector {
        marker: marker.to_string(),
        reason: e.to_string(),
    })
}
