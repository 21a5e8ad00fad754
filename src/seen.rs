//! The record of every post already dispatched.
//!
//! Items are kept in discovery order next to a permalink index for O(1)
//! membership checks.  The set only grows.  Every append is written
//! through to all configured stores.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::{PersistenceError, WatchError};
use crate::source::Item;
use crate::store::PersistenceStore;

/// A store that failed to record a cycle.
#[derive(Debug)]
pub struct StoreFailure {
    pub store: String,
    pub error: PersistenceError,
}

pub struct SeenSet {
    items: Vec<Item>,
    index: HashSet<String>,
    stores: Vec<Box<dyn PersistenceStore>>,
}

impl SeenSet {
    /// An empty set with no persistence.
    pub fn in_memory() -> Self {
        Self {
            items: Vec::new(),
            index: HashSet::new(),
            stores: Vec::new(),
        }
    }

    /// Load the prior record from every store, in order.
    ///
    /// Stores are concatenated and de-duplicated by permalink, keeping the
    /// first occurrence.  Any store that cannot be read fails construction.
    pub fn open(stores: Vec<Box<dyn PersistenceStore>>) -> Result<Self, WatchError> {
        let mut set = Self::in_memory();

        for mut store in stores {
            let loaded = store.load().map_err(|source| WatchError::PersistenceLoad {
                store: store.name().to_string(),
                source,
            })?;
            let total = loaded.len();
            let added = loaded
                .into_iter()
                .filter(|item| set.insert(item.clone()))
                .count();
            if added < total {
                warn!(
                    store = store.name(),
                    duplicates = total - added,
                    "dropped items already loaded from another store"
                );
            }
            info!(store = store.name(), items = added, "seen record loaded");
            set.stores.push(store);
        }

        Ok(set)
    }

    fn insert(&mut self, item: Item) -> bool {
        if self.index.insert(item.permalink().to_string()) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.index.contains(item.permalink())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All recorded items in discovery order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Candidates not seen before, in their original order.
    ///
    /// A post repeated on the same page is only returned once.
    pub fn unseen(&self, candidates: Vec<Item>) -> Vec<Item> {
        let mut on_page = HashSet::new();
        candidates
            .into_iter()
            .filter(|item| !self.contains(item) && on_page.insert(item.permalink().to_string()))
            .collect()
    }

    /// Append `fresh` and write through to every store.
    ///
    /// One store failing does not stop the others; the failures are
    /// returned for the caller to report.
    pub fn extend(&mut self, fresh: &[Item]) -> Vec<StoreFailure> {
        for item in fresh {
            self.insert(item.clone());
        }

        let mut failures = Vec::new();
        for store in &mut self.stores {
            if let Err(error) = store.record(&self.items, fresh) {
                failures.push(StoreFailure {
                    store: store.name().to_string(),
                    error,
                });
            }
        }
        failures
    }
}
