//! Persistence backends for the seen record.
//!
//! Two backends can be configured at once: a local snapshot file that is
//! rewritten in full every cycle, and a shared Redis list that only ever
//! receives the newly discovered items.  Both sit behind [`PersistenceStore`]
//! so the seen set can write through without knowing which is which.

mod cache;
mod file;

pub use cache::{CacheSettings, CacheTarget, SharedCacheStore};
pub use file::{FileSnapshotStore, SNAPSHOT_VERSION};

use std::path::PathBuf;

use crate::error::{ConfigurationError, PersistenceError};
use crate::source::Item;

/// Which backends a watcher records to.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Local snapshot file.
    pub snapshot: Option<PathBuf>,
    /// Shared cache connection URL.  Mutually exclusive with `cache_settings`.
    pub cache_url: Option<String>,
    /// Shared cache settings bundle.  Mutually exclusive with `cache_url`.
    pub cache_settings: Option<CacheSettings>,
}

impl StoreConfig {
    /// Build the configured stores, snapshot first.  No I/O happens here.
    pub fn build(
        &self,
        cache_key: &str,
    ) -> Result<Vec<Box<dyn PersistenceStore>>, ConfigurationError> {
        let mut stores: Vec<Box<dyn PersistenceStore>> = Vec::new();
        let cache = CacheTarget::resolve(self.cache_url.clone(), self.cache_settings.clone())?;

        if let Some(path) = &self.snapshot {
            stores.push(Box::new(FileSnapshotStore::new(path)));
        }
        if let Some(target) = cache {
            stores.push(Box::new(SharedCacheStore::new(&target, cache_key)?));
        }
        Ok(stores)
    }
}

pub trait PersistenceStore {
    /// Label used in logs and error messages.
    fn name(&self) -> &str;

    /// Read every item recorded so far.
    ///
    /// A store that has never been written returns an empty list; a store
    /// that cannot be read returns an error.
    fn load(&mut self) -> Result<Vec<Item>, PersistenceError>;

    /// Record the outcome of one cycle.
    ///
    /// `seen` is the full record after appending `fresh`; each backend
    /// decides which of the two it writes.
    fn record(&mut self, seen: &[Item], fresh: &[Item]) -> Result<(), PersistenceError>;
}
