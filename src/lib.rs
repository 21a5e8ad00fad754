//! postwatch: watch a post feed or search page and act on new posts.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌─────────────┐  bytes  ┌─────────────┐  items  ┌───────────┐  new items  ┌──────────┐
//! │ transport   │ ──────► │ source/     │ ──────► │ seen      │ ──────────► │ sink/    │
//! │ (HTTP GET)  │         │ (extract)   │         │ (dedup)   │             │ (notify) │
//! └─────────────┘         └─────────────┘         └───────────┘             └──────────┘
//!                                                      │ write-through
//!                                                 ┌──────────┐
//!                                                 │ store/   │
//!                                                 └──────────┘
//! ```
//!
//! * **`source/`**: the [`PageSource`] trait, the [`Item`] record and the
//!   user-feed and search-page implementations.
//! * **`transport`**: fetches raw pages.
//! * **`seen`**: the ordered, de-duplicated record of dispatched posts.
//! * **`store/`**: snapshot file and shared Redis list backends.
//! * **`sink/`**: console, email and closure actions.
//! * **`watcher`**: one cycle, and the loop that repeats it.
//! * **`shutdown`**: stop signal checked between cycles.
//!
//! ```no_run
//! use postwatch::{ConsoleSink, HttpTransport, Shutdown, StoreConfig, UserFeedSource, Watcher};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = UserFeedSource::new("JohnDCook")?;
//! let stores = StoreConfig {
//!     snapshot: Some("johndcook.bin".into()),
//!     ..StoreConfig::default()
//! };
//! let transport = HttpTransport::new(Duration::from_secs(30))?;
//! let mut watcher = Watcher::open(Box::new(source), transport, &stores)?;
//! watcher.watch_forever(&mut ConsoleSink::new(), Duration::from_secs(120), &Shutdown::new())?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod seen;
pub mod shutdown;
pub mod sink;
pub mod source;
pub mod store;
pub mod transport;
pub mod watcher;

pub use error::{ConfigurationError, ParseError, PersistenceError, SinkError, TransportError, WatchError};
pub use seen::SeenSet;
pub use shutdown::Shutdown;
pub use sink::{ActionSink, ConsoleSink, EmailSettings, EmailSink};
pub use source::{Discriminant, Item, PageSource, SearchFeedSource, UserFeedSource};
pub use store::{CacheSettings, CacheTarget, FileSnapshotStore, PersistenceStore, SharedCacheStore, StoreConfig};
pub use transport::{HttpTransport, Transport};
pub use watcher::{Watcher, WatcherOptions};
