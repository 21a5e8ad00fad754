//! The watch cycle and its polling loop.
//!
//! ```text
//! fetch ──► extract ──► unseen? ──► append + write through ──► dispatch
//!   │          │                          │                        │
//! Transport PageSource                 SeenSet                ActionSink
//! ```
//!
//! Everything runs on the calling thread.  A cycle runs to completion,
//! including the blocking fetch and store writes, before the loop sleeps,
//! and the loop sleeps fully before the next cycle.  Nothing overlaps, so
//! nothing is locked.
//!
//! A post is recorded as seen before it is dispatched.  If a sink fails the
//! post is not offered again: notifications are at-most-once, recording is
//! at-least-once.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::{PersistenceError, WatchError};
use crate::seen::SeenSet;
use crate::shutdown::Shutdown;
use crate::sink::ActionSink;
use crate::source::{Item, PageSource};
use crate::store::StoreConfig;
use crate::transport::{HttpTransport, Transport};

/// Default pause between cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Default)]
pub struct WatcherOptions {
    /// End [`Watcher::watch_forever`] once this many consecutive cycles
    /// failed to save to at least one store.  `None` never gives up.
    pub max_save_failures: Option<u32>,
}

pub struct Watcher<T: Transport = HttpTransport> {
    source: Box<dyn PageSource>,
    transport: T,
    seen: SeenSet,
    options: WatcherOptions,
    save_failures: u32,
    last_save_error: Option<PersistenceError>,
}

impl<T: Transport> Watcher<T> {
    pub fn new(source: Box<dyn PageSource>, transport: T, seen: SeenSet) -> Self {
        Self {
            source,
            transport,
            seen,
            options: WatcherOptions::default(),
            save_failures: 0,
            last_save_error: None,
        }
    }

    /// Build the configured stores for `source` and load the seen record
    /// from them.
    pub fn open(
        source: Box<dyn PageSource>,
        transport: T,
        stores: &StoreConfig,
    ) -> Result<Self, WatchError> {
        let stores = stores.build(source.cache_key())?;
        let seen = SeenSet::open(stores)?;
        info!(
            source = source.name(),
            url = source.url(),
            seen = seen.len(),
            "watcher ready"
        );
        Ok(Self::new(source, transport, seen))
    }

    pub fn with_options(mut self, options: WatcherOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &dyn PageSource {
        self.source.as_ref()
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// Number of consecutive cycles in which some store failed to save.
    pub fn consecutive_save_failures(&self) -> u32 {
        self.save_failures
    }

    /// Run one fetch, parse, diff and persist round.
    ///
    /// Returns the newly discovered posts in page order.  A fetch or parse
    /// failure returns before anything is recorded.  Store failures are
    /// logged and counted but do not fail the cycle.
    pub fn cycle(&mut self) -> Result<Vec<Item>, WatchError> {
        let url = self.source.url();
        let markup = self.transport.fetch(url)?;
        let candidates = self.source.extract(&markup)?;
        let found = candidates.len();

        let fresh = self.seen.unseen(candidates);
        let failures = self.seen.extend(&fresh);

        if failures.is_empty() {
            self.save_failures = 0;
        } else {
            self.save_failures += 1;
            for failure in &failures {
                error!(
                    store = %failure.store,
                    error = %failure.error,
                    consecutive = self.save_failures,
                    "could not save seen record"
                );
            }
            self.last_save_error = failures.into_iter().last().map(|f| f.error);
        }

        info!(
            source = self.source.name(),
            found,
            new = fresh.len(),
            seen = self.seen.len(),
            "cycle complete"
        );
        Ok(fresh)
    }

    /// Run one cycle and hand every new post to `sink`, in order.
    ///
    /// Every post is offered even if an earlier send failed; the first
    /// failure is returned afterwards.
    pub fn watch<S: ActionSink + ?Sized>(&mut self, sink: &mut S) -> Result<Vec<Item>, WatchError> {
        let fresh = self.cycle()?;

        let mut failed = 0;
        let mut first_failure = None;
        for item in &fresh {
            if let Err(e) = sink.send(item) {
                warn!(permalink = item.permalink(), error = %e, "notification failed; not retried");
                failed += 1;
                first_failure.get_or_insert(e);
            }
        }

        match first_failure {
            Some(source) => Err(WatchError::Dispatch {
                failed,
                total: fresh.len(),
                source,
            }),
            None => Ok(fresh),
        }
    }

    /// Watch every `interval` until `shutdown` fires.
    ///
    /// Fetch, parse and dispatch failures are logged and retried on the next
    /// interval.  Returns an error only when persistence keeps failing
    /// beyond [`WatcherOptions::max_save_failures`].
    pub fn watch_forever<S: ActionSink + ?Sized>(
        &mut self,
        sink: &mut S,
        interval: Duration,
        shutdown: &Shutdown,
    ) -> Result<(), WatchError> {
        info!(
            url = self.source.url(),
            interval_secs = interval.as_secs_f64(),
            "watching"
        );

        while !shutdown.is_triggered() {
            match self.watch(sink) {
                Ok(fresh) => debug!(dispatched = fresh.len(), "watch round done"),
                Err(e) if e.is_transient() => {
                    warn!(phase = e.phase(), error = %e, "cycle failed; retrying next interval");
                }
                Err(e) => return Err(e),
            }

            self.check_save_failures()?;

            if shutdown.wait_timeout(interval) {
                break;
            }
        }

        info!("stop requested; watcher exiting");
        Ok(())
    }

    fn check_save_failures(&mut self) -> Result<(), WatchError> {
        let Some(max) = self.options.max_save_failures else {
            return Ok(());
        };
        if self.save_failures < max {
            return Ok(());
        }
        match self.last_save_error.take() {
            Some(source) => Err(WatchError::PersistenceSave {
                failures: self.save_failures,
                source,
            }),
            None => Ok(()),
        }
    }
}
