//! Error types for every phase of a watch cycle.
//!
//! Each collaborator gets its own error enum so callers can tell a flaky
//! network apart from a broken snapshot file.  [`WatchError`] wraps them
//! and names the phase that failed, which is what the binary prints before
//! exiting.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Conflicting or invalid construction parameters.  Always fatal.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("shared cache accepts either a connection url or a settings bundle, not both")]
    ConflictingCacheTarget,

    #[error("invalid shared cache target: {0}")]
    InvalidCacheTarget(String),

    #[error("invalid mail address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("invalid source origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("{0}")]
    Invalid(String),
}

/// Fetching the page failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("{0}")]
    Other(String),
}

/// The fetched markup could not be scanned.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("page is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("marker {marker:?} does not form a valid selector: {reason}")]
    Selector { marker: String, reason: String },
}

/// Loading from or saving to a persistence store failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot {path} could not be decoded: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("snapshot {path} could not be encoded: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("snapshot {path} has format version {found}, expected {expected}")]
    Version {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("shared cache: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("shared cache entry at {key:?} is not a valid item: {source}")]
    CacheEntry {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An action sink could not deliver an item.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("mail setup: {0}")]
    Setup(#[from] ConfigurationError),

    #[error("mail delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("{0}")]
    Custom(String),
}

/// Failure of one of the watcher's operations, tagged with its phase.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("fetch: {0}")]
    Fetch(#[from] TransportError),

    #[error("parse: {0}")]
    Parse(#[from] ParseError),

    #[error("persistence-load ({store}): {source}")]
    PersistenceLoad {
        store: String,
        #[source]
        source: PersistenceError,
    },

    #[error("persistence-save: {failures} consecutive cycles failed to save, last: {source}")]
    PersistenceSave {
        failures: u32,
        #[source]
        source: PersistenceError,
    },

    #[error("dispatch: {failed} of {total} notifications failed, first: {source}")]
    Dispatch {
        failed: usize,
        total: usize,
        #[source]
        source: SinkError,
    },
}

impl WatchError {
    /// Short name of the phase that failed.
    pub fn phase(&self) -> &'static str {
        match self {
            WatchError::Configuration(_) => "configuration",
            WatchError::Fetch(_) => "fetch",
            WatchError::Parse(_) => "parse",
            WatchError::PersistenceLoad { .. } => "persistence-load",
            WatchError::PersistenceSave { .. } => "persistence-save",
            WatchError::Dispatch { .. } => "dispatch",
        }
    }

    /// Whether the repeating loop should simply try again next interval.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WatchError::Fetch(_) | WatchError::Parse(_) | WatchError::Dispatch { .. }
        )
    }
}
