//! Page fetching.
//!
//! The watcher only needs "GET this URL, give me the body".  [`Transport`]
//! is that seam; [`HttpTransport`] is the real implementation and tests
//! substitute canned pages.

use std::time::Duration;

use tracing::debug;

use crate::error::TransportError;

/// Default request timeout for [`HttpTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub trait Transport {
    /// Fetch `url` and return the raw response body.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Blocking HTTP transport backed by [`reqwest`].
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Other(format!("could not build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Use an already configured client (proxies, TLS roots, ...).
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let request_error = |source| TransportError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(request_error)?;
        debug!(url, bytes = body.len(), "fetched page");
        Ok(body.to_vec())
    }
}
