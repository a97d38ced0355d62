//! Content sources: multipart uploads and remote links.

use crate::error::FetchError;
use axum::extract::multipart::Field;
use cass_core::config::FetchConfig;
use cass_storage::ByteStream;
use futures::{StreamExt, TryStreamExt};
use std::io;
use std::time::Duration;

/// Name of the multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Bound on establishing a connection, TLS handshake included.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Bound on receiving the response status and headers once connected.
pub const RESPONSE_HEADER_TIMEOUT: Duration = Duration::from_secs(20);

/// An uploaded file: its content and the filename the client declared.
pub struct Upload<'a> {
    pub filename: String,
    pub stream: ByteStream<'a>,
}

impl<'a> Upload<'a> {
    /// Take `field` as the upload if it is the `file` field and carries a
    /// filename. A `file` part without one is a plain form value, not a file.
    pub fn from_field(field: Field<'a>) -> Option<Self> {
        if field.name() != Some(FILE_FIELD) {
            return None;
        }
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return None,
        };
        let stream = field.map_err(io::Error::other).boxed();
        Some(Self { filename, stream })
    }
}

/// Downloads remote links for storage.
///
/// Every fetch uses its own client, so cookies set by one remote never
/// reach another request.
#[derive(Clone, Debug)]
pub struct LinkFetcher {
    user_agent: String,
    allow_error_status: bool,
    connect_timeout: Duration,
    header_timeout: Duration,
}

impl LinkFetcher {
    /// Create a fetcher from configuration with the standard timeouts.
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            allow_error_status: config.allow_error_status,
            connect_timeout: CONNECT_TIMEOUT,
            header_timeout: RESPONSE_HEADER_TIMEOUT,
        }
    }

    /// Override the connect and response-header timeouts.
    pub fn with_timeouts(mut self, connect: Duration, header: Duration) -> Self {
        self.connect_timeout = connect;
        self.header_timeout = header;
        self
    }

    /// Deadline for `send()` to produce the response head.
    ///
    /// `send()` also connects, and the client enforces `connect_timeout` on
    /// that step itself, so the head wait keeps its full allowance even after
    /// a connect that used most of its own.
    fn response_deadline(&self) -> Duration {
        self.connect_timeout + self.header_timeout
    }

    fn client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .connect_timeout(self.connect_timeout)
            .cookie_store(true)
            .build()
            .map_err(FetchError::from_reqwest)
    }

    /// GET `link` and return the response body as a stream.
    ///
    /// Only connecting and receiving the headers are time-bounded; the body
    /// is read at whatever pace the store consumes it.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, link: &str) -> Result<ByteStream<'static>, FetchError> {
        let url = reqwest::Url::parse(link).map_err(|e| FetchError::InvalidUrl {
            url: link.to_string(),
            reason: e.to_string(),
        })?;

        let client = self.client()?;
        let deadline = self.response_deadline();
        let response = tokio::time::timeout(deadline, client.get(url).send())
            .await
            .map_err(|_| {
                FetchError::TimeoutExceeded(format!(
                    "no response from {link} within {}s",
                    deadline.as_secs_f64()
                ))
            })?
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            if !self.allow_error_status {
                return Err(FetchError::NonSuccessStatus { status });
            }
            tracing::warn!(status = %status, "Storing body of unsuccessful response");
        }
        tracing::debug!(status = %status, content_length = ?response.content_length(), "Fetching link");

        Ok(response.bytes_stream().map_err(io::Error::other).boxed())
    }
}
