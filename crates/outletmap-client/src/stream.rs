//! Incremental reader for the streamed chat answer.

use std::time::Duration;

use crate::decode::Utf8Decoder;
use crate::error::ClientError;

/// A chat answer being received.
///
/// Wraps the open response and yields decoded text increments as they arrive.
/// Each read is bounded by the client's idle timeout.
pub struct ChatStream {
    response: reqwest::Response,
    decoder: Utf8Decoder,
    idle_timeout: Duration,
    url: String,
    finished: bool,
}

impl ChatStream {
    pub(crate) fn new(response: reqwest::Response, idle_timeout: Duration, url: String) -> Self {
        Self {
            response,
            decoder: Utf8Decoder::new(),
            idle_timeout,
            url,
            finished: false,
        }
    }

    /// Reads the next non-empty text increment, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Timeout`] if no bytes arrive within the idle timeout.
    /// - [`ClientError::Http`] if the connection fails mid-body.
    pub async fn next_text(&mut self) -> Result<Option<String>, ClientError> {
        loop {
            if self.finished {
                return Ok(None);
            }

            let chunk = tokio::time::timeout(self.idle_timeout, self.response.chunk())
                .await
                .map_err(|_| ClientError::Timeout {
                    url: self.url.clone(),
                    secs: self.idle_timeout.as_secs(),
                })??;

            if let Some(bytes) = chunk {
                let text = self.decoder.push(&bytes);
                if text.is_empty() {
                    // Only part of a multi-byte character so far.
                    continue;
                }
                return Ok(Some(text));
            }

            self.finished = true;
            let tail = self.decoder.finish();
            if !tail.is_empty() {
                return Ok(Some(tail));
            }
        }
    }

    /// Reads the remainder of the stream into one string.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::next_text`].
    pub async fn collect_text(mut self) -> Result<String, ClientError> {
        let mut full = String::new();
        while let Some(text) = self.next_text().await? {
            full.push_str(&text);
        }
        Ok(full)
    }
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream")
            .field("url", &self.url)
            .field("status", &self.response.status())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
