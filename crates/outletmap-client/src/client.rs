//! HTTP client for the outlet map backend.
//!
//! Three endpoints: the outlet list, per-outlet catchment points, and the
//! streamed chat answer. Nothing is retried; every failure is returned to the
//! caller as a typed [`ClientError`].

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use outletmap_core::{AppConfig, CatchmentPoint, Outlet, OutletId};

use crate::error::ClientError;
use crate::stream::ChatStream;

/// Everything but RFC 3986 unreserved characters is escaped in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Client for the outlet, catchment, and chat endpoints.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct OutletClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    chat_idle_timeout: Duration,
}

impl OutletClient {
    /// Creates a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            config.chat_idle_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client pointed at `base_url` (for testing with wiremock, or a
    /// non-default backend).
    ///
    /// `request_timeout_secs` bounds the JSON requests end to end.
    /// `chat_idle_timeout_secs` bounds the wait for the chat response headers
    /// and for each body chunk after that; the stream as a whole may run longer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` does not parse as
    /// an absolute URL, or [`ClientError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        request_timeout_secs: u64,
        chat_idle_timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let trimmed = base_url.trim_end_matches('/');
        reqwest::Url::parse(trimmed).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: trimmed.to_owned(),
            request_timeout: Duration::from_secs(request_timeout_secs),
            chat_idle_timeout: Duration::from_secs(chat_idle_timeout_secs),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches every outlet.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or timeout.
    /// - [`ClientError::UnexpectedStatus`] on any non-2xx status.
    /// - [`ClientError::Deserialize`] if the body is not an outlet array.
    pub async fn fetch_outlets(&self) -> Result<Vec<Outlet>, ClientError> {
        let url = self.outlets_url();
        let outlets: Vec<Outlet> = self.get_json(&url, "outlet list").await?;
        tracing::debug!(count = outlets.len(), "fetched outlets");
        Ok(outlets)
    }

    /// Fetches the catchment points for one outlet.
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_outlets`].
    pub async fn fetch_catchments(
        &self,
        outlet_id: &OutletId,
    ) -> Result<Vec<CatchmentPoint>, ClientError> {
        let url = self.catchment_url(outlet_id);
        let points: Vec<CatchmentPoint> = self
            .get_json(&url, &format!("catchment of outlet {outlet_id}"))
            .await?;
        tracing::debug!(outlet_id = %outlet_id, count = points.len(), "fetched catchments");
        Ok(points)
    }

    /// Posts a chat question and returns the answer as an open stream.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] if the request cannot be sent.
    /// - [`ClientError::Timeout`] if no response headers arrive within the
    ///   chat idle timeout.
    /// - [`ClientError::UnexpectedStatus`] on any non-2xx status.
    /// - [`ClientError::MissingBody`] if the response declares an empty body.
    pub async fn open_chat(&self, message: &str) -> Result<ChatStream, ClientError> {
        let url = self.chat_url();
        let send = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send();

        let response = tokio::time::timeout(self.chat_idle_timeout, send)
            .await
            .map_err(|_| ClientError::Timeout {
                url: url.clone(),
                secs: self.chat_idle_timeout.as_secs(),
            })??;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        if status == reqwest::StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(ClientError::MissingBody { url });
        }

        tracing::debug!(%url, "chat stream opened");
        Ok(ChatStream::new(response, self.chat_idle_timeout, url))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &str,
    ) -> Result<T, ClientError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| ClientError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    fn outlets_url(&self) -> String {
        format!("{}/outlets", self.base_url)
    }

    /// The outlet id is encoded as a single path segment.
    fn catchment_url(&self, outlet_id: &OutletId) -> String {
        let segment = utf8_percent_encode(outlet_id.as_str(), PATH_SEGMENT);
        format!("{}/outlet/{segment}/catchment", self.base_url)
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
