//! `reqwest` implementation of [`StatusCheck`].

use std::time::Duration;

use async_trait::async_trait;
use reelgen_core::{StatusCheck, StatusResponse, TaskId};
use reqwest::Url;

use crate::{ClientConfig, ClientError};

/// Upper bound on establishing a connection, capped by the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Queries `GET {base_url}{status_path}/{task_id}` with a bearer token.
///
/// The JSON body is decoded into a [`StatusResponse`] regardless of the HTTP
/// status, since rejections (`code != 0`) often arrive with 4xx statuses.
/// Only bodies that fail to decode become errors.
#[derive(Debug, Clone)]
pub struct HttpStatusCheck {
    http: reqwest::Client,
    base_url: Url,
    status_path: String,
}

impl HttpStatusCheck {
    /// Create a status check with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL, or [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: impl AsRef<str>,
        status_path: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, status_path, ClientConfig::DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a status check whose requests fail after `timeout`.
    pub fn with_timeout(
        base_url: impl AsRef<str>,
        status_path: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url.as_ref())?;
        let http = Self::client_builder(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            status_path: status_path.into(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_timeout(&config.base_url, config.status_path.clone(), config.http_timeout)
    }

    /// The `reqwest` builder used for status checks: request timeout of
    /// `timeout` and a connect timeout of at most [`CONNECT_TIMEOUT`].
    pub fn client_builder(timeout: Duration) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(CONNECT_TIMEOUT))
    }

    /// Use a preconfigured `reqwest` client (proxies, custom TLS).
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// The status URL for `task_id`.
    ///
    /// The task id is appended as a single percent-encoded path segment.
    pub fn status_url(&self, task_id: &TaskId) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `parse_base_url`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(self.status_path.split('/').filter(|s| !s.is_empty()))
                .push(task_id.as_str());
        }
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid("expected an http(s) URL".to_string()));
    }
    Ok(url)
}

#[async_trait]
impl StatusCheck for HttpStatusCheck {
    type Error = ClientError;

    async fn check(
        &self,
        task_id: &TaskId,
        credential: &str,
    ) -> Result<StatusResponse, Self::Error> {
        let url = self.status_url(task_id);
        tracing::debug!(%url, "Querying task status");

        let response = self.http.get(url).bearer_auth(credential).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<StatusResponse>(&body) {
            Ok(decoded) => {
                tracing::debug!(
                    task_id = %task_id,
                    http_status = status.as_u16(),
                    code = decoded.code,
                    task_status = ?decoded.task_status(),
                    "Task status received"
                );
                Ok(decoded)
            }
            Err(e) if status.is_success() => {
                tracing::warn!(task_id = %task_id, error = %e, "Undecodable status response");
                Err(ClientError::Decode(e))
            }
            Err(_) => {
                let body = String::from_utf8_lossy(&body).into_owned();
                tracing::warn!(
                    task_id = %task_id,
                    http_status = status.as_u16(),
                    "Status request failed"
                );
                Err(ClientError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
