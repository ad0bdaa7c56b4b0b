//! Client configuration.

use std::fmt;
use std::time::Duration;

use reelgen_core::PollConfig;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ClientError;

/// Default API origin.
pub const DEFAULT_API_BASE: &str = "https://api.klingai.com";

/// Default status endpoint; the task id is appended as a path segment.
pub const DEFAULT_STATUS_PATH: &str = "/v1/videos/image2video";

const ENV_API_BASE: &str = "REELGEN_API_BASE";
const ENV_STATUS_PATH: &str = "REELGEN_STATUS_PATH";
const ENV_ACCESS_KEY: &str = "REELGEN_ACCESS_KEY";
const ENV_SECRET_KEY: &str = "REELGEN_SECRET_KEY";
const ENV_POLL_MAX_ATTEMPTS: &str = "REELGEN_POLL_MAX_ATTEMPTS";
const ENV_POLL_INTERVAL_MS: &str = "REELGEN_POLL_INTERVAL_MS";
const ENV_HTTP_TIMEOUT_MS: &str = "REELGEN_HTTP_TIMEOUT_MS";

/// HMAC secret used to sign bearer tokens.
///
/// Zeroized on drop and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([redacted])")
    }
}

/// Endpoint, credentials and poll budget for talking to the video API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin, e.g. `https://api.klingai.com`
    pub base_url: String,
    /// Status endpoint path, e.g. `/v1/videos/image2video`
    pub status_path: String,
    /// Access key id; becomes the `iss` claim
    pub access_key: String,
    /// Secret the tokens are signed with
    pub secret_key: SecretKey,
    pub poll: PollConfig,
    /// Per-request timeout for status checks
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Default per-request timeout.
    pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a configuration for the default endpoint.
    pub fn new(access_key: impl Into<String>, secret_key: SecretKey) -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
            access_key: access_key.into(),
            secret_key,
            poll: PollConfig::default(),
            http_timeout: Self::DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `REELGEN_ACCESS_KEY`
    /// - `REELGEN_SECRET_KEY`
    ///
    /// Optional:
    /// - `REELGEN_API_BASE` (default [`DEFAULT_API_BASE`])
    /// - `REELGEN_STATUS_PATH` (default [`DEFAULT_STATUS_PATH`])
    /// - `REELGEN_POLL_MAX_ATTEMPTS` (default 120)
    /// - `REELGEN_POLL_INTERVAL_MS` (default 3000)
    /// - `REELGEN_HTTP_TIMEOUT_MS` (default 30000, must be positive)
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let access_key = get(ENV_ACCESS_KEY).ok_or(ClientError::MissingEnv(ENV_ACCESS_KEY))?;
        let secret_key = get(ENV_SECRET_KEY)
            .map(|secret| SecretKey::new(secret.into_bytes()))
            .ok_or(ClientError::MissingEnv(ENV_SECRET_KEY))?;

        let mut config = Self::new(access_key, secret_key);
        if let Some(base_url) = get(ENV_API_BASE) {
            config.base_url = base_url;
        }
        if let Some(status_path) = get(ENV_STATUS_PATH) {
            config.status_path = status_path;
        }
        if let Some(raw) = get(ENV_POLL_MAX_ATTEMPTS) {
            let max_attempts: u32 = parse_env(ENV_POLL_MAX_ATTEMPTS, &raw)?;
            config.poll = config.poll.with_max_attempts(max_attempts);
        }
        if let Some(raw) = get(ENV_POLL_INTERVAL_MS) {
            let millis: u64 = parse_env(ENV_POLL_INTERVAL_MS, &raw)?;
            config.poll = config.poll.with_interval(Duration::from_millis(millis));
        }
        if let Some(raw) = get(ENV_HTTP_TIMEOUT_MS) {
            let millis: u64 = parse_env(ENV_HTTP_TIMEOUT_MS, &raw)?;
            if millis == 0 {
                return Err(ClientError::InvalidEnv {
                    name: ENV_HTTP_TIMEOUT_MS,
                    reason: "must be positive".to_string(),
                });
            }
            config.http_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_status_path(mut self, status_path: impl Into<String>) -> Self {
        self.status_path = status_path.into();
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

fn parse_env<T>(name: &'static str, raw: &str) -> Result<T, ClientError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ClientError::InvalidEnv {
        name,
        reason: format!("{raw:?}: {e}"),
    })
}
