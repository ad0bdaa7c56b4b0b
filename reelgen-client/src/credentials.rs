//! Bearer token cache.

use reelgen_auth::{Token, TokenPolicy, TokenSigner};

use crate::{ClientConfig, SecretKey};

/// Issues bearer tokens and hands out the cached one until it nears expiry.
///
/// Owned by the caller and passed by `&mut`; there is no global token state.
/// Time is always supplied by the caller in Unix seconds.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    access_key: String,
    secret_key: SecretKey,
    signer: TokenSigner,
    refresh_margin_seconds: i64,
    current: Option<CachedToken>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: Token,
    issued_at: i64,
}

impl CredentialCache {
    /// Reissue this many seconds before `exp`.
    pub const DEFAULT_REFRESH_MARGIN_SECONDS: i64 = 60;

    pub fn new(access_key: impl Into<String>, secret_key: SecretKey) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key,
            signer: TokenSigner::default(),
            refresh_margin_seconds: Self::DEFAULT_REFRESH_MARGIN_SECONDS,
            current: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.access_key.clone(), config.secret_key.clone())
    }

    /// Issue tokens under `policy` instead of the default window.
    ///
    /// Drops any cached token.
    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.signer = TokenSigner::new(policy);
        self.current = None;
        self
    }

    pub fn with_refresh_margin(mut self, seconds: i64) -> Self {
        self.refresh_margin_seconds = seconds;
        self
    }

    /// A token valid at `now`, reusing the cached one when possible.
    ///
    /// A new token is issued when none is cached, when `now` is within the
    /// refresh margin of `exp`, or when `now` precedes the cached `nbf`.
    pub fn bearer(&mut self, now: i64) -> &Token {
        let fresh = self.is_fresh(now);
        let cached = match self.current.take() {
            Some(cached) if fresh => cached,
            _ => CachedToken {
                token: self
                    .signer
                    .issue(self.secret_key.expose(), &self.access_key, now),
                issued_at: now,
            },
        };
        &self.current.insert(cached).token
    }

    /// Forget the cached token so the next [`bearer`](Self::bearer) reissues.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// The `exp` of the cached token, if any.
    pub fn expires_at(&self) -> Option<i64> {
        let cached = self.current.as_ref()?;
        Some(
            cached
                .issued_at
                .saturating_add(self.signer.policy().validity_seconds),
        )
    }

    fn is_fresh(&self, now: i64) -> bool {
        let Some(cached) = &self.current else {
            return false;
        };
        let policy = self.signer.policy();
        let not_before = cached.issued_at.saturating_sub(policy.not_before_skew_seconds);
        let refresh_at = cached
            .issued_at
            .saturating_add(policy.validity_seconds)
            .saturating_sub(self.refresh_margin_seconds);

        not_before <= now && now < refresh_at
    }
}
