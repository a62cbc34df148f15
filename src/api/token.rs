//! OAuth2 client-credentials token acquisition and caching
//!
//! One token is shared by every operation in the session. The cache sits
//! behind an async mutex that stays held across the whole refresh, so
//! concurrent callers that miss the cache collapse into a single exchange.
//! A safety buffer retires tokens shortly before their real expiry so a
//! token handed out is never about to lapse mid-request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::Settings;

use super::client::cancellable;
use super::constants;
use super::error::ApiError;
use super::logging::ApiLogger;
use super::rate_limiter::RateLimiter;

/// Fallback lifetime when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// An access token together with its real expiry instant.
#[derive(Debug, Clone)]
pub struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn new(access_token: String, lifetime: Duration) -> Self {
        Self {
            access_token,
            expires_at: Instant::now() + lifetime,
        }
    }

    /// A token is usable while `now` is more than `safety_buffer` ahead of
    /// its expiry. Tokens shorter-lived than the buffer are stale at birth.
    fn is_usable(&self, now: Instant, safety_buffer: Duration) -> bool {
        now + safety_buffer < self.expires_at
    }
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Acquires and caches the bearer token used against the directory API.
pub struct TokenProvider {
    settings: Arc<Settings>,
    limiter: Arc<RateLimiter>,
    http: reqwest::Client,
    logger: ApiLogger,
    cache: Mutex<Option<CachedToken>>,
    safety_buffer: Duration,
}

impl TokenProvider {
    pub fn new(settings: Arc<Settings>, limiter: Arc<RateLimiter>, http: reqwest::Client) -> Self {
        Self::with_safety_buffer(
            settings,
            limiter,
            http,
            Duration::from_secs(constants::TOKEN_SAFETY_BUFFER_SECS),
        )
    }

    /// Override the expiry safety buffer, mainly for tests that work with
    /// short-lived tokens.
    pub fn with_safety_buffer(
        settings: Arc<Settings>,
        limiter: Arc<RateLimiter>,
        http: reqwest::Client,
        safety_buffer: Duration,
    ) -> Self {
        Self {
            settings,
            limiter,
            http,
            logger: ApiLogger::new(),
            cache: Mutex::new(None),
            safety_buffer,
        }
    }

    /// Return a usable access token, refreshing through the rate limiter when
    /// the cached one is missing or about to expire.
    ///
    /// The cache lock is held across the refresh. Callers that arrive while a
    /// refresh is in flight wait for it and then reuse its result instead of
    /// starting their own exchange. A failed refresh leaves the cache as it
    /// was, so the next call tries again.
    pub async fn get_access_token(&self, cancel: &CancellationToken) -> Result<String, ApiError> {
        let mut cache = cancellable(cancel, self.cache.lock()).await?;

        if let Some(token) = cache.as_ref() {
            if token.is_usable(Instant::now(), self.safety_buffer) {
                return Ok(token.access_token.clone());
            }
        }

        let refreshed = self.refresh_token(cancel).await?;
        let access_token = refreshed.access_token.clone();
        *cache = Some(refreshed);
        Ok(access_token)
    }

    async fn refresh_token(&self, cancel: &CancellationToken) -> Result<CachedToken, ApiError> {
        let correlation_id = Uuid::new_v4().to_string();

        let admission_started = Instant::now();
        self.limiter.admit(cancel).await?;
        let admission_delay = admission_started.elapsed();

        let audience = constants::audience(&self.settings.base_url);
        let request = TokenRequest {
            grant_type: constants::CLIENT_CREDENTIALS_GRANT,
            client_id: &self.settings.client_id,
            client_secret: &self.settings.client_secret,
            audience: &audience,
        };

        let exchange_started = Instant::now();
        let response = cancellable(
            cancel,
            self.http
                .post(constants::token_endpoint(&self.settings.base_url))
                .form(&request)
                .send(),
        )
        .await?
        .map_err(|e| {
            let error = ApiError::Auth {
                reason: format!("token endpoint unreachable: {}", e),
            };
            self.logger.token_refresh_failed(&correlation_id, &error);
            error
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = cancellable(cancel, response.text())
                .await?
                .unwrap_or_else(|_| "Unknown error".to_string());
            let error = ApiError::Auth {
                reason: format!("token endpoint returned {}: {}", status, body),
            };
            self.logger.token_refresh_failed(&correlation_id, &error);
            return Err(error);
        }

        let token: TokenResponse = cancellable(cancel, response.json()).await?.map_err(|e| {
            let error = ApiError::Auth {
                reason: format!("malformed token response: {}", e),
            };
            self.logger.token_refresh_failed(&correlation_id, &error);
            error
        })?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS));
        self.logger.token_refresh(
            &correlation_id,
            admission_delay,
            exchange_started.elapsed(),
            lifetime.as_secs(),
        );

        Ok(CachedToken::new(token.access_token, lifetime))
    }
}
