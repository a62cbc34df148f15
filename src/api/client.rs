//! HTTP client construction and authenticated client handles

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Settings;

use super::error::ApiError;
use super::token::TokenProvider;

/// Build the pooled HTTP client shared by every component in a session.
pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent("directory-cli/0.1")
        .build()
        .expect("Failed to build HTTP client")
}

/// Await an API future unless the session is canceled first.
///
/// Dropping the in-flight future aborts the underlying request, so a canceled
/// wait does not linger on the wire.
pub(crate) async fn cancellable<F>(
    cancel: &CancellationToken,
    future: F,
) -> Result<F::Output, ApiError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Canceled),
        output = future => Ok(output),
    }
}

/// Hands out short-lived authenticated clients, refreshing the shared token
/// through the [`TokenProvider`] when needed.
pub struct ClientFactory {
    settings: Arc<Settings>,
    tokens: Arc<TokenProvider>,
    http: reqwest::Client,
}

impl ClientFactory {
    pub fn new(settings: Arc<Settings>, tokens: Arc<TokenProvider>, http: reqwest::Client) -> Self {
        Self {
            settings,
            tokens,
            http,
        }
    }

    /// Return a client carrying a currently-valid bearer token.
    pub async fn get_client(&self, cancel: &CancellationToken) -> Result<ApiClient, ApiError> {
        let access_token = self.tokens.get_access_token(cancel).await?;

        Ok(ApiClient {
            base_url: self.settings.base_url.clone(),
            http: self.http.clone(),
            access_token,
        })
    }
}

/// A request handle bound to one bearer token.
///
/// Cheap to create and meant to be used for a single operation. The pooled
/// transport behind it is shared, so connections are reused across clients.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    access_token: String,
}

impl ApiClient {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a GET request with the bearer token applied.
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.get(url).bearer_auth(&self.access_token)
    }

    /// Start a POST request with the bearer token applied.
    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.post(url).bearer_auth(&self.access_token)
    }

    /// Start a PATCH request with the bearer token applied.
    pub fn patch(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.patch(url).bearer_auth(&self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancellable_returns_the_future_output() {
        let cancel = CancellationToken::new();
        let result = cancellable(&cancel, async { 42 }).await;

        assert!(matches!(result, Ok(42)));
    }

    #[tokio::test]
    async fn test_cancellable_short_circuits_when_already_canceled() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = cancellable(&cancel, async { 42 }).await;

        assert!(matches!(result, Err(ApiError::Canceled)));
    }
}
