//! User listing, creation, and update against the directory API
//!
//! Every operation follows the same sequence: admit through the shared rate
//! limiter, obtain an authenticated client (which may trigger its own
//! rate-limited token exchange), then perform the HTTP call. Local input
//! validation happens before admission so rejected requests never spend any
//! of the request budget.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;

use super::client::{ClientFactory, cancellable};
use super::constants;
use super::error::ApiError;
use super::logging::ApiLogger;
use super::models::{CreateUserRequest, NewUser, PageCursor, UserRecord, UserUpdate};
use super::rate_limiter::RateLimiter;

/// High-level user operations, each paced by the shared rate limiter.
pub struct UserOperations {
    settings: Arc<Settings>,
    limiter: Arc<RateLimiter>,
    factory: ClientFactory,
    logger: ApiLogger,
}

impl UserOperations {
    pub fn new(settings: Arc<Settings>, limiter: Arc<RateLimiter>, factory: ClientFactory) -> Self {
        Self {
            settings,
            limiter,
            factory,
            logger: ApiLogger::new(),
        }
    }

    /// Fetch one page of users. An empty page means the listing is exhausted.
    pub async fn list_users(
        &self,
        cursor: PageCursor,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserRecord>, ApiError> {
        let context = self.logger.start_operation("list_users");
        let result = self.fetch_page(cursor, cancel).await;

        match &result {
            Ok(users) => self.logger.complete_operation(
                &context,
                json!({
                    "page": cursor.page,
                    "per_page": cursor.per_page,
                    "returned": users.len(),
                }),
            ),
            Err(error) => self.logger.fail_operation(&context, error),
        }

        result
    }

    /// Create a user on the configured connection. New accounts start with
    /// an unverified email address.
    pub async fn create_user(
        &self,
        new_user: &NewUser,
        cancel: &CancellationToken,
    ) -> Result<UserRecord, ApiError> {
        let context = self.logger.start_operation("create_user");
        let result = self.submit_create(new_user, cancel).await;

        match &result {
            Ok(user) => self
                .logger
                .complete_operation(&context, json!({ "user_id": user.user_id })),
            Err(error) => self.logger.fail_operation(&context, error),
        }

        result
    }

    /// Apply the non-blank fields of `update` to an existing user.
    ///
    /// An update with nothing to send is rejected locally with
    /// [`ApiError::Validation`] and performs no network traffic.
    pub async fn update_user(
        &self,
        user_id: &str,
        update: UserUpdate,
        cancel: &CancellationToken,
    ) -> Result<UserRecord, ApiError> {
        let context = self.logger.start_operation("update_user");
        let result = self.submit_update(user_id, update, cancel).await;

        match &result {
            Ok(user) => self
                .logger
                .complete_operation(&context, json!({ "user_id": user.user_id })),
            Err(error) => self.logger.fail_operation(&context, error),
        }

        result
    }

    async fn fetch_page(
        &self,
        cursor: PageCursor,
        cancel: &CancellationToken,
    ) -> Result<Vec<UserRecord>, ApiError> {
        self.limiter.admit(cancel).await?;
        let client = self.factory.get_client(cancel).await?;

        let request = client
            .get(&constants::users_endpoint(client.base_url()))
            .query(&[
                ("page", cursor.page.to_string()),
                ("per_page", cursor.per_page.to_string()),
                ("include_totals", "false".to_string()),
            ]);

        let response = cancellable(cancel, request.send()).await??;
        Self::parse_response(response, cancel).await
    }

    async fn submit_create(
        &self,
        new_user: &NewUser,
        cancel: &CancellationToken,
    ) -> Result<UserRecord, ApiError> {
        let payload = CreateUserRequest {
            email: &new_user.email,
            password: &new_user.password,
            given_name: &new_user.given_name,
            family_name: &new_user.family_name,
            connection: &self.settings.connection_name,
            email_verified: false,
        };

        self.limiter.admit(cancel).await?;
        let client = self.factory.get_client(cancel).await?;

        let request = client
            .post(&constants::users_endpoint(client.base_url()))
            .json(&payload);

        let response = cancellable(cancel, request.send()).await??;
        Self::parse_response(response, cancel).await
    }

    async fn submit_update(
        &self,
        user_id: &str,
        update: UserUpdate,
        cancel: &CancellationToken,
    ) -> Result<UserRecord, ApiError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ApiError::Validation("a user id is required".to_string()));
        }

        let update = update.normalized();
        if update.is_empty() {
            return Err(ApiError::Validation(
                "at least one field must be provided to update".to_string(),
            ));
        }

        self.limiter.admit(cancel).await?;
        let client = self.factory.get_client(cancel).await?;

        let request = client
            .patch(&constants::user_endpoint(client.base_url(), user_id))
            .json(&update);

        let response = cancellable(cancel, request.send()).await??;
        Self::parse_response(response, cancel).await
    }

    /// Decode a response body, mapping failure statuses to [`ApiError::Remote`].
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
        cancel: &CancellationToken,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = cancellable(cancel, response.text())
                .await?
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(cancellable(cancel, response.json()).await??)
    }
}
