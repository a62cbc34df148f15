//! Structured logging with correlation tracking for directory API operations
//!
//! Emits JSON log events for token refreshes and user operations so a session
//! can be reconstructed from the log file. Credentials and tokens are never
//! included in any event.

use std::time::{Duration, Instant};

use log::{debug, error, info};
use serde_json::{Value, json};
use uuid::Uuid;

use super::error::ApiError;

/// Structured logger for API operations with correlation tracking.
#[derive(Debug, Clone, Default)]
pub struct ApiLogger;

/// Context for a single API operation.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Unique correlation ID for this operation
    pub correlation_id: String,
    /// Operation name (list_users, create_user, update_user)
    pub operation: &'static str,
    /// Start time for duration tracking
    pub start_time: Instant,
}

impl OperationContext {
    /// Elapsed time since the operation started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl ApiLogger {
    pub fn new() -> Self {
        Self
    }

    /// Start tracking a new operation and log the start event.
    pub fn start_operation(&self, operation: &'static str) -> OperationContext {
        let context = OperationContext {
            correlation_id: Uuid::new_v4().to_string(),
            operation,
            start_time: Instant::now(),
        };

        let log_data = json!({
            "event": "operation_started",
            "correlation_id": context.correlation_id,
            "operation": context.operation,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        info!("API Operation Started: {}", log_data);

        context
    }

    /// Log a successful operation, merging `detail` into the event.
    pub fn complete_operation(&self, context: &OperationContext, detail: Value) {
        let mut log_data = json!({
            "event": "operation_completed",
            "correlation_id": context.correlation_id,
            "operation": context.operation,
            "duration_ms": context.elapsed().as_millis() as u64,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        if let (Some(base), Value::Object(extra)) = (log_data.as_object_mut(), detail) {
            base.extend(extra);
        }

        info!("API Operation Completed: {}", log_data);
    }

    /// Log a failed operation. Cancellations are logged as debug, not error.
    pub fn fail_operation(&self, context: &OperationContext, error: &ApiError) {
        let log_data = json!({
            "event": "operation_failed",
            "correlation_id": context.correlation_id,
            "operation": context.operation,
            "duration_ms": context.elapsed().as_millis() as u64,
            "error": error.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if error.is_canceled() {
            debug!("API Operation Canceled: {}", log_data);
        } else {
            error!("API Operation Failed: {}", log_data);
        }
    }

    /// Log a completed token refresh, including time spent on admission.
    pub fn token_refresh(
        &self,
        correlation_id: &str,
        admission_delay: Duration,
        exchange_duration: Duration,
        lifetime_secs: u64,
    ) {
        let log_data = json!({
            "event": "token_refresh",
            "correlation_id": correlation_id,
            "rate_limit_delay_ms": admission_delay.as_millis() as u64,
            "exchange_duration_ms": exchange_duration.as_millis() as u64,
            "expires_in_secs": lifetime_secs,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        info!("Token Refresh: {}", log_data);
    }

    /// Log a failed token refresh. Cancellations are logged as debug.
    pub fn token_refresh_failed(&self, correlation_id: &str, error: &ApiError) {
        let log_data = json!({
            "event": "token_refresh_failed",
            "correlation_id": correlation_id,
            "error": error.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if error.is_canceled() {
            debug!("Token Refresh Canceled: {}", log_data);
        } else {
            error!("Token Refresh Failed: {}", log_data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_context_carries_a_unique_correlation_id() {
        let logger = ApiLogger::new();
        let first = logger.start_operation("list_users");
        let second = logger.start_operation("list_users");

        assert_eq!(first.operation, "list_users");
        assert_ne!(first.correlation_id, second.correlation_id);
        assert!(Uuid::parse_str(&first.correlation_id).is_ok());
    }

    #[test]
    fn test_elapsed_grows_from_the_start_instant() {
        let context = OperationContext {
            correlation_id: "test".to_string(),
            operation: "create_user",
            start_time: Instant::now() - Duration::from_millis(5),
        };

        assert!(context.elapsed() >= Duration::from_millis(5));
    }
}
