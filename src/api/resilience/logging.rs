//! Structured logging with correlation tracking for console API calls
//!
//! Every logical call gets a context; each failed attempt, backoff and the
//! final outcome are logged as JSON payloads carrying the same correlation id.

use super::config::{LogLevel, MonitoringConfig};
use super::retry::FailureKind;
use crate::api::models::Method;
use log::{debug, error, info, warn};
use serde_json::json;
use std::time::{Duration, Instant};

/// Structured logger for API calls
#[derive(Debug, Clone)]
pub struct ApiLogger {
    config: MonitoringConfig,
}

/// Context for a single logical call
#[derive(Debug, Clone)]
pub struct CallContext {
    pub correlation_id: String,
    pub method: Method,
    pub url: String,
    pub start_time: Instant,
}

impl CallContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl ApiLogger {
    pub fn new(config: MonitoringConfig) -> Self {
        Self { config }
    }

    /// Start tracking a logical call
    pub fn start_call(&self, method: Method, url: &str) -> CallContext {
        let correlation_id = if self.config.correlation_ids {
            uuid::Uuid::new_v4().to_string()
        } else {
            String::from("-")
        };

        let context = CallContext {
            correlation_id,
            method,
            url: url.to_string(),
            start_time: Instant::now(),
        };

        if self.config.request_logging && self.should_log(LogLevel::Debug) {
            let log_data = json!({
                "event": "call_started",
                "correlation_id": context.correlation_id,
                "method": context.method.as_str(),
                "url": context.url,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });
            debug!("API Call Started: {}", log_data);
        }

        context
    }

    /// Log one failed attempt with its index and status code
    pub fn log_attempt_failure(&self, context: &CallContext, attempt: u32, max_attempts: u32, failure: &FailureKind) {
        if !self.should_log(LogLevel::Warn) {
            return;
        }

        let log_data = json!({
            "event": "attempt_failed",
            "correlation_id": context.correlation_id,
            "method": context.method.as_str(),
            "url": context.url,
            "attempt": attempt,
            "max_attempts": max_attempts,
            "status_code": failure.status_code(),
            "error": failure.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        warn!("Attempt {} failed: {} - {} {}", attempt, failure, context.url, log_data);
    }

    pub fn log_backoff(&self, context: &CallContext, attempt: u32, delay: Duration) {
        if !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "retry_backoff",
            "correlation_id": context.correlation_id,
            "attempt": attempt,
            "delay_ms": delay.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("Retry Backoff: {}", log_data);
    }

    pub fn log_success(&self, context: &CallContext, attempt: u32, status_code: u16) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "call_completed",
            "correlation_id": context.correlation_id,
            "method": context.method.as_str(),
            "url": context.url,
            "attempts": attempt,
            "status_code": status_code,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if attempt > 1 {
            info!("API Call Recovered: {}", log_data);
        } else {
            debug!("API Call Completed: {}", log_data);
        }
    }

    pub fn log_exhausted(&self, context: &CallContext, attempts: u32) {
        if !self.should_log(LogLevel::Error) {
            return;
        }

        let log_data = json!({
            "event": "call_exhausted",
            "correlation_id": context.correlation_id,
            "method": context.method.as_str(),
            "url": context.url,
            "attempts": attempts,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        error!("API Call Failed: {}", log_data);
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level <= self.config.log_level
    }
}
