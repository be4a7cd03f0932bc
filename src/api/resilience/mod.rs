//! Retry, concurrency limiting and call logging for the console API

pub mod config;
pub mod limiter;
pub mod logging;
pub mod retry;

pub use config::{ConcurrencyConfig, LogLevel, MonitoringConfig, ResilienceConfig, ResilienceConfigBuilder};
pub use limiter::{ConcurrencyLimiter, InFlight, LimiterStats};
pub use logging::{ApiLogger, CallContext};
pub use retry::{AttemptOutcome, FailureKind, RetryConfig, RetryPolicy};
