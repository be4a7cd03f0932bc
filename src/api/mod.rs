//! Dify console API engine
//!
//! A bounded, retrying executor shared by every call of a run, the endpoint
//! wrappers built on top of it, and the paginated app listing.

pub mod client;
pub mod constants;
pub mod error;
pub mod executor;
pub mod models;
pub mod pagination;
pub mod resilience;

pub use client::DifyClient;
pub use error::{ApiError, ApiResult};
pub use executor::{Executor, ExecutorStats};
pub use models::{App, AppPage, ImportResponse, Method, RequestDescriptor};
pub use pagination::{fetch_all, page_count};
pub use resilience::{
    ApiLogger, CallContext, ConcurrencyConfig, ConcurrencyLimiter, LimiterStats, LogLevel, MonitoringConfig,
    ResilienceConfig, RetryConfig, RetryPolicy,
};
