//! Error taxonomy for the Dify console API engine

use thiserror::Error;

/// Errors raised by the executor, the collection fetcher and the endpoint wrappers.
///
/// `ExhaustedRetries` is terminal for one logical call; whether it aborts the
/// whole run depends on the caller (login and listing propagate it, per-app
/// bulk units isolate it).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Method name outside GET/POST/DELETE. Never retried.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("API call failed after {attempts} attempts: {url}")]
    ExhaustedRetries { url: String, attempts: u32 },

    /// Aggregated listing does not match the total reported by the first page.
    #[error("app count mismatch: server reported {expected}, fetched {received}")]
    ConsistencyFault { expected: u64, received: u64 },

    #[error("login failed: {0}")]
    AuthenticationFailure(String),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("concurrency limiter closed")]
    LimiterClosed,
}

impl ApiError {
    /// True for the errors that end a logical call after the retry budget ran out
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ApiError::ExhaustedRetries { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
