//! Bounded retry executor
//!
//! Sends one logical request, retrying failed attempts after a fixed backoff,
//! while a shared limiter caps the number of attempts on the network at once.
//! The slot is taken per attempt and released before the backoff sleep, so a
//! call that is waiting to retry never blocks other calls.

use super::constants::headers;
use super::error::{ApiError, ApiResult};
use super::models::RequestDescriptor;
use super::resilience::{
    ApiLogger, AttemptOutcome, ConcurrencyLimiter, FailureKind, LimiterStats, ResilienceConfig, RetryPolicy,
};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// The engine instance shared by every component of a run.
///
/// Owns the pooled HTTP client and the concurrency semaphore; both are
/// released when the executor is dropped.
#[derive(Debug, Clone)]
pub struct Executor {
    http_client: reqwest::Client,
    retry_policy: RetryPolicy,
    limiter: ConcurrencyLimiter,
    api_logger: ApiLogger,
    counters: Arc<ExecutorCounters>,
}

#[derive(Debug, Default)]
struct ExecutorCounters {
    attempts: AtomicU64,
    failed_attempts: AtomicU64,
    backoff_sleeps: AtomicU64,
    exhausted_calls: AtomicU64,
}

/// Counters describing everything the executor sent so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorStats {
    pub attempts: u64,
    pub failed_attempts: u64,
    pub backoff_sleeps: u64,
    pub exhausted_calls: u64,
    pub limiter: LimiterStats,
}

enum Attempt {
    Done { status: u16, body: Vec<u8> },
    Failed(FailureKind),
}

impl Executor {
    pub fn new(config: &ResilienceConfig) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(60)) // exports of large workflows can be slow
            .connect_timeout(Duration::from_secs(10))
            .user_agent(headers::USER_AGENT)
            .build()?;

        Ok(Self::with_http_client(http_client, config))
    }

    /// Create an executor around a preconfigured HTTP client
    pub fn with_http_client(http_client: reqwest::Client, config: &ResilienceConfig) -> Self {
        Self {
            http_client,
            retry_policy: RetryPolicy::new(config.retry.clone()),
            limiter: ConcurrencyLimiter::new(&config.concurrency),
            api_logger: ApiLogger::new(config.monitoring.clone()),
            counters: Arc::new(ExecutorCounters::default()),
        }
    }

    /// Configured attempts per logical call
    pub fn default_attempts(&self) -> u32 {
        self.retry_policy.max_attempts()
    }

    /// Execute with the configured number of attempts
    pub async fn execute_default(&self, request: &RequestDescriptor) -> ApiResult<Value> {
        self.execute(request, self.default_attempts()).await
    }

    /// Execute one logical request.
    ///
    /// Returns the parsed JSON body of the first successful attempt (`{}` for
    /// an empty body), or `ExhaustedRetries` once `max_attempts` attempts have
    /// failed.
    pub async fn execute(&self, request: &RequestDescriptor, max_attempts: u32) -> ApiResult<Value> {
        let max_attempts = max_attempts.max(1);
        let context = self.api_logger.start_call(request.method, &request.url);

        for attempt in 1..=max_attempts {
            let outcome = {
                let _slot = self.limiter.acquire().await.map_err(|_| ApiError::LimiterClosed)?;
                self.counters.attempts.fetch_add(1, Ordering::SeqCst);
                self.send_attempt(request).await
            };

            match outcome {
                Attempt::Done { status, body } => {
                    self.api_logger.log_success(&context, attempt, status);
                    return parse_body(&request.url, &body);
                }
                Attempt::Failed(failure) => {
                    self.counters.failed_attempts.fetch_add(1, Ordering::SeqCst);
                    self.api_logger
                        .log_attempt_failure(&context, attempt, max_attempts, &failure);
                }
            }

            if let Some(delay) = self.retry_policy.delay_after(attempt, max_attempts) {
                self.counters.backoff_sleeps.fetch_add(1, Ordering::SeqCst);
                self.api_logger.log_backoff(&context, attempt, delay);
                tokio::time::sleep(delay).await;
            }
        }

        self.counters.exhausted_calls.fetch_add(1, Ordering::SeqCst);
        self.api_logger.log_exhausted(&context, max_attempts);
        Err(ApiError::ExhaustedRetries {
            url: request.url.clone(),
            attempts: max_attempts,
        })
    }

    async fn send_attempt(&self, request: &RequestDescriptor) -> Attempt {
        let mut builder = self
            .http_client
            .request(request.method.to_reqwest(), &request.url)
            .header("Accept", headers::CONTENT_TYPE_JSON);

        if let Some(token) = &request.auth {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return Attempt::Failed(FailureKind::from_transport_error(&err)),
        };

        let status = response.status().as_u16();
        match AttemptOutcome::from_status(request.method, status) {
            AttemptOutcome::Success => match response.bytes().await {
                Ok(bytes) => Attempt::Done {
                    status,
                    body: bytes.to_vec(),
                },
                Err(err) => Attempt::Failed(FailureKind::from_transport_error(&err)),
            },
            AttemptOutcome::NoContent => Attempt::Done { status, body: Vec::new() },
            AttemptOutcome::Transient(failure) => Attempt::Failed(failure),
        }
    }

    pub fn stats(&self) -> ExecutorStats {
        ExecutorStats {
            attempts: self.counters.attempts.load(Ordering::SeqCst),
            failed_attempts: self.counters.failed_attempts.load(Ordering::SeqCst),
            backoff_sleeps: self.counters.backoff_sleeps.load(Ordering::SeqCst),
            exhausted_calls: self.counters.exhausted_calls.load(Ordering::SeqCst),
            limiter: self.limiter.stats(),
        }
    }
}

fn parse_body(url: &str, body: &[u8]) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }

    serde_json::from_slice(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn fast_executor(max_in_flight: usize) -> Executor {
        let config = ResilienceConfig::builder()
            .max_attempts(3)
            .backoff(Duration::from_millis(10))
            .max_in_flight(max_in_flight)
            .build();
        Executor::new(&config).expect("executor")
    }

    #[tokio::test]
    async fn test_recovers_after_two_server_errors() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        Mock::given(method("GET"))
            .and(path("/console/api/apps"))
            .respond_with(move |_req: &Request| -> ResponseTemplate {
                if calls_clone.fetch_add(1, Ordering::SeqCst) < 2 {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!({"total": 7}))
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let executor = fast_executor(3);
        let request = RequestDescriptor::get(format!("{}/console/api/apps", server.uri()));
        let body = executor.execute(&request, 3).await.expect("third attempt succeeds");

        assert_eq!(body, json!({"total": 7}));
        let stats = executor.stats();
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.failed_attempts, 2);
        assert_eq!(stats.backoff_sleeps, 2);
    }

    #[tokio::test]
    async fn test_exhausts_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let executor = fast_executor(3);
        let url = format!("{}/console/api/apps", server.uri());
        let err = executor
            .execute(&RequestDescriptor::get(url.clone()), 3)
            .await
            .unwrap_err();

        match err {
            ApiError::ExhaustedRetries { url: failed_url, attempts } => {
                assert_eq!(failed_url, url);
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }

        let stats = executor.stats();
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.backoff_sleeps, 2);
        assert_eq!(stats.exhausted_calls, 1);
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/console/api/apps/a1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let executor = fast_executor(3);
        let request = RequestDescriptor::delete(format!("{}/console/api/apps/a1", server.uri()));
        let body = executor.execute(&request, 3).await.expect("delete succeeds");

        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn test_no_content_is_a_failure_for_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .expect(2)
            .mount(&server)
            .await;

        let executor = fast_executor(3);
        let err = executor
            .execute(&RequestDescriptor::get(server.uri()), 2)
            .await
            .unwrap_err();

        assert!(err.is_exhausted());
    }

    #[tokio::test]
    async fn test_empty_ok_body_is_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let executor = fast_executor(3);
        let body = executor
            .execute_default(&RequestDescriptor::post(server.uri()))
            .await
            .unwrap();
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn test_invalid_json_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .expect(1)
            .mount(&server)
            .await;

        let executor = fast_executor(3);
        let err = executor
            .execute(&RequestDescriptor::get(server.uri()), 3)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_sends_token_query_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/console/api/apps/imports"))
            .and(header("Authorization", "Bearer secret-token"))
            .and(query_param("dry_run", "false"))
            .respond_with(|req: &Request| -> ResponseTemplate {
                let body: Value = serde_json::from_slice(&req.body).unwrap();
                ResponseTemplate::new(200).set_body_json(json!({"echo": body["mode"]}))
            })
            .expect(1)
            .mount(&server)
            .await;

        let executor = fast_executor(3);
        let request = RequestDescriptor::post(format!("{}/console/api/apps/imports", server.uri()))
            .bearer("secret-token")
            .query("dry_run", false)
            .json(json!({"mode": "yaml-content"}));

        let body = executor.execute(&request, 1).await.unwrap();
        assert_eq!(body, json!({"echo": "yaml-content"}));
    }

    #[tokio::test]
    async fn test_connection_refused_is_retried_then_exhausted() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let executor = fast_executor(3);
        let err = executor
            .execute(&RequestDescriptor::get(format!("http://{}", addr)), 2)
            .await
            .unwrap_err();

        assert!(err.is_exhausted());
        assert_eq!(executor.stats().attempts, 2);
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_ceiling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(50)))
            .mount(&server)
            .await;

        let executor = fast_executor(3);
        let request = RequestDescriptor::get(server.uri());
        let calls = (0..10).map(|_| executor.execute(&request, 1));
        let results = join_all(calls).await;

        assert!(results.iter().all(Result::is_ok));
        let stats = executor.stats();
        assert_eq!(stats.attempts, 10);
        assert!(stats.limiter.peak_in_flight <= 3);
        assert_eq!(stats.limiter.in_flight, 0);
    }
}
