use super::constants::{self, IMPORT_MODE_YAML};
use super::error::{ApiError, ApiResult};
use super::executor::Executor;
use super::models::{AppPage, ImportResponse, LoginResponse, RequestDescriptor};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Dify console API client.
///
/// Thin endpoint wrappers; every call goes through the shared [`Executor`] and
/// inherits its retry, backoff and concurrency ceiling.
#[derive(Debug, Clone)]
pub struct DifyClient {
    base_url: String,
    executor: Executor,
}

impl DifyClient {
    /// `origin` is the Dify origin, e.g. `http://localhost`
    pub fn new(origin: &str, executor: Executor) -> Self {
        Self {
            base_url: constants::api_base(origin),
            executor,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log in with email and password and return the console access token
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let url = constants::login_endpoint(&self.base_url);
        let request = RequestDescriptor::post(&url).json(json!({
            "email": email,
            "password": password,
        }));

        let response: LoginResponse = self.call(&request).await?;
        match (response.result.as_deref(), response.data) {
            (Some("success"), Some(data)) => {
                info!("Access token obtained successfully");
                Ok(data.access_token)
            }
            (result, _) => Err(ApiError::AuthenticationFailure(format!(
                "login API returned result {:?} - {}",
                result.unwrap_or("none"),
                url
            ))),
        }
    }

    /// Fetch one page of the app listing (pages start at 1)
    pub async fn fetch_page(&self, token: &str, page: u64, limit: u32) -> ApiResult<AppPage> {
        let request = RequestDescriptor::get(constants::apps_endpoint(&self.base_url))
            .bearer(token)
            .query("page", page)
            .query("limit", limit);

        debug!("Fetching app page {} (limit {})", page, limit);
        self.call(&request).await
    }

    pub async fn delete_app(&self, token: &str, app_id: &str) -> ApiResult<()> {
        let request = RequestDescriptor::delete(constants::app_endpoint(&self.base_url, app_id)).bearer(token);
        self.executor.execute_default(&request).await?;
        Ok(())
    }

    /// Export an app's DSL as YAML text
    pub async fn export_app(&self, token: &str, app_id: &str, include_secret: bool) -> ApiResult<String> {
        let url = constants::export_endpoint(&self.base_url, app_id);
        let request = RequestDescriptor::get(&url)
            .bearer(token)
            .query("include_secret", include_secret);

        let body = self.executor.execute_default(&request).await?;
        match body.get("data") {
            Some(Value::String(dsl)) => Ok(dsl.clone()),
            _ => Err(ApiError::UnexpectedResponse {
                url,
                reason: "export response has no `data` string".to_string(),
            }),
        }
    }

    /// Import a DSL document, updating `app_id` in place when given
    pub async fn import_app(&self, token: &str, yaml_content: &str, app_id: Option<&str>) -> ApiResult<ImportResponse> {
        let mut payload = json!({
            "mode": IMPORT_MODE_YAML,
            "yaml_content": yaml_content,
        });
        if let Some(id) = app_id {
            payload["app_id"] = Value::from(id);
        }

        let request = RequestDescriptor::post(constants::imports_endpoint(&self.base_url))
            .bearer(token)
            .json(payload);
        self.call(&request).await
    }

    /// Publish the current draft workflow of an app
    pub async fn publish_app(&self, token: &str, app_id: &str) -> ApiResult<()> {
        let request = RequestDescriptor::post(constants::publish_endpoint(&self.base_url, app_id))
            .bearer(token)
            .json(json!({}));
        self.executor.execute_default(&request).await?;
        Ok(())
    }

    async fn call<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> ApiResult<T> {
        let body = self.executor.execute_default(request).await?;
        serde_json::from_value(body).map_err(|source| ApiError::Decode {
            url: request.url.clone(),
            source,
        })
    }
}
