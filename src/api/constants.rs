//! API constants and endpoint builders for the Dify console API

/// Console API prefix appended to the configured origin
pub const CONSOLE_API_PATH: &str = "/console/api";

/// Default origin when none is configured
pub const DEFAULT_ORIGIN: &str = "http://localhost";

/// Apps requested per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Import mode for inline YAML payloads
pub const IMPORT_MODE_YAML: &str = "yaml-content";

/// Standard headers for console requests
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const USER_AGENT: &str = "dify-bulk/0.1";
}

/// Full console API base for an origin, tolerating a trailing slash
pub fn api_base(origin: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), CONSOLE_API_PATH)
}

pub fn login_endpoint(base_url: &str) -> String {
    format!("{}/login", base_url)
}

pub fn apps_endpoint(base_url: &str) -> String {
    format!("{}/apps", base_url)
}

pub fn app_endpoint(base_url: &str, app_id: &str) -> String {
    format!("{}/apps/{}", base_url, urlencoding::encode(app_id))
}

pub fn export_endpoint(base_url: &str, app_id: &str) -> String {
    format!("{}/export", app_endpoint(base_url, app_id))
}

pub fn imports_endpoint(base_url: &str) -> String {
    format!("{}/apps/imports", base_url)
}

pub fn publish_endpoint(base_url: &str, app_id: &str) -> String {
    format!("{}/workflows/publish", app_endpoint(base_url, app_id))
}
