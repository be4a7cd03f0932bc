//! The validated app collection every bulk command starts from

use super::coordinator::BulkTarget;
use crate::api::error::{ApiError, ApiResult};
use crate::api::models::App;
use crate::api::{DifyClient, fetch_all};
use log::{info, warn};

impl BulkTarget for App {
    fn label(&self) -> String {
        format!("{} (ID: {})", self.name, self.id)
    }
}

/// Result of loading the full listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    /// The server reported no apps; no bulk operation should run
    Empty,
    Ready(Vec<App>),
}

impl Collection {
    pub fn into_apps(self) -> Vec<App> {
        match self {
            Collection::Empty => Vec::new(),
            Collection::Ready(apps) => apps,
        }
    }
}

/// Fail when the fetched item count differs from the server's reported total
pub fn ensure_consistent(apps: &[App], total: u64) -> ApiResult<()> {
    let received = apps.len() as u64;
    if received != total {
        warn!("App count mismatch: expected {}, got {}", total, received);
        return Err(ApiError::ConsistencyFault {
            expected: total,
            received,
        });
    }
    Ok(())
}

/// Fetch every app and check the count before anything acts on it
pub async fn load_collection(client: &DifyClient, token: &str, page_size: u32) -> ApiResult<Collection> {
    let (apps, total) = fetch_all(client, token, page_size).await?;
    if total == 0 {
        info!("No apps found");
        return Ok(Collection::Empty);
    }
    ensure_consistent(&apps, total)?;
    info!("Fetched {} app(s)", apps.len());
    Ok(Collection::Ready(apps))
}

/// Keep apps sharing at least one tag with `tags`; an empty filter keeps all
pub fn filter_by_tags(apps: Vec<App>, tags: &[String]) -> Vec<App> {
    if tags.is_empty() {
        return apps;
    }
    let before = apps.len();
    let kept: Vec<App> = apps.into_iter().filter(|app| app.has_any_tag(tags)).collect();
    info!("Tag filter {:?} kept {} of {} app(s)", tags, kept.len(), before);
    kept
}
