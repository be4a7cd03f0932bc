//! Bulk import (create or update) followed by publish

use super::coordinator::{BulkReport, Stage, UnitFailure, run_bulk};
use crate::api::DifyClient;
use crate::api::models::App;
use crate::dsl::{DslFile, DslStore};
use log::{debug, warn};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Publish each app's workflow after a completed import
    pub publish: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { publish: true }
    }
}

/// Map app names to ids; the first app listed under a name wins
pub fn resolve_targets(apps: &[App]) -> HashMap<String, String> {
    let mut targets = HashMap::with_capacity(apps.len());
    for app in apps {
        targets.entry(app.name.clone()).or_insert_with(|| app.id.clone());
    }
    targets
}

/// Import every file, updating the app of the same name when one exists.
///
/// `targets` comes from [`resolve_targets`] over the full listing, fetched
/// once before any file is processed.
pub async fn run_import(
    client: &DifyClient,
    token: &str,
    store: &DslStore,
    files: Vec<DslFile>,
    targets: &HashMap<String, String>,
    options: ImportOptions,
) -> BulkReport {
    run_bulk("import", files, |file| async move {
        let yaml = store
            .read(&file)
            .await
            .map_err(|err| UnitFailure::new(Stage::Read, err))?;
        if yaml.is_empty() {
            warn!("Skipping empty file: {}", file.path.display());
            return Ok(format!("Skipped empty file: {}", file.path.display()));
        }

        let existing = targets.get(&file.app_name).map(String::as_str);
        let response = client
            .import_app(token, &yaml, existing)
            .await
            .map_err(|err| UnitFailure::new(Stage::Import, err))?;
        if !response.is_completed() {
            return Err(UnitFailure::new(Stage::Import, response.failure_reason()));
        }

        let verb = if existing.is_some() { "Updated" } else { "Created" };
        let app_id = response.app_id.as_deref().or(existing);

        if options.publish {
            match app_id {
                Some(id) => client
                    .publish_app(token, id)
                    .await
                    .map_err(|err| UnitFailure::new(Stage::Publish, err))?,
                None => debug!("No app id returned for {}; not publishing", file.app_name),
            }
        }

        Ok(format!(
            "{}: {} -> App ID: {}",
            verb,
            file.app_name,
            app_id.unwrap_or("unknown")
        ))
    })
    .await
}
