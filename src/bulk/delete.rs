//! Bulk delete

use super::coordinator::{BulkReport, Stage, UnitFailure, run_bulk};
use crate::api::DifyClient;
use crate::api::models::App;

/// Delete every app in `apps`, isolating failures per app
pub async fn run_delete(client: &DifyClient, token: &str, apps: Vec<App>) -> BulkReport {
    run_bulk("delete", apps, |app| async move {
        client
            .delete_app(token, &app.id)
            .await
            .map_err(|err| UnitFailure::new(Stage::Delete, err))?;
        Ok(format!("Deleted: {} (ID: {})", app.name, app.id))
    })
    .await
}
