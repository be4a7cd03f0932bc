//! Bulk export into the local DSL folder

use super::collection::filter_by_tags;
use super::coordinator::{BulkReport, Stage, UnitFailure, run_bulk};
use super::dedupe::{RenameRecord, dedupe};
use crate::api::DifyClient;
use crate::api::models::App;
use crate::dsl::DslStore;

/// Apps selected for export, already carrying collision-free names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub apps: Vec<App>,
    pub renames: Vec<RenameRecord>,
}

/// Apply the tag filter, then make names unique
pub fn plan_export(apps: Vec<App>, tags: &[String]) -> ExportPlan {
    let selected = filter_by_tags(apps, tags);
    let (apps, renames) = dedupe(&selected);
    ExportPlan { apps, renames }
}

/// Export every planned app and write its DSL into `store`.
///
/// The store folder must already exist; see [`DslStore::reset`].
pub async fn run_export(
    client: &DifyClient,
    token: &str,
    store: &DslStore,
    apps: Vec<App>,
    include_secret: bool,
) -> BulkReport {
    run_bulk("export", apps, |app| async move {
        let dsl = client
            .export_app(token, &app.id, include_secret)
            .await
            .map_err(|err| UnitFailure::new(Stage::Export, err))?;
        let path = store
            .write(&app.name, &dsl)
            .await
            .map_err(|err| UnitFailure::new(Stage::Write, err))?;
        Ok(format!("Exported: {} -> {}", app.name, path.display()))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::executor::Executor;
    use crate::api::resilience::ResilienceConfig;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_plan_filters_before_dedupe() {
        let apps = vec![
            App::new("a1", "X").with_tags(["dev"]),
            App::new("b2", "X").with_tags(["prod"]),
            App::new("c3", "X").with_tags(["prod"]),
        ];

        let plan = plan_export(apps, &["prod".to_string()]);

        // "a1" is filtered out, so "b2" keeps the plain name
        let names: Vec<_> = plan.apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["X", "【same】X-c3"]);
        assert_eq!(plan.renames.len(), 1);
    }

    #[tokio::test]
    async fn test_colliding_file_names_fail_at_write() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "app: {}\n"})))
            .expect(2)
            .mount(&server)
            .await;

        let config = ResilienceConfig::builder()
            .max_attempts(1)
            .backoff(Duration::from_millis(1))
            .build();
        let client = DifyClient::new(&server.uri(), Executor::new(&config).unwrap());
        let tmp = tempdir().unwrap();
        let store = DslStore::new(tmp.path());

        // distinct names, same sanitized file name
        let apps = vec![App::new("a1", "team/bot"), App::new("b2", "team-bot")];
        let (apps, renames) = dedupe(&apps);
        assert!(renames.is_empty());

        let report = run_export(&client, "tok", &store, apps, true).await;

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        let (_, failure) = report.failures().next().unwrap();
        assert_eq!(failure.stage, Stage::Write);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_export_writes_one_file_per_app() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/console/api/apps/a1/export"))
            .and(query_param("include_secret", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "name: one\n"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/console/api/apps/b2/export"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/console/api/apps/c3/export"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "name: three\n"})))
            .mount(&server)
            .await;

        let config = ResilienceConfig::builder()
            .max_attempts(2)
            .backoff(Duration::from_millis(5))
            .build();
        let client = DifyClient::new(&server.uri(), Executor::new(&config).unwrap());
        let tmp = tempdir().unwrap();
        let store = DslStore::new(tmp.path().join("dsl"));
        store.reset().unwrap();

        let apps = vec![
            App::new("a1", "team/one"),
            App::new("b2", "two"),
            App::new("c3", "three"),
        ];
        let report = run_export(&client, "tok", &store, apps, false).await;

        assert_eq!(report.succeeded(), 2);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures[0].0, "two (ID: b2)");
        assert_eq!(failures[0].1.stage, Stage::Export);

        let files: Vec<_> = store.list().unwrap().into_iter().map(|f| f.app_name).collect();
        assert_eq!(files, vec!["team-one", "three"]);
        assert_eq!(
            std::fs::read_to_string(store.path_for("three")).unwrap(),
            "name: three\n"
        );
    }
}
