use super::print_report;
use crate::cli::session::Session;
use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use dify_bulk::api::{DifyClient, fetch_all};
use dify_bulk::bulk::{ImportOptions, resolve_targets, run_import};
use dify_bulk::config::Config;
use dify_bulk::dsl::{DslFile, DslStore};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ImportCommands {
    /// Folder to read DSL files from
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
    /// Import without publishing the workflows
    #[arg(long)]
    pub no_publish: bool,
}

pub async fn import_command(args: ImportCommands, config: &Config) -> Result<bool> {
    let store = DslStore::new(args.dir.unwrap_or_else(|| config.dsl.dir.clone()));
    let files = store
        .list()
        .with_context(|| format!("Failed to read DSL folder {:?}", store.dir()))?;
    if files.is_empty() {
        println!("{} No YML files found in {:?}", "✗".bright_red().bold(), store.dir());
        return Ok(true);
    }

    let session = Session::open(config).await?;
    let options = ImportOptions {
        publish: !args.no_publish,
    };
    import_with(&session.client, &session.token, &store, files, options, config).await
}

pub(crate) async fn import_with(
    client: &DifyClient,
    token: &str,
    store: &DslStore,
    files: Vec<DslFile>,
    options: ImportOptions,
    config: &Config,
) -> Result<bool> {
    // Import targets only need names; a short listing is not fatal here
    let (apps, _) = fetch_all(client, token, config.page_size())
        .await
        .context("Failed to fetch app list")?;
    let targets = resolve_targets(&apps);

    println!("Importing {} DSL files...", files.len());
    let report = run_import(client, token, store, files, &targets, options).await;
    Ok(print_report(&report))
}
