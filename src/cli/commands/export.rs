use super::{print_apps, print_renames, print_report};
use crate::cli::session::Session;
use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use dify_bulk::api::DifyClient;
use dify_bulk::bulk::{Collection, load_collection, plan_export, run_export};
use dify_bulk::config::{Config, parse_tag_list};
use dify_bulk::dsl::DslStore;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub struct ExportCommands {
    /// Folder to write DSL files into (previous .yml files are removed)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
    /// Comma separated tags; only apps with one of them are exported
    #[arg(short, long)]
    pub tags: Option<String>,
    /// Export without secret environment variables
    #[arg(long)]
    pub no_secret: bool,
}

pub async fn export_command(args: ExportCommands, config: &Config) -> Result<bool> {
    let session = Session::open(config).await?;
    export_with(&session.client, &session.token, args, config).await
}

pub(crate) async fn export_with(
    client: &DifyClient,
    token: &str,
    args: ExportCommands,
    config: &Config,
) -> Result<bool> {
    let store = DslStore::new(args.dir.unwrap_or_else(|| config.dsl.dir.clone()));
    let tags = match args.tags.as_deref() {
        Some(raw) => parse_tag_list(raw),
        None => config.dsl.export_tags.clone(),
    };
    let include_secret = config.dsl.include_secret && !args.no_secret;

    let collection = load_collection(client, token, config.page_size())
        .await
        .context("Failed to fetch app list")?;

    let Collection::Ready(apps) = collection else {
        println!("{} No apps found.", "✗".bright_red().bold());
        return Ok(true);
    };
    print_apps(&apps);

    let fetched = apps.len();
    let plan = plan_export(apps, &tags);
    if !tags.is_empty() {
        println!(
            "{} Exporting {}/{} apps matching tags {:?}",
            "🗂".bright_blue(),
            plan.apps.len(),
            fetched,
            tags
        );
    }
    if plan.apps.is_empty() {
        println!("{} No apps found.", "✗".bright_red().bold());
        return Ok(true);
    }
    print_renames(&plan.renames);

    store
        .reset()
        .with_context(|| format!("Failed to prepare DSL folder {:?}", store.dir()))?;

    println!("Starting to download YML files...");
    let report = run_export(client, token, &store, plan.apps, include_secret).await;
    Ok(print_report(&report))
}
