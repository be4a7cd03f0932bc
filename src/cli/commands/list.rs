use super::{print_apps, print_renames};
use crate::cli::session::Session;
use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use dify_bulk::api::DifyClient;
use dify_bulk::bulk::{Collection, dedupe, load_collection};
use dify_bulk::config::Config;

#[derive(Args, Debug)]
pub struct ListCommands {}

pub async fn list_command(_args: ListCommands, config: &Config) -> Result<bool> {
    let session = Session::open(config).await?;
    list_with(&session.client, &session.token, config).await
}

pub(crate) async fn list_with(client: &DifyClient, token: &str, config: &Config) -> Result<bool> {
    let collection = load_collection(client, token, config.page_size())
        .await
        .context("Failed to fetch app list")?;

    let Collection::Ready(apps) = collection else {
        println!("{} No apps found.", "✗".bright_red().bold());
        return Ok(true);
    };

    print_apps(&apps);
    let (_, renames) = dedupe(&apps);
    print_renames(&renames);
    Ok(true)
}
