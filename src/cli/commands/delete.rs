use super::{print_renames, print_report};
use crate::cli::session::Session;
use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use dialoguer::Confirm;
use dify_bulk::api::DifyClient;
use dify_bulk::bulk::{Collection, dedupe, load_collection, run_delete};
use dify_bulk::config::Config;
use is_terminal::IsTerminal;

#[derive(Args, Debug)]
pub struct DeleteCommands {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn delete_command(args: DeleteCommands, config: &Config) -> Result<bool> {
    let session = Session::open(config).await?;
    delete_with(&session.client, &session.token, args, config).await
}

pub(crate) async fn delete_with(
    client: &DifyClient,
    token: &str,
    args: DeleteCommands,
    config: &Config,
) -> Result<bool> {
    let collection = load_collection(client, token, config.page_size())
        .await
        .context("Failed to fetch app list")?;

    let Collection::Ready(apps) = collection else {
        println!("{} No apps found.", "✗".bright_red().bold());
        return Ok(true);
    };

    let (apps, renames) = dedupe(&apps);
    print_renames(&renames);

    if !args.yes {
        if !std::io::stdin().is_terminal() {
            anyhow::bail!("Refusing to delete {} apps without --yes in a non-interactive session", apps.len());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete all {} apps on {}?", apps.len(), config.dify.origin))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Deletion cancelled".bright_yellow());
            return Ok(true);
        }
    }

    println!("Deleting apps...");
    let report = run_delete(client, token, apps).await;
    Ok(print_report(&report))
}
