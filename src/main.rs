use anyhow::{Context, Result};
use clap::Parser;
use dify_bulk::config::Config;
use log::info;
use std::path::Path;
use std::process::ExitCode;

mod cli;

use cli::Cli;
use cli::app::Commands;
use cli::commands::{delete_command, export_command, import_command, list_command};

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        // Truncate on each run
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

async fn run(cli: Cli) -> Result<bool> {
    let mut config = Config::load(cli.global.config.as_deref())?;
    cli.global.apply(&mut config);
    info!(
        "Using {} with up to {} requests in flight",
        config.dify.origin, config.engine.max_concurrency
    );

    match cli.command {
        Commands::List(args) => list_command(args, &config).await,
        Commands::Export(args) => export_command(args, &config).await,
        Commands::Import(args) => import_command(args, &config).await,
        Commands::Delete(args) => delete_command(args, &config).await,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.global.log_file.as_deref())?;
    info!("Starting dify-bulk");

    if run(cli).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
