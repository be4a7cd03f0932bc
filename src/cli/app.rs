use super::commands::{DeleteCommands, ExportCommands, ImportCommands, ListCommands};
use dify_bulk::config::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dify-bulk")]
#[command(about = "Bulk export, import and delete of Dify applications")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Dify origin, e.g. https://dify.example.com
    #[arg(long, global = true)]
    pub origin: Option<String>,
    /// Maximum number of requests in flight at once
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,
    /// Attempts per API call before giving up
    #[arg(long, global = true)]
    pub attempts: Option<u32>,
    /// Apps requested per listing page
    #[arg(long, global = true)]
    pub page_size: Option<u32>,
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl GlobalArgs {
    /// Flags win over every other configuration layer
    pub fn apply(&self, config: &mut Config) {
        if let Some(origin) = &self.origin {
            config.dify.origin = origin.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.engine.max_concurrency = concurrency;
        }
        if let Some(attempts) = self.attempts {
            config.engine.max_attempts = attempts;
        }
        if let Some(page_size) = self.page_size {
            config.engine.page_size = page_size;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every app with its tags
    List(ListCommands),
    /// Export app DSL files into the local folder
    Export(ExportCommands),
    /// Create or update apps from local DSL files
    Import(ImportCommands),
    /// Delete every app
    Delete(DeleteCommands),
}
