//! Command handlers
//!
//! Each handler returns `Ok(true)` when every unit of its bulk run succeeded.

pub mod delete;
pub mod export;
pub mod import;
pub mod list;

pub use delete::{DeleteCommands, delete_command};
pub use export::{ExportCommands, export_command};
pub use import::{ImportCommands, import_command};
pub use list::{ListCommands, list_command};

use colored::*;
use dify_bulk::api::App;
use dify_bulk::bulk::{BulkReport, RenameRecord};

/// Print every fetched app with its tags
pub(crate) fn print_apps(apps: &[App]) {
    println!("{} Found {} apps:", "🔍".bright_blue(), apps.len().to_string().bright_white().bold());
    for app in apps {
        let tags = if app.tags.is_empty() {
            "‹no tags›".dimmed().to_string()
        } else {
            app.tags.join(", ").cyan().to_string()
        };
        println!("  • {}  (id={}), tags={}", app.name.bright_white(), app.id.dimmed(), tags);
    }
}

pub(crate) fn print_renames(renames: &[RenameRecord]) {
    if renames.is_empty() {
        println!("{} No duplicate app names", "✓".bright_green().bold());
        return;
    }
    println!(
        "{} Same name app count: {}",
        "⚠".bright_yellow().bold(),
        renames.len().to_string().bright_yellow()
    );
    for rename in renames {
        println!("  {}", rename);
    }
}

/// Print one line per unit and the final tally
pub(crate) fn print_report(report: &BulkReport) -> bool {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(detail) => println!("{} {}", "✓".bright_green().bold(), detail),
            Err(failure) => println!("{} {}: {}", "✗".bright_red().bold(), outcome.label.bright_white(), failure),
        }
    }

    println!();
    let summary = format!(
        "{}: {} succeeded, {} failed ({} total)",
        report.operation,
        report.succeeded(),
        report.failed(),
        report.total()
    );
    if report.is_success() {
        println!("{} {}", "✓".bright_green().bold(), summary.bright_green());
    } else {
        println!("{} {}", "✗".bright_red().bold(), summary.bright_red());
    }
    report.is_success()
}
