//! Terminal presentation of forests, plans and reports.

use colored::Colorize;
use serde::Serialize;

use crate::executor::{ExecutionReport, Plan};
use crate::filesystem::DirectoryListing;
use crate::tree::{EntryKind, ExecutionItem, TreeStats};

pub fn print_text(text: &str) {
    print!("{text}");
}

pub fn print_json(json: &str) {
    println!("{json}");
}

pub fn print_paths(items: &[ExecutionItem]) {
    for item in items {
        match item.kind {
            EntryKind::Directory => println!("{}/", item.path.blue().bold()),
            EntryKind::File => println!("{}", item.path),
        }
    }
}

pub fn print_stats(stats: &TreeStats) {
    println!(
        "{}",
        format!(
            "{} nodes, {} directories, {} files, {} selected",
            stats.total, stats.directories, stats.files, stats.selected
        )
        .dimmed()
    );
}

pub fn print_plan(plan: &Plan) {
    for item in plan.items() {
        println!("{} {} {}", "would create".yellow(), item.kind, item.path);
    }
    println!(
        "{}",
        format!(
            "{} directories and {} files planned",
            plan.directories().len(),
            plan.files().len()
        )
        .dimmed()
    );
}

pub fn print_report(report: &ExecutionReport) {
    for result in &report.results {
        if result.success {
            println!("{} {} {}", "✓".green(), result.kind, result.path);
        } else {
            println!(
                "{} {} {}: {}",
                "✗".red(),
                result.kind,
                result.path,
                result.message.as_deref().unwrap_or("unknown error").red()
            );
        }
    }

    let summary = format!(
        "{} succeeded, {} failed",
        report.success_count(),
        report.failure_count()
    );
    if report.failure_count() == 0 {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }
}

pub fn print_listing(listing: &DirectoryListing) {
    println!("{}", listing.path.display().to_string().bold());
    for entry in &listing.directories {
        println!("  {}/", entry.name.blue().bold());
    }
    for entry in &listing.files {
        println!("  {}", entry.name);
    }
}

/// Payload printed by `parse --format json`.
#[derive(Debug, Serialize)]
pub struct ParseSummary<'a> {
    pub items: &'a [ExecutionItem],
    pub stats: TreeStats,
}
