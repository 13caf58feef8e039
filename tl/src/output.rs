//! Terminal rendering for CLI commands

use std::path::PathBuf;

use colored::Colorize;
use eyre::Result;
use serde::Serialize;
use templateindex::{CacheStats, TemplateRecord};

use crate::cli::OutputFormat;
use crate::search::SearchOutcome;

/// Print ranked search results
pub fn print_results(outcome: &SearchOutcome, format: &OutputFormat) -> Result<()> {
    if let Some(note) = &outcome.note {
        eprintln!("{}", format!("note: {}", note).yellow());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome.results)?);
        }
        OutputFormat::Text => {
            if outcome.results.is_empty() {
                println!("No templates found.");
                return Ok(());
            }
            for result in &outcome.results {
                println!("{}", format_result_line(result));
            }
        }
    }

    Ok(())
}

fn format_result_line(result: &crate::search::SearchResult) -> String {
    let record = &result.template;
    let labels = if record.labels.is_empty() {
        String::new()
    } else {
        format!(" [{}]", record.labels.join(", "))
    };

    // Pad before colorizing so the escape codes don't skew the columns
    format!(
        "{} {} {}{} {}",
        format!("{:<20}", record.id).bold(),
        format!("{:<8}", record.template_type()).cyan(),
        record.name,
        labels.yellow(),
        format!("({})", record.repo_name).dimmed(),
    )
}

/// Print one template in full
pub fn print_template(record: &TemplateRecord, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "Id:".bold(), record.id);
            println!("{} {}", "Name:".bold(), record.name);
            println!("{} {}", "Type:".bold(), record.template_type());
            println!("{} {}", "Repo:".bold(), record.repo_name);
            if !record.labels.is_empty() {
                println!("{} {}", "Labels:".bold(), record.labels.join(", "));
            }
            if !record.summary.is_empty() {
                println!("{} {}", "Summary:".bold(), record.summary);
            }
            println!("{} {}", "Path:".bold(), record.abs_path.display());
            println!("{} {}", "Modified:".bold(), record.last_modified.format("%Y-%m-%d %H:%M:%S UTC"));

            let body = record.body();
            if !body.is_empty() {
                println!();
                println!("{}", body);
            }
        }
    }

    Ok(())
}

/// Print cache diagnostics
pub fn print_stats(stats: &CacheStats, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(stats)?);
        }
        OutputFormat::Text => {
            println!("Template Index");
            println!("--------------");
            if !stats.exists {
                println!("Status: no cache on disk");
                return Ok(());
            }
            println!("Status: cached");
            println!("Templates: {}", stats.template_count);
            println!("Size: {} bytes", stats.size_bytes);
            match stats.version {
                Some(version) => println!("Schema version: {}", version),
                None => println!("Schema version: {}", "unreadable".red()),
            }
            if let Some(last_updated) = stats.last_updated {
                println!("Last updated: {}", last_updated.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
    }

    Ok(())
}

/// One row of `repo list`
#[derive(Debug, Serialize)]
pub struct RepoRow {
    pub name: String,
    /// The configured url or local path
    pub source: String,
    /// Resolved checkout location
    pub root: PathBuf,
    /// Checkout exists on disk
    pub present: bool,
}

/// Print the configured repositories
pub fn print_repos(rows: &[RepoRow], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No repositories configured.");
                return Ok(());
            }
            for row in rows {
                let presence = if row.present {
                    format!("{:<8}", "present").green()
                } else {
                    format!("{:<8}", "missing").red()
                };
                println!(
                    "{} {} {} {}",
                    format!("{:<18}", row.name).bold(),
                    presence,
                    row.root.display(),
                    format!("({})", row.source).dimmed(),
                );
            }
        }
    }

    Ok(())
}
