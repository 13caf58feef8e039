use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use templateindex::IndexCache;
use templateindex::cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let cache = IndexCache::new(cli.cache.unwrap_or_else(IndexCache::default_path));

    info!("templateindex starting");

    match cli.command {
        Command::Stats => {
            let stats = cache.stats().await;
            if !stats.exists {
                println!("No index cache at {}", cache.path().display());
                return Ok(());
            }
            println!("Cache: {}", cache.path().display().to_string().cyan());
            println!("  Templates: {}", stats.template_count);
            println!("  Size: {} bytes", stats.size_bytes);
            match stats.version {
                Some(version) => println!("  Schema version: {}", version),
                None => println!("  Schema version: {}", "unreadable".red()),
            }
            if let Some(updated) = stats.last_updated {
                println!("  Last updated: {}", updated.to_rfc3339());
            }
        }
        Command::Show { repo } => {
            let Some(index) = cache.load().await else {
                println!("No usable index cache at {}", cache.path().display());
                return Ok(());
            };
            let mut templates: Vec<_> = index
                .templates
                .iter()
                .filter(|t| repo.as_deref().is_none_or(|r| t.repo_name == r))
                .collect();
            templates.sort_by(|a, b| a.repo_name.cmp(&b.repo_name).then_with(|| a.id.cmp(&b.id)));

            if templates.is_empty() {
                println!("No templates indexed");
            }
            for template in templates {
                println!(
                    "{} {} {} ({})",
                    template.id.cyan(),
                    template.template_type().to_string().yellow(),
                    template.name,
                    template.repo_name.dimmed(),
                );
            }
        }
        Command::Clear => {
            cache.clear().await?;
            println!("{} Cleared index cache: {}", "✓".green(), cache.path().display());
        }
        Command::Path => {
            println!("{}", cache.path().display());
        }
    }

    Ok(())
}
