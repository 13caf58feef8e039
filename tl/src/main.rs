//! Templib - git-backed template library manager
//!
//! CLI entry point for searching, showing, and managing templates.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use templateindex::{IndexCache, RepoRef, TemplateType};
use templib::cli::{Cli, Command, IndexCommand, OutputFormat, RepoCommand};
use templib::config::{Config, RepoEntry};
use templib::output::{self, RepoRow};
use templib::repo::{Registry, clone_repo, derive_repo_name, pull_repo};
use templib::search::{DeepSearch, GrepScanner, SearchEngine, SearchOptions};
use templib::tui;

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("templib")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Setup tracing subscriber - write to log file, not stdout/stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("templib.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        repos = config.repos.len(),
        cache = %config.storage.cache_file.display(),
        "Templib loaded config"
    );

    match cli.command {
        Some(Command::Search {
            keyword,
            kind,
            labels,
            all_labels,
            repo,
            max,
            case_sensitive,
            deep,
            rebuild,
            format,
        }) => {
            let opts = SearchOptions {
                keyword: Some(keyword),
                kind,
                labels,
                label_match_all: all_labels,
                repo,
                max_results: max.unwrap_or(config.search.max_results),
                case_sensitive: case_sensitive || config.search.case_sensitive,
            };
            cmd_search(&config, opts, deep, rebuild, format).await
        }
        Some(Command::List {
            kind,
            labels,
            repo,
            format,
        }) => cmd_list(&config, kind, labels, repo, format).await,
        Some(Command::Show { id, repo, format }) => cmd_show(&config, &id, repo.as_deref(), format).await,
        Some(Command::Repo { command }) => match command {
            RepoCommand::Add { source, name, branch } => {
                cmd_repo_add(config, cli.config.as_ref(), source, name, branch).await
            }
            RepoCommand::Remove { name } => cmd_repo_remove(config, cli.config.as_ref(), &name).await,
            RepoCommand::Update { name } => cmd_repo_update(&config, name.as_deref()).await,
            RepoCommand::List { format } => cmd_repo_list(&config, format),
        },
        Some(Command::Index { command }) => match command {
            IndexCommand::Rebuild => cmd_index_rebuild(&config).await,
            IndexCommand::Clear => cmd_index_clear(&config).await,
            IndexCommand::Stats { format } => cmd_index_stats(&config, format).await,
        },
        Some(Command::Tui) => cmd_tui(&config).await,
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}

/// Search the index, optionally falling through to a raw content scan
async fn cmd_search(
    config: &Config,
    opts: SearchOptions,
    deep: bool,
    rebuild: bool,
    format: OutputFormat,
) -> Result<()> {
    let registry = Registry::from_config(config);
    let repos = registry.refs();
    let cache = IndexCache::new(config.storage.cache_file.clone());

    let index = cache.get_index(&repos, rebuild).await?;
    let engine = SearchEngine::new();
    let mut outcome = engine.search(&index, &opts);

    // An UnknownRepo note means there is nothing to scan either
    if deep && outcome.note.is_none() && let Some(keyword) = opts.keyword.as_deref() {
        let scan_repos: Vec<RepoRef> = repos
            .into_iter()
            .filter(|r| opts.repo.as_ref().is_none_or(|repo| &r.name == repo))
            .collect();
        let known_ids: BTreeSet<String> = outcome.results.iter().map(|r| r.template.id.clone()).collect();
        let deep_search = DeepSearch::new(GrepScanner::new());
        let extra = deep_search.run(keyword, &scan_repos, &known_ids, opts.case_sensitive).await?;

        // Content matches obey the same hard filters as index records
        let extra: Vec<_> = extra
            .into_iter()
            .filter(|r| engine.matches_filters(&r.template, &opts))
            .collect();
        info!(count = extra.len(), "Deep search added results");
        outcome.results.extend(extra);
        outcome.results.truncate(opts.max_results);
    }

    output::print_results(&outcome, &format)
}

/// List indexed templates, newest index wins
async fn cmd_list(
    config: &Config,
    kind: Option<TemplateType>,
    labels: Vec<String>,
    repo: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let registry = Registry::from_config(config);
    let repos = registry.refs();
    let cache = IndexCache::new(config.storage.cache_file.clone());

    let index = cache.get_index(&repos, false).await?;
    let opts = SearchOptions {
        keyword: None,
        kind,
        labels,
        label_match_all: false,
        repo,
        max_results: usize::MAX,
        case_sensitive: config.search.case_sensitive,
    };

    let engine = SearchEngine::new();
    let outcome = engine.search(&index, &opts);

    output::print_results(&outcome, &format)
}

/// Show one template in full
async fn cmd_show(config: &Config, id: &str, repo: Option<&str>, format: OutputFormat) -> Result<()> {
    let registry = Registry::from_config(config);
    let repos = registry.refs();
    let cache = IndexCache::new(config.storage.cache_file.clone());

    let index = cache.get_index(&repos, false).await?;
    let matches = index.find_by_id(id, repo);

    match matches.len() {
        0 => Err(eyre::eyre!("No template found with id '{}'", id)),
        1 => output::print_template(matches[0], &format),
        _ => {
            let owners: Vec<&str> = matches.iter().map(|r| r.repo_name.as_str()).collect();
            Err(eyre::eyre!(
                "Template id '{}' exists in several repositories: {}. Disambiguate with --repo.",
                id,
                owners.join(", ")
            ))
        }
    }
}

/// Register a repository and clone it when it is a remote
async fn cmd_repo_add(
    mut config: Config,
    config_path: Option<&PathBuf>,
    source: String,
    name: Option<String>,
    branch: Option<String>,
) -> Result<()> {
    let name = name.unwrap_or_else(|| derive_repo_name(&source));
    if name.is_empty() {
        return Err(eyre::eyre!("Cannot derive a repository name from '{}'. Use --name.", source));
    }
    if config.repo(&name).is_some() {
        return Err(eyre::eyre!("Repository '{}' is already configured", name));
    }

    let entry = if is_git_url(&source) {
        let dest = config.storage.repos_dir.join(&name);
        println!("Cloning {} into {}...", source, dest.display());
        clone_repo(&source, &dest, branch.as_deref()).await?;
        RepoEntry {
            name: name.clone(),
            url: Some(source),
            path: None,
            branch,
        }
    } else {
        let path = PathBuf::from(&source);
        if !path.exists() {
            return Err(eyre::eyre!("Local path does not exist: {}", path.display()));
        }
        RepoEntry {
            name: name.clone(),
            url: None,
            path: Some(path),
            branch: None,
        }
    };

    config.repos.push(entry);
    let path = Config::write_path(config_path);
    config.save(&path)?;

    // Membership changed, force the next command to rebuild
    let cache = IndexCache::new(config.storage.cache_file.clone());
    cache.clear().await?;

    println!("{} Added repository '{}'", "✓".green(), name);
    Ok(())
}

/// Remove a repository from the configuration, leaving its checkout on disk
async fn cmd_repo_remove(mut config: Config, config_path: Option<&PathBuf>, name: &str) -> Result<()> {
    let registry = Registry::from_config(&config);
    let Some(entry) = registry.get(name) else {
        return Err(eyre::eyre!("No repository named '{}' is configured", name));
    };
    let root = registry.checkout_path(entry);

    config.repos.retain(|r| r.name != name);
    let path = Config::write_path(config_path);
    config.save(&path)?;

    let cache = IndexCache::new(config.storage.cache_file.clone());
    cache.clear().await?;

    println!("{} Removed repository '{}'", "✓".green(), name);
    if root.exists() {
        println!("  Checkout left on disk: {}", root.display());
    }
    Ok(())
}

/// Clone or pull configured repositories
async fn cmd_repo_update(config: &Config, name: Option<&str>) -> Result<()> {
    let registry = Registry::from_config(config);

    let targets: Vec<&RepoEntry> = match name {
        Some(name) => {
            let entry = registry
                .get(name)
                .ok_or_else(|| eyre::eyre!("No repository named '{}' is configured", name))?;
            vec![entry]
        }
        None => registry.entries().iter().collect(),
    };

    if targets.is_empty() {
        println!("No repositories configured. Add one with: tl repo add <url-or-path>");
        return Ok(());
    }

    let mut failures = 0usize;
    let mut refreshed = 0usize;
    for entry in targets {
        let root = registry.checkout_path(entry);
        match &entry.url {
            Some(url) => {
                let result = if root.exists() {
                    println!("Updating {}...", entry.name);
                    pull_repo(&root).await
                } else {
                    println!("Cloning {}...", entry.name);
                    clone_repo(url, &root, entry.branch.as_deref()).await
                };
                match result {
                    Ok(()) => {
                        println!("{} {}", "✓".green(), entry.name);
                        refreshed += 1;
                    }
                    Err(err) => {
                        eprintln!("{} {}: {}", "✗".red(), entry.name, err);
                        failures += 1;
                    }
                }
            }
            None => {
                println!("{} {}: local path, nothing to update", "-".dimmed(), entry.name);
            }
        }
    }

    // A pull can change only nested files and leave the checkout root mtime
    // alone, which the staleness check keys on
    if refreshed > 0 {
        let cache = IndexCache::new(config.storage.cache_file.clone());
        cache.clear().await?;
    }

    if failures > 0 {
        return Err(eyre::eyre!("{} repositories failed to update", failures));
    }
    Ok(())
}

/// List configured repositories and whether their checkouts exist
fn cmd_repo_list(config: &Config, format: OutputFormat) -> Result<()> {
    let registry = Registry::from_config(config);

    let rows: Vec<RepoRow> = registry
        .entries()
        .iter()
        .map(|entry| {
            let root = registry.checkout_path(entry);
            let source = entry
                .url
                .clone()
                .or_else(|| entry.path.as_ref().map(|p| p.display().to_string()))
                .unwrap_or_default();
            RepoRow {
                name: entry.name.clone(),
                source,
                present: root.exists(),
                root,
            }
        })
        .collect();

    output::print_repos(&rows, &format)
}

/// Force a full index rebuild and report what it found
async fn cmd_index_rebuild(config: &Config) -> Result<()> {
    let registry = Registry::from_config(config);
    let repos = registry.refs();

    if repos.is_empty() {
        println!("No repositories configured. Add one with: tl repo add <url-or-path>");
        return Ok(());
    }

    let cache = IndexCache::new(config.storage.cache_file.clone());
    let report = cache.build_index(&repos).await?;

    println!("{} Indexed {} templates", "✓".green(), report.index.len());
    if !report.skipped.is_empty() {
        println!("{} Skipped {} invalid files", "⚠".yellow(), report.skipped.len());
        for skip in &report.skipped {
            println!("    {}: {}", skip.path.display(), skip.reason);
        }
    }
    for failed in &report.failed_repos {
        eprintln!("{} Repository '{}' failed to scan: {}", "✗".red(), failed.name, failed.error);
    }
    Ok(())
}

/// Delete the persisted index
async fn cmd_index_clear(config: &Config) -> Result<()> {
    let cache = IndexCache::new(config.storage.cache_file.clone());
    cache.clear().await?;
    println!("{} Cleared index cache", "✓".green());
    Ok(())
}

/// Show cache diagnostics without touching the cache
async fn cmd_index_stats(config: &Config, format: OutputFormat) -> Result<()> {
    let cache = IndexCache::new(config.storage.cache_file.clone());
    let stats = cache.stats().await;
    output::print_stats(&stats, &format)
}

/// Launch the interactive picker and print the chosen template's content
async fn cmd_tui(config: &Config) -> Result<()> {
    let registry = Registry::from_config(config);
    let repos: Vec<RepoRef> = registry.refs();
    let cache = IndexCache::new(config.storage.cache_file.clone());

    let index = cache.get_index(&repos, false).await?;
    let chosen = tokio::task::spawn_blocking(move || tui::run(index)).await??;

    if let Some(record) = chosen {
        let body = record.body();
        print!("{}", body);
        if !body.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

/// A source is a git remote when it carries a scheme or is scp-like
fn is_git_url(source: &str) -> bool {
    source.contains("://") || (source.contains('@') && source.contains(':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_git_url() {
        assert!(is_git_url("https://github.com/org/templates.git"));
        assert!(is_git_url("ssh://git@host/org/templates.git"));
        assert!(is_git_url("git@github.com:org/templates.git"));
        assert!(!is_git_url("/home/user/templates"));
        assert!(!is_git_url("./relative/dir"));
        assert!(!is_git_url("templates"));
    }
}
