//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use templateindex::TemplateType;

/// Templib - git-backed template library manager
#[derive(Parser)]
#[command(
    name = "tl",
    about = "Find and manage reusable prompt/context templates across git repositories",
    version,
    after_help = "Logs are written to: ~/.local/share/templib/logs/templib.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Search templates by keyword
    Search {
        /// Keyword to search for
        keyword: String,

        /// Restrict to one template type (prompt, context)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        kind: Option<TemplateType>,

        /// Require this label (repeatable)
        #[arg(short, long = "label", value_name = "LABEL")]
        labels: Vec<String>,

        /// Require all given labels instead of any
        #[arg(long)]
        all_labels: bool,

        /// Restrict to one repository
        #[arg(short, long)]
        repo: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        max: Option<usize>,

        /// Compare case-sensitively
        #[arg(long)]
        case_sensitive: bool,

        /// Also scan raw template content for the keyword
        #[arg(long)]
        deep: bool,

        /// Rebuild the index before searching
        #[arg(long)]
        rebuild: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List all indexed templates
    List {
        /// Restrict to one template type (prompt, context)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        kind: Option<TemplateType>,

        /// Require this label (repeatable)
        #[arg(short, long = "label", value_name = "LABEL")]
        labels: Vec<String>,

        /// Restrict to one repository
        #[arg(short, long)]
        repo: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one template in full
    Show {
        /// Template id
        id: String,

        /// Disambiguate when the id exists in several repositories
        #[arg(short, long)]
        repo: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Manage configured repositories
    Repo {
        #[command(subcommand)]
        command: RepoCommand,
    },

    /// Manage the template index
    Index {
        #[command(subcommand)]
        command: IndexCommand,
    },

    /// Launch the interactive template picker
    Tui,
}

/// Repository subcommands
#[derive(Subcommand)]
pub enum RepoCommand {
    /// Add a repository (git URL or local path)
    Add {
        /// Git URL or local checkout path
        source: String,

        /// Repository name (derived from the source when omitted)
        #[arg(long)]
        name: Option<String>,

        /// Branch to clone
        #[arg(long)]
        branch: Option<String>,
    },

    /// Remove a repository from the configuration
    Remove {
        /// Repository name
        name: String,
    },

    /// Clone or pull repositories
    Update {
        /// Repository name (all when omitted)
        name: Option<String>,
    },

    /// List configured repositories
    List {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Index subcommands
#[derive(Subcommand)]
pub enum IndexCommand {
    /// Force a full rebuild
    Rebuild,

    /// Delete the persisted index
    Clear,

    /// Show cache diagnostics
    Stats {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for rendering commands
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["tl"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_search() {
        let cli = Cli::parse_from(["tl", "search", "python"]);
        if let Some(Command::Search { keyword, deep, kind, .. }) = cli.command {
            assert_eq!(keyword, "python");
            assert!(!deep);
            assert!(kind.is_none());
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_cli_parse_search_flags() {
        let cli = Cli::parse_from([
            "tl",
            "search",
            "deploy",
            "--type",
            "prompt",
            "--label",
            "ops",
            "--label",
            "ci",
            "--all-labels",
            "--deep",
            "--max",
            "5",
        ]);
        if let Some(Command::Search {
            kind,
            labels,
            all_labels,
            deep,
            max,
            ..
        }) = cli.command
        {
            assert_eq!(kind, Some(TemplateType::Prompt));
            assert_eq!(labels, vec!["ops".to_string(), "ci".to_string()]);
            assert!(all_labels);
            assert!(deep);
            assert_eq!(max, Some(5));
        } else {
            panic!("Expected Search command");
        }
    }

    #[test]
    fn test_cli_parse_repo_add() {
        let cli = Cli::parse_from(["tl", "repo", "add", "https://example.com/t.git", "--name", "team"]);
        if let Some(Command::Repo {
            command: RepoCommand::Add { source, name, branch },
        }) = cli.command
        {
            assert_eq!(source, "https://example.com/t.git");
            assert_eq!(name.as_deref(), Some("team"));
            assert!(branch.is_none());
        } else {
            panic!("Expected Repo Add command");
        }
    }

    #[test]
    fn test_cli_parse_index_subcommands() {
        let cli = Cli::parse_from(["tl", "index", "rebuild"]);
        assert!(matches!(
            cli.command,
            Some(Command::Index {
                command: IndexCommand::Rebuild
            })
        ));

        let cli = Cli::parse_from(["tl", "index", "stats", "--format", "json"]);
        assert!(matches!(
            cli.command,
            Some(Command::Index {
                command: IndexCommand::Stats {
                    format: OutputFormat::Json
                }
            })
        ));
    }

    #[test]
    fn test_cli_parse_tui() {
        let cli = Cli::parse_from(["tl", "tui"]);
        assert!(matches!(cli.command, Some(Command::Tui)));
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["tl", "-c", "/path/to/templib.yml", "list"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/templib.yml")));
    }
}
