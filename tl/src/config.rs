//! Templib configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main templib configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configured template repositories
    pub repos: Vec<RepoEntry>,

    /// Storage locations
    pub storage: StorageConfig,

    /// Search defaults
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .templib.yml
        let local_config = PathBuf::from(".templib.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/templib/templib.yml
        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, content).context(format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Path of the user-level config file (~/.config/templib/templib.yml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("templib").join("templib.yml"))
    }

    /// Where a config mutation should be written back
    ///
    /// The explicit `--config` path wins, then an existing project-local
    /// `.templib.yml`, then the user config location.
    pub fn write_path(explicit: Option<&PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path.clone();
        }
        let local_config = PathBuf::from(".templib.yml");
        if local_config.exists() {
            return local_config;
        }
        Self::user_config_path().unwrap_or(local_config)
    }

    /// Look up a configured repository by name
    pub fn repo(&self, name: &str) -> Option<&RepoEntry> {
        self.repos.iter().find(|r| r.name == name)
    }
}

/// A configured template repository
///
/// Either `url` (cloned under `storage.repos-dir/<name>`) or `path`
/// (a local checkout used in place) must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoEntry {
    /// Repository name (unique across the config)
    pub name: String,

    /// Git remote URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Local checkout path (used in place, never cloned)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Branch to track (clone-time only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory where url-based repositories are cloned
    #[serde(rename = "repos-dir")]
    pub repos_dir: PathBuf,

    /// Path of the persisted template index
    #[serde(rename = "cache-file")]
    pub cache_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/templib on Linux)
        let repos_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("templib")
            .join("repos");

        Self {
            repos_dir,
            cache_file: templateindex::IndexCache::default_path(),
        }
    }
}

/// Search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of results returned
    #[serde(rename = "max-results")]
    pub max_results: usize,

    /// Compare query and fields case-sensitively
    #[serde(rename = "case-sensitive")]
    pub case_sensitive: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 20,
            case_sensitive: false,
        }
    }
}
