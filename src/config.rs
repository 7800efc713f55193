//! Configuration for shelf.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SHELF_HOME, SHELF_DATA, SHELF_API_URL, SHELF_API_KEY)
//! 2. Config file (.shelf/config.yaml)
//! 3. Defaults (~/.shelf)
//!
//! Config file discovery:
//! - Searches current directory and parents for .shelf/config.yaml
//! - Paths in config file are relative to the .shelf/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::google_books::{DEFAULT_BASE_URL, DEFAULT_MAX_RESULTS};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Subjects recommendations are drawn from
pub const DEFAULT_SUBJECTS: [&str; 10] = [
    "fiction",
    "mystery",
    "romance",
    "science",
    "history",
    "biography",
    "fantasy",
    "thriller",
    "poetry",
    "business",
];

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub recommendations: Option<RecommendationsConfig>,
    #[serde(default)]
    pub library: Option<LibraryConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Shelf home directory (relative to .shelf/)
    pub home: Option<String>,
    /// Data directory for persisted lists (relative to .shelf/)
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub max_results: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsConfig {
    pub subjects: Option<Vec<String>>,
    pub max_results: Option<u32>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    pub merge_by_title: Option<bool>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to shelf home
    pub home: PathBuf,
    /// Directory holding books.json and recommendations.json
    pub data: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub search: SearchSettings,
    pub recommendations: RecommendationSettings,
    pub library: LibrarySettings,
}

/// Catalog client settings
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub max_results: u32,
    pub timeout_seconds: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            max_results: DEFAULT_MAX_RESULTS,
            timeout_seconds: 15,
        }
    }
}

/// Recommendation refresh settings
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSettings {
    pub subjects: Vec<String>,
    pub max_results: u32,
    pub delay_ms: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            max_results: 10,
            delay_ms: 1000,
        }
    }
}

impl RecommendationSettings {
    /// Delay before the startup refresh
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Library reconciliation settings
#[derive(Debug, Clone, PartialEq)]
pub struct LibrarySettings {
    /// Treat a book with the same title and author list as already shelved
    pub merge_by_title: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            merge_by_title: true,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".shelf").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Merge defaults, an optional config file and environment overrides
fn resolve_config(
    default_home: PathBuf,
    file: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let (config_file, config) = match file {
        Some((path, config)) => (Some(path), Some(config)),
        None => (None, None),
    };

    // Relative paths in the file are anchored at .shelf/
    let shelf_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf);

    let paths = config.as_ref().map(|c| c.paths.clone()).unwrap_or_default();

    let home = if let Some(env_home) = env("SHELF_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(dir), Some(home)) = (&shelf_dir, &paths.home) {
        resolve_path(dir, home)
    } else {
        default_home
    };

    let data = if let Some(env_data) = env("SHELF_DATA") {
        PathBuf::from(env_data)
    } else if let (Some(dir), Some(data)) = (&shelf_dir, &paths.data) {
        resolve_path(dir, data)
    } else {
        home.join("data")
    };

    let search_file = config.as_ref().and_then(|c| c.search.clone());
    let defaults = SearchSettings::default();
    let search = SearchSettings {
        base_url: env("SHELF_API_URL")
            .or_else(|| search_file.as_ref().and_then(|s| s.base_url.clone()))
            .unwrap_or(defaults.base_url),
        api_key: env("SHELF_API_KEY")
            .or_else(|| search_file.as_ref().and_then(|s| s.api_key.clone())),
        max_results: search_file
            .as_ref()
            .and_then(|s| s.max_results)
            .unwrap_or(defaults.max_results),
        timeout_seconds: search_file
            .as_ref()
            .and_then(|s| s.timeout_seconds)
            .unwrap_or(defaults.timeout_seconds),
    };

    let recs_file = config.as_ref().and_then(|c| c.recommendations.clone());
    let defaults = RecommendationSettings::default();
    let recommendations = RecommendationSettings {
        subjects: recs_file
            .as_ref()
            .and_then(|r| r.subjects.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.subjects),
        max_results: recs_file
            .as_ref()
            .and_then(|r| r.max_results)
            .unwrap_or(defaults.max_results),
        delay_ms: recs_file
            .as_ref()
            .and_then(|r| r.delay_ms)
            .unwrap_or(defaults.delay_ms),
    };

    let library = LibrarySettings {
        merge_by_title: config
            .as_ref()
            .and_then(|c| c.library.as_ref())
            .and_then(|l| l.merge_by_title)
            .unwrap_or(true),
    };

    ResolvedConfig {
        home,
        data,
        config_file,
        search,
        recommendations,
        library,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".shelf");

    let file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    Ok(resolve_config(default_home, file, |key| std::env::var(key).ok()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the shelf home directory
pub fn shelf_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the directory holding persisted lists
pub fn data_dir() -> Result<PathBuf> {
    Ok(config()?.data.clone())
}
