//! Configuration for the command-line tool.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (RAPIDS_ENVIRONMENT, RAPIDS_STEPS)
//! 2. Config file (.rapids/config.yaml)
//! 3. Defaults (~/.magenta_rapids, one mutation step, `.mid` extension)
//!
//! Config file discovery:
//! - Searches current directory and parents for .rapids/config.yaml
//! - Paths in config file are relative to the directory containing .rapids/
//!
//! Only the CLI reads configuration. Library types are always constructed
//! with explicit arguments.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::backends::DEFAULT_EXTENSION;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Default number of mutation steps
pub const DEFAULT_STEPS: i64 = 1;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Environment root (relative to the project root)
    pub environment: Option<String>,
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub mutate: Option<MutateConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MutateConfig {
    pub steps: Option<i64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Environment root used when none is given on the command line
    pub environment: PathBuf,
    /// Extension given to stored files
    pub extension: String,
    /// Mutation steps used when `-n` is not given
    pub steps: i64,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".rapids").join("config.yaml");
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

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Default environment root (~/.magenta_rapids)
fn default_environment() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".magenta_rapids"))
}

/// Merge a parsed config file and environment overrides into a resolved config
fn resolve(
    config: Option<(&Path, ConfigFile)>,
    env_environment: Option<String>,
    env_steps: Option<String>,
) -> Result<ResolvedConfig> {
    let mut environment = None;
    let mut extension = None;
    let mut steps = None;
    let mut config_file = None;

    if let Some((config_path, config)) = config {
        // Base directory is the parent of .rapids/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        environment = config
            .environment
            .as_deref()
            .map(|p| resolve_path(base_dir, p));
        extension = config.store.and_then(|s| s.extension);
        steps = config.mutate.and_then(|m| m.steps);
        config_file = Some(config_path.to_path_buf());
    }

    if let Some(env_dir) = env_environment {
        environment = Some(PathBuf::from(env_dir));
    }
    if let Some(env_steps) = env_steps {
        let parsed = env_steps
            .trim()
            .parse::<i64>()
            .with_context(|| format!("Invalid RAPIDS_STEPS value: {}", env_steps))?;
        steps = Some(parsed);
    }

    let environment = match environment {
        Some(path) => path,
        None => default_environment()?,
    };

    Ok(ResolvedConfig {
        environment,
        extension: extension.unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        steps: steps.unwrap_or(DEFAULT_STEPS),
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_path = find_config_file();
    let config = match config_path {
        Some(ref path) => Some((path.as_path(), load_config_file(path)?)),
        None => None,
    };

    resolve(
        config,
        std::env::var("RAPIDS_ENVIRONMENT").ok(),
        std::env::var("RAPIDS_STEPS").ok(),
    )
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
