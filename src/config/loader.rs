//! Configuration file loading with precedence handling.

use crate::breakpoint::BreakpointThresholds;
use crate::data::StaleResponsePolicy;
use crate::path::DEFAULT_PATH_CACHE_CAPACITY;
use crate::persist::debounce::DEFAULT_DEBOUNCE;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GRIDSTATE_CONFIG";

/// Environment variable overriding the log file path.
pub const LOG_FILE_ENV: &str = "GRIDSTATE_LOG_FILE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional; unset fields take the defaults of
/// [`ResolvedConfig`]. Corresponds to `~/.config/gridstate/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Gate the column lists by structural equality.
    #[serde(default)]
    pub columns_cache: Option<bool>,

    /// Gate the row array by structural equality.
    #[serde(default)]
    pub data_cache: Option<bool>,

    /// Delay before column overrides are written to storage.
    #[serde(default)]
    pub persistence_debounce_ms: Option<u64>,

    /// Distinct paths memoized before the path cache is cleared.
    #[serde(default)]
    pub path_cache_capacity: Option<usize>,

    /// Rows per page before the user changes it.
    #[serde(default)]
    pub default_page_size: Option<u64>,

    /// `"apply"` or `"drop"` out-of-order fetch responses.
    #[serde(default)]
    pub stale_responses: Option<StaleResponsePolicy>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Breakpoint min widths in pixels.
    #[serde(default)]
    pub breakpoints: Option<BreakpointThresholds>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Column list gating.
    pub columns_cache: bool,
    /// Row array gating.
    pub data_cache: bool,
    /// Column override write-back delay.
    pub persistence_debounce: Duration,
    /// Path cache bound.
    pub path_cache_capacity: usize,
    /// Initial page size.
    pub default_page_size: u64,
    /// Out-of-order response handling.
    pub stale_responses: StaleResponsePolicy,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Breakpoint min widths.
    pub breakpoints: BreakpointThresholds,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            columns_cache: false,
            data_cache: false,
            persistence_debounce: DEFAULT_DEBOUNCE,
            path_cache_capacity: DEFAULT_PATH_CACHE_CAPACITY,
            default_page_size: crate::data::DEFAULT_PAGE_SIZE,
            stale_responses: StaleResponsePolicy::default(),
            log_file_path: default_log_path(),
            breakpoints: BreakpointThresholds::default(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/gridstate/gridstate.log` on Linux, the platform
/// equivalent elsewhere, or `gridstate.log` in the current directory when no
/// state directory exists.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("gridstate").join("gridstate.log")
    } else {
        PathBuf::from("gridstate.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/gridstate/config.toml` on Linux, the platform
/// equivalent elsewhere, or `None` without a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gridstate").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument
/// 2. `GRIDSTATE_CONFIG` environment variable
/// 3. Default path `~/.config/gridstate/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if `GRIDSTATE_CONFIG` is not valid Unicode.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV) {
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `GRIDSTATE_LOG_FILE` for the log file path.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        config.log_file_path = PathBuf::from(path);
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        columns_cache: config.columns_cache.unwrap_or(defaults.columns_cache),
        data_cache: config.data_cache.unwrap_or(defaults.data_cache),
        persistence_debounce: config
            .persistence_debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.persistence_debounce),
        path_cache_capacity: config
            .path_cache_capacity
            .unwrap_or(defaults.path_cache_capacity),
        default_page_size: config.default_page_size.unwrap_or(defaults.default_page_size),
        stale_responses: config.stale_responses.unwrap_or(defaults.stale_responses),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        breakpoints: config.breakpoints.unwrap_or(defaults.breakpoints),
    }
}

/// Full resolution: precedence load, merge with defaults, env overrides.
///
/// # Errors
///
/// See [`load_config_with_precedence`].
pub fn resolve(config_path: Option<PathBuf>) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    Ok(apply_env_overrides(merge_config(file)))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
