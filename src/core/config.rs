//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the config file inside the config directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Seconds to wait for the completion command when `ai_timeout_secs` is unset
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// OmniFix configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External command that answers completion prompts (prompt on stdin)
    pub ai_command: Option<String>,

    /// Credential handed to the completion command
    pub api_key: Option<String>,

    /// Seconds before a running completion command is killed
    pub ai_timeout_secs: Option<u64>,

    /// YAML catalog replacing the built-in one
    pub catalog: Option<PathBuf>,

    /// Directory holding the local key-value store
    pub data_dir: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,
}

/// Valid configuration keys with their descriptions
pub const VALID_KEYS: &[(&str, &str)] = &[
    ("ai_command", "Command that answers AI completion prompts"),
    ("api_key", "Credential passed to the AI command"),
    (
        "ai_timeout_secs",
        "Seconds before the AI command is abandoned (default 60)",
    ),
    ("catalog", "Path to a YAML knowledge catalog"),
    ("data_dir", "Directory for the local store"),
    (
        "default_format",
        "Default output format (text, json, yaml, tsv, md)",
    ),
];

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/omnifix/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Environment variables
        config.merge(Self::from_env());

        config
    }

    /// Read one config file; a missing or broken file yields None
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    fn from_env() -> Config {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Config {
            ai_command: var("OMNIFIX_AI_COMMAND"),
            api_key: var("OMNIFIX_API_KEY"),
            ai_timeout_secs: var("OMNIFIX_AI_TIMEOUT_SECS").and_then(|v| match v.parse() {
                Ok(secs) => Some(secs),
                Err(_) => {
                    tracing::warn!(value = %v, "ignoring non-numeric OMNIFIX_AI_TIMEOUT_SECS");
                    None
                }
            }),
            catalog: var("OMNIFIX_CATALOG").map(PathBuf::from),
            data_dir: var("OMNIFIX_DATA_DIR").map(PathBuf::from),
            default_format: var("OMNIFIX_FORMAT"),
        }
    }

    /// Directory holding the global config file
    ///
    /// `OMNIFIX_CONFIG_DIR` overrides the platform default.
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(dir) = std::env::var("OMNIFIX_CONFIG_DIR") {
            if !dir.is_empty() {
                return Some(PathBuf::from(dir));
            }
        }
        directories::ProjectDirs::from("", "", "omnifix").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.ai_command.is_some() {
            self.ai_command = other.ai_command;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.ai_timeout_secs.is_some() {
            self.ai_timeout_secs = other.ai_timeout_secs;
        }
        if other.catalog.is_some() {
            self.catalog = other.catalog;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Directory for persisted state, falling back to the platform data dir
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "omnifix")
                .map(|dirs| dirs.data_dir().to_path_buf())
        })
    }

    /// Completion command deadline
    pub fn ai_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ai_timeout_secs.unwrap_or(DEFAULT_AI_TIMEOUT_SECS))
    }

    /// Look up a value by key name, for `omnifix config show <key>`
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "ai_command" => self.ai_command.clone(),
            "api_key" => self.api_key.clone(),
            "ai_timeout_secs" => self.ai_timeout_secs.map(|s| s.to_string()),
            "catalog" => self.catalog.as_ref().map(|p| p.display().to_string()),
            "data_dir" => self.data_dir.as_ref().map(|p| p.display().to_string()),
            "default_format" => self.default_format.clone(),
            _ => None,
        }
    }
}
