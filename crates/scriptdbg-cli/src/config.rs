//! CLI configuration management

use scriptdbg_vm::MachineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default tracing filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Maximum arithmetic operand length in bytes
    #[serde(default = "default_max_num_len")]
    pub max_num_len: usize,
    /// Maximum combined stack depth
    #[serde(default = "default_max_stack_size")]
    pub max_stack_size: usize,
    /// Print JSON without passing `--json`
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_max_num_len() -> usize {
    MachineConfig::default().max_num_len
}

fn default_max_stack_size() -> usize {
    MachineConfig::default().max_stack_size
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_num_len: default_max_num_len(),
            max_stack_size: default_max_stack_size(),
            json: false,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".scriptdbg"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from file or return default
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load config from `path`, falling back to defaults when missing or malformed.
    /// Out-of-range values are reset to their defaults with a warning on stderr.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let mut config: Self = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default();

        for notice in config.sanitize() {
            eprintln!("Warning: {}: {}", path.display(), notice);
        }
        config
    }

    /// Reset values `config --set-*` would reject, returning one notice per reset field
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut notices = Vec::new();

        if !(1..=8).contains(&self.max_num_len) {
            notices.push(format!(
                "max_num_len must be between 1 and 8, got {}, using {}",
                self.max_num_len,
                default_max_num_len()
            ));
            self.max_num_len = default_max_num_len();
        }

        if self.max_stack_size == 0 {
            notices.push(format!(
                "max_stack_size must be positive, using {}",
                default_max_stack_size()
            ));
            self.max_stack_size = default_max_stack_size();
        }

        if EnvFilter::try_new(&self.log_level).is_err() {
            notices.push(format!(
                "invalid log_level '{}', using '{}'",
                self.log_level,
                default_log_level()
            ));
            self.log_level = default_log_level();
        }

        notices
    }

    /// Save config to file
    pub fn save(&self) -> Result<(), std::io::Error> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "Cannot determine config path")
        })?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        std::fs::write(path, content)
    }

    /// Machine limits for new sessions
    pub fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            max_num_len: self.max_num_len,
            max_stack_size: self.max_stack_size,
        }
    }
}
