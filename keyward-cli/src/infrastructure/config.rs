use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use keyward_wallet_core::shared::constants::DEFAULT_OPERATION_TIMEOUT_SECS;
use keyward_wallet_core::KdfParams;

pub const CONFIG_FILE_VAR: &str = "KEYWARD_CONFIG_FILE";
pub const BASE_DIR_VAR: &str = "KEYWARD_BASE_DIR";
pub const TIMEOUT_VAR: &str = "KEYWARD_TIMEOUT_SECS";
pub const LOG_LEVEL_VAR: &str = "KEYWARD_LOG_LEVEL";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding one JSON document per wallet
    pub base_dir: PathBuf,
    /// Bound for each wallet or account sub-operation
    pub timeout_secs: u64,
    pub log_level: String,
    /// Argon2id cost for newly sealed secrets
    pub kdf: KdfParams,
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_dir: Self::default_base_dir(),
            timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
            log_level: "warn".to_string(),
            kdf: KdfParams::default(),
            config_file_path: None,
        }
    }
}

impl CliConfig {
    /// Defaults, then the optional config file, then the variables `lookup`
    /// yields. Command line overrides are applied by the caller afterwards.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_FILE_VAR) {
            Some(path) if !path.is_empty() => Self::load_from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let mut config: CliConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to deserialize config {}: {}", path.display(), e))?;
        config.config_file_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(BASE_DIR_VAR) {
            self.base_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(TIMEOUT_VAR) {
            self.timeout_secs = u64::from_str(secs.trim())
                .map_err(|e| anyhow!("Invalid {} {:?}: {}", TIMEOUT_VAR, secs, e))?;
        }
        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            self.log_level = level;
        }
        Ok(())
    }

    /// Command line flags take precedence over every other source
    pub fn apply_overrides(
        &mut self,
        base_dir: Option<PathBuf>,
        timeout_secs: Option<u64>,
        log_level: Option<String>,
    ) {
        if let Some(dir) = base_dir {
            self.base_dir = dir;
        }
        if let Some(secs) = timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.base_dir.as_os_str().is_empty() {
            errors.push("Keystore base directory cannot be empty".to_string());
        }
        if self.timeout_secs == 0 {
            errors.push("Operation timeout must be at least one second".to_string());
        }
        if self.kdf.time_cost == 0 || self.kdf.parallelism == 0 {
            errors.push("KDF time cost and parallelism must be non-zero".to_string());
        }
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log level {:?}; expected one of {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        if !errors.is_empty() {
            return Err(anyhow!("Configuration validation failed:\n{}", errors.join("\n")));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn default_base_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyward")
            .join("wallets")
    }
}
