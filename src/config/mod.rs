#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{InventoryError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TOKEN_PATH: &str = ".inventory-lookup/session.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub service: ServiceConfig,
    pub session: SessionConfig,
    pub stock: StockConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Extra attempts for stock queries that failed in transport. Login and
    /// register never retry.
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            retry_attempts: 0,
            retry_delay_seconds: 1,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub token_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_path: DEFAULT_TOKEN_PATH.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn token_path(&self) -> PathBuf {
        PathBuf::from(&self.token_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    pub default_base: String,
    pub known_bases: Vec<String>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            default_base: "DEPOSEVN".to_string(),
            known_bases: vec!["DEPOSEVN".to_string(), "DEPOFORT".to_string()],
        }
    }
}

impl StockConfig {
    pub fn is_known_base(&self, base: &str) -> bool {
        self.known_bases.is_empty() || self.known_bases.iter().any(|b| b == base)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

impl ClientConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InventoryError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| InventoryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| InventoryError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Applies `INVENTORY_*` environment overrides on top of the loaded values.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(base_url) = std::env::var("INVENTORY_BASE_URL") {
            self.service.base_url = base_url;
        }
        if let Ok(token_path) = std::env::var("INVENTORY_TOKEN_PATH") {
            self.session.token_path = token_path;
        }
        if let Ok(timeout) = std::env::var("INVENTORY_TIMEOUT_SECONDS") {
            self.service.timeout_seconds =
                timeout
                    .parse()
                    .map_err(|_| InventoryError::InvalidConfigValueError {
                        field: "INVENTORY_TIMEOUT_SECONDS".to_string(),
                        value: timeout.clone(),
                        reason: "Expected a whole number of seconds".to_string(),
                    })?;
        }
        Ok(self)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("service.base_url", &self.service.base_url)?;
        validation::validate_range("service.timeout_seconds", self.service.timeout_seconds, 1, 600)?;
        validation::validate_range("service.retry_attempts", self.service.retry_attempts, 0, 10)?;
        validation::validate_path("session.token_path", &self.session.token_path)?;
        validation::validate_non_empty_string("stock.default_base", &self.stock.default_base)?;

        if !self.stock.is_known_base(&self.stock.default_base) {
            return Err(InventoryError::InvalidConfigValueError {
                field: "stock.default_base".to_string(),
                value: self.stock.default_base.clone(),
                reason: format!("Not one of: {}", self.stock.known_bases.join(", ")),
            });
        }

        Ok(())
    }
}
