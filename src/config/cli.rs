use crate::config::ClientConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Launch options. Everything after start-up happens interactively.
#[derive(Debug, Clone, Parser)]
#[command(name = "inventory-lookup")]
#[command(about = "Look up stock quantities per product variant")]
pub struct CliArgs {
    #[arg(long, short = 'c', env = "INVENTORY_CONFIG", help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override service.base_url")]
    pub base_url: Option<String>,

    #[arg(long, help = "Override session.token_path")]
    pub token_path: Option<String>,

    #[arg(long, help = "Override service.timeout_seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliArgs {
    /// File (or defaults), then `INVENTORY_*` environment, then flags.
    pub fn resolve_config(&self) -> Result<ClientConfig> {
        let config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };
        let mut config = config.with_env_overrides()?;

        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
        }
        if let Some(token_path) = &self.token_path {
            config.session.token_path = token_path.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.service.timeout_seconds = timeout;
        }

        Ok(config)
    }
}
