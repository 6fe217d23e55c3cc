use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::app::config::LoggingConfig;

/// `RUST_LOG` wins over the configured filter.
pub fn init(cfg: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cfg.filter))?;
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("init logging: {e}"))
}
