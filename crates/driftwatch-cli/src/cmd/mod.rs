pub mod api_calls;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod fullprocess;
pub mod ingest;
pub mod init;
pub mod report;
pub mod score;
pub mod serve;
pub mod train;

use anyhow::Context;
use driftwatch_core::config::Config;
use std::path::Path;

/// Load `config.yaml` and reject configs with validation errors.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    let config = Config::load(root).context("failed to load config")?;
    config.ensure_valid()?;
    Ok(config)
}
