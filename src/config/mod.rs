pub mod schema;

pub use schema::{CalculatorConfig, API_KEY_ENV, MODEL_ENV};

use crate::tools::ToolRegistry;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config location (~/.calcbot/calcbot.toml).
pub fn default_config_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".calcbot").join("calcbot.toml"))
        .unwrap_or_else(|| PathBuf::from("calcbot.toml"))
}

/// Resolve a path that may contain `~` to an absolute path.
pub fn resolve_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<CalculatorConfig> {
    let config: CalculatorConfig = if path.exists() {
        debug!("Reading config from {}", path.display());
        let contents =
            std::fs::read_to_string(path).context("Failed to read calcbot config file")?;
        toml::from_str(&contents).context("Failed to parse calcbot config (TOML)")?
    } else {
        debug!("No config at {}, using defaults", path.display());
        CalculatorConfig::default()
    };
    validate_config(&config)?;
    Ok(config)
}

/// Check ranges and tool names before the config is frozen.
pub fn validate_config(config: &CalculatorConfig) -> Result<()> {
    if !(0.0..=2.0).contains(&config.temperature) {
        bail!(
            "temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        );
    }
    if config.model.trim().is_empty() {
        bail!("model must not be empty");
    }
    ToolRegistry::subset(config.tools.as_slice()).context("Invalid tool list in config")?;
    Ok(())
}
