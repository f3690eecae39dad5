// ==============================================================================
// config.rs - VEHICLE CONFIG LOADING (JSON)
// ------------------------------------------------------------------------------
// Any field left out of the file falls back to the ARCADE preset
// (#[serde(default)] on VehicleConfig). Loaded configs are validated before
// they reach a controller.
// ==============================================================================

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::vehicle::VehicleConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

pub fn parse_config(json: &str) -> Result<VehicleConfig, ConfigError> {
    let cfg: VehicleConfig = serde_json::from_str(json)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<VehicleConfig, ConfigError> {
    let text = fs::read_to_string(path.as_ref())?;
    let cfg = parse_config(&text)?;
    tracing::info!(path = %path.as_ref().display(), "loaded vehicle config");
    Ok(cfg)
}
