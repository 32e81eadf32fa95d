//! Server config loader (strict parsing).

pub mod schema;

use std::fs;

use vigil_core::error::{Result, VigilError};

pub use schema::{ChaosSection, PredictSection, QuoteSection, ServerConfig, ServerSection, ServiceSection};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "VIGIL_CONFIG";
/// Config file used when `VIGIL_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "vigil.yaml";

pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| VigilError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| VigilError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
