pub mod check;
pub mod init;
pub mod resolve;
pub mod run;

use evflat_config::ProducerConfig;
use std::path::Path;

/// An explicit `--config` path wins over the default location. Environment
/// overrides apply either way.
pub fn load_config(path: Option<&Path>) -> Result<ProducerConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => ProducerConfig::load_from(path).and_then(|mut config| {
            config.apply_env_overrides()?;
            Ok(config)
        }),
        None => ProducerConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}
