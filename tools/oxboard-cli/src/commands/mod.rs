pub mod config;
pub mod replay;
pub mod synth;
pub mod validate;

use std::path::Path;

use oxboard_common::AppConfig;

/// Explicit config file if given, otherwise the standard location.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display())),
        None => Ok(AppConfig::load()),
    }
}
