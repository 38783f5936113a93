//! Show or initialize the configuration file.

use std::path::PathBuf;

use oxboard_common::{config_file_path, AppConfig};

pub fn run(path: Option<PathBuf>, current: &AppConfig, init: bool) -> anyhow::Result<()> {
    let target = path.unwrap_or_else(config_file_path);

    if init {
        if target.exists() {
            anyhow::bail!(
                "Config already exists at {}; remove it first to reinitialize",
                target.display()
            );
        }
        AppConfig::default()
            .save_to(&target)
            .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
        println!("Default configuration written to {}", target.display());
        return Ok(());
    }

    if target.exists() {
        println!("# {}", target.display());
    } else {
        println!("# {} (not found, showing defaults)", target.display());
    }
    println!("{}", serde_json::to_string_pretty(current)?);
    Ok(())
}
