//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting extract defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
pub fn handle(storage_root: Option<PathBuf>, output_dir: Option<PathBuf>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if storage_root.is_none() && output_dir.is_none() {
        show_usage();
        return Ok(());
    }

    if let Some(root) = storage_root {
        println!("Storage root configured: {}", root.display());
        config.storage_root = Some(root);
    }
    if let Some(dir) = output_dir {
        println!("Output directory configured: {}", dir.display());
        config.output_dir = Some(dir);
    }
    config.save()?;

    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.storage_root {
        Some(root) => println!("Storage root: {}", root.display()),
        None => println!("No storage root configured"),
    }
    match &config.output_dir {
        Some(dir) => println!("Output directory: {}", dir.display()),
        None => println!("No output directory configured"),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

fn show_usage() {
    println!("Usage: owpack configure --storage-root DIR [--output-dir DIR]");
    println!("   or: owpack configure --show");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_config_does_not_panic() {
        show_config(&Config::default());
        show_config(&Config {
            storage_root: Some(PathBuf::from("/storage")),
            output_dir: Some(PathBuf::from("/out")),
        });
    }

    #[test]
    fn test_config_path_is_toml() {
        if let Ok(path) = Config::config_path() {
            assert!(path.ends_with("owpack/config.toml"));
        }
    }
}
