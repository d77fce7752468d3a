//! Configuration management for the owpack CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Storage root used when `extract` is not given one
    pub storage_root: Option<PathBuf>,
    /// Output directory used when `extract` is not given one
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("owpack");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Argument wins over config; error if neither is set
    pub fn storage_root(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        arg.or_else(|| self.storage_root.clone()).context(
            "No storage root given. Pass --root or run: owpack configure --storage-root <DIR>",
        )
    }

    /// Argument wins over config, then the current directory
    pub fn output_dir(&self, arg: Option<PathBuf>) -> PathBuf {
        arg.or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            storage_root: Some(PathBuf::from("/games/storage")),
            output_dir: None,
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "storage_root = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_argument_overrides_config() {
        let config = Config {
            storage_root: Some(PathBuf::from("/configured")),
            output_dir: Some(PathBuf::from("/out")),
        };
        assert_eq!(
            config.storage_root(Some(PathBuf::from("/arg"))).unwrap(),
            PathBuf::from("/arg")
        );
        assert_eq!(config.storage_root(None).unwrap(), PathBuf::from("/configured"));
        assert_eq!(config.output_dir(None), PathBuf::from("/out"));

        assert!(Config::default().storage_root(None).is_err());
        assert_eq!(Config::default().output_dir(None), PathBuf::from("."));
    }
}
