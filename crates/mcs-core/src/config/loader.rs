//! Configuration file discovery and loading

use std::path::{Path, PathBuf};

use super::McsConfig;
use crate::error::McsError;
use crate::result::ResultExt;
use crate::Result;

/// File names searched in each directory, highest priority first
pub const CONFIG_FILE_NAMES: [&str; 5] = [
    ".mcsrc.json",
    ".mcsrc.toml",
    "mcs.yaml",
    "mcs.yml",
    "mcs.json",
];

/// Discovers and loads configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by walking up from `start_path`
    ///
    /// Each directory is checked for [`CONFIG_FILE_NAMES`] in order; the
    /// search stops at the first hit or at the filesystem root.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| McsError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    pub fn load_from_file(path: &Path) -> Result<McsConfig> {
        McsConfig::load(path).map_err(|e| {
            McsError::config_error(format!(
                "Failed to load config from '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Load from `custom_path`, or discover from `start_dir`
    ///
    /// An explicit path must exist. When discovery finds nothing the
    /// defaults are returned.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<McsConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(McsError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(McsConfig::default())
            }
        }
    }

    /// Like [`ConfigLoader::load`], but a broken file degrades to defaults
    pub fn load_or_default(start_dir: Option<&Path>) -> McsConfig {
        Self::load(None, start_dir)
            .log_and_continue()
            .unwrap_or_default()
    }
}
