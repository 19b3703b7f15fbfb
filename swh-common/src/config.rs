//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the SwiftHealth root folder
pub const ROOT_FOLDER_ENV: &str = "SWH_ROOT_FOLDER";

/// Subdirectory of the root folder holding one folder per patient record
pub const RECORDS_DIR_NAME: &str = "patient_records";

/// TOML configuration file contents (`config.toml` in the platform config
/// directory)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `SWH_ROOT_FOLDER` environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        tracing::debug!("Root folder from command line: {}", path.display());
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            tracing::debug!("Root folder from {}: {}", ROOT_FOLDER_ENV, path);
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config) = load_config_file() {
        if let Some(root_folder) = config.root_folder {
            tracing::debug!("Root folder from config file: {}", root_folder.display());
            return root_folder;
        }
    }

    // Priority 4: OS-dependent compiled default
    let fallback = default_root_folder();
    tracing::debug!("Root folder defaulted to {}", fallback.display());
    fallback
}

/// Directory holding one folder per patient record
pub fn records_dir(root_folder: &Path) -> PathBuf {
    root_folder.join(RECORDS_DIR_NAME)
}

/// Create the records directory (and its parents) if missing
pub fn ensure_records_dir(root_folder: &Path) -> Result<PathBuf> {
    let dir = records_dir(root_folder);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Load the TOML config file from the platform config directory
fn load_config_file() -> Result<TomlConfig> {
    let path = config_file_path()
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if !path.exists() {
        return Err(Error::Config(format!("Config file not found: {}", path.display())));
    }

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Platform config file location, e.g. `~/.config/swifthealth/config.toml`
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("swifthealth").join("config.toml"))
}

/// OS-dependent default root folder, e.g. `~/.local/share/swifthealth`
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("swifthealth"))
        .unwrap_or_else(|| PathBuf::from("./swifthealth_data"))
}
