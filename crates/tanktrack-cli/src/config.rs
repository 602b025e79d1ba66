use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TankConfig {
    #[serde(default)]
    pub engine: EngineSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EngineSection {
    pub url: Option<String>,
    pub bearer_token: Option<String>,
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// Configuration from the data directory; defaults when no file exists.
pub fn read_config(data_dir: &Path) -> anyhow::Result<TankConfig> {
    let path = config_path(data_dir);
    if !path.exists() {
        return Ok(TankConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(data_dir: &Path, config: &TankConfig) -> anyhow::Result<()> {
    let path = config_path(data_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(&path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("tanktrack"));
        }
    }
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; pass --data-dir or set TANKTRACK_DATA"))?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("tanktrack"))
}
