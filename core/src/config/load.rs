use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default tablero data directory: ~/.tablero
pub fn get_tablero_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".tablero"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.tablero/config.toml (highest)
    let tablero_dir = get_tablero_data_dir()?;
    let user_config = tablero_dir.join("config.toml");

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg: AppConfig = if user_config.exists() {
        let s = std::fs::read_to_string(&user_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    // Update logging directory to use tablero data directory if not set
    if cfg
        .logging
        .directory
        .as_deref()
        .map(str::trim)
        .map(str::is_empty)
        .unwrap_or(true)
    {
        let logs_dir = tablero_dir.join("logs");
        std::fs::create_dir_all(&logs_dir)?;
        cfg.logging.directory = Some(logs_dir.to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg);

    Ok(cfg)
}

// Environment variable overrides (Priority 0: highest)
fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Ok(v) = std::env::var("TABLERO_BASE_URL") {
        if !v.trim().is_empty() {
            cfg.api.base_url = v;
        }
    }
    if let Ok(v) = std::env::var("TABLERO_TIMEOUT_MS") {
        if let Ok(ms) = v.trim().parse::<u64>() {
            cfg.api.timeout_ms = ms;
        }
    }
}
