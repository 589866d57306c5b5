use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rondel::CenterImageSize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub fn default_palette() -> Vec<String> {
    ["#e2231a", "#efb71d", "#24a643", "#1660a8", "#7b3fa0", "#f05a28"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SpinConfig {
    pub duration_ms: u64,
    /// Full turns added on top of the distance to the winner.
    pub turns: u32,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            duration_ms: 6000,
            turns: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Spreadsheet export (JSON array of records) to load participants from.
    pub entries_file: Option<PathBuf>,
    pub palette: Vec<String>,
    pub center_image: Option<PathBuf>,
    pub center_image_size: CenterImageSize,
    pub spin: SpinConfig,
    pub window: WindowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entries_file: None,
            palette: default_palette(),
            center_image: None,
            center_image_size: CenterImageSize::default(),
            spin: SpinConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "rondel", "tombola").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("TOMBOLA"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_setup() -> Config {
    if let Ok(path) = get_config_path()
        && !path.exists()
        && let Err(e) = write_default_config()
    {
        log::warn!("Failed to write default config: {}", e);
    }

    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::Reload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.palette, default_palette());
        assert_eq!(config.spin.duration_ms, 6000);
        assert_eq!(config.spin.turns, 5);
        assert_eq!(config.window.width, 800);
        assert_eq!(config.center_image_size, CenterImageSize::Medium);
        assert!(config.entries_file.is_none());
    }

    #[test]
    fn test_full_config_deserialization() {
        let config: Config = serde_json::from_str(
            r#"{
                "entries_file": "/data/entries.json",
                "palette": ["#ffffff", "#000000"],
                "center_image": "/data/logo.png",
                "center_image_size": "l",
                "spin": {"duration_ms": 9000, "turns": 8},
                "window": {"width": 1280, "height": 720}
            }"#,
        )
        .unwrap();
        assert_eq!(config.entries_file.as_deref().unwrap().to_str(), Some("/data/entries.json"));
        assert_eq!(config.palette.len(), 2);
        assert_eq!(config.center_image_size, CenterImageSize::Large);
        assert_eq!(config.spin.duration_ms, 9000);
        assert_eq!(config.window.height, 720);
    }

    #[test]
    fn test_default_palette_is_valid() {
        assert!(rondel::Palette::from_hex(&default_palette()).is_ok());
    }
}
