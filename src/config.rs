use crate::gui::images::ImageId;
use crate::gui::wheel::model::SectorKind;
use crate::gui::wheel::spin::TuningError;
use crate::gui::wheel::{ImageAdjust, Sector, SectorContent, SectorId, SpinTuning};
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::{Srgb, Srgba};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

const FALLBACK_COLORS: &[&str] = &[
    "#f87171", "#fb923c", "#facc15", "#4ade80", "#60a5fa", "#a78bfa", "#e879f9",
];

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SectorConfig {
    pub id: Option<SectorId>,
    #[serde(default)]
    pub kind: SectorKind,
    #[serde(default)]
    pub value: String,
    pub color: Option<String>,
    pub image_scale: Option<f64>,
    pub image_x: Option<f64>,
    pub image_y: Option<f64>,
    pub image_rotation: Option<f64>,
    #[serde(alias = "percentage")]
    pub weight: Option<f64>,
}

impl SectorConfig {
    pub fn text(id: &str, value: &str, color: &str) -> Self {
        Self {
            id: Some(SectorId::new(id)),
            kind: SectorKind::Text,
            value: value.to_string(),
            color: Some(color.to_string()),
            image_scale: None,
            image_x: None,
            image_y: None,
            image_rotation: None,
            weight: None,
        }
    }

    /// Builds the runtime sector. Bad fields degrade to defaults instead of failing the wheel.
    pub fn to_sector(&self, index: usize) -> Sector {
        let id = self
            .id
            .clone()
            .unwrap_or_else(|| SectorId::new(format!("sector-{index}")));

        let content = match self.kind {
            SectorKind::Text => SectorContent::Text(self.value.clone()),
            SectorKind::Image => {
                if self.value.trim().is_empty() {
                    log::warn!("Image sector '{}' has no source", id);
                }
                SectorContent::Image(ImageId::new(self.value.trim()))
            }
        };

        let color = match &self.color {
            Some(hex) => parse_color(hex).unwrap_or_else(|| {
                log::warn!("Sector '{}' has invalid color '{}'", id, hex);
                fallback_color(index)
            }),
            None => fallback_color(index),
        };

        let defaults = ImageAdjust::default();
        let adjust = ImageAdjust {
            scale: self.image_scale.unwrap_or(defaults.scale),
            offset_x: self.image_x.unwrap_or(defaults.offset_x),
            offset_y: self.image_y.unwrap_or(defaults.offset_y),
            rotation_degrees: self.image_rotation.unwrap_or(defaults.rotation_degrees),
        };

        Sector {
            id,
            content,
            color,
            adjust,
            weight: self.weight,
        }
    }
}

pub fn parse_color(hex: &str) -> Option<Srgba<f64>> {
    let rgb: Srgb<f64> = Srgb::<u8>::from_str(hex.trim()).ok()?.into_format();
    Some(Srgba::new(rgb.red, rgb.green, rgb.blue, 1.0))
}

fn fallback_color(index: usize) -> Srgba<f64> {
    FALLBACK_COLORS
        .get(index % FALLBACK_COLORS.len())
        .and_then(|hex| parse_color(hex))
        .unwrap_or(Srgba::new(0.6, 0.6, 0.6, 1.0))
}

pub fn default_sectors() -> Vec<SectorConfig> {
    vec![
        SectorConfig::text("1", "Pizza", "#f87171"),
        SectorConfig::text("2", "Burger", "#fb923c"),
        SectorConfig::text("3", "Sushi", "#facc15"),
        SectorConfig::text("4", "Ramen", "#4ade80"),
        SectorConfig::text("5", "Curry", "#60a5fa"),
        SectorConfig::text("6", "Pasta", "#a78bfa"),
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_sectors")]
    pub sectors: Vec<SectorConfig>,
    #[serde(default)]
    pub spin: SpinTuning,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sectors: default_sectors(),
            spin: SpinTuning::default(),
        }
    }
}

impl Config {
    pub fn sectors(&self) -> Vec<Sector> {
        self.sectors
            .iter()
            .enumerate()
            .map(|(i, cfg)| cfg.to_sector(i))
            .collect()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid spin settings: {0}")]
    Tuning(#[from] TuningError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "fortuna", "fortuna").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Config, ConfigError> {
    let config: Config = builder.build()?.try_deserialize()?;
    config.spin.validate()?;
    Ok(config)
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    finish(
        config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(config::Environment::with_prefix("FORTUNA")),
    )
}

pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    finish(
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
    )
}

pub fn load_or_default() -> Config {
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
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", ConfigError::from(e));
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
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
