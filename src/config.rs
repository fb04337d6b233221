use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::error::{ConfigError, Result};
use crate::game::{GameConfig, Preset, RoundSchedule, Timings};
use crate::palette::{default_palette, Color};

/// User-editable game settings, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub total_rounds: usize,
    pub pattern_lengths: RoundSchedule<usize>,
    pub time_limits_ms: RoundSchedule<u64>,
    pub min_wins: usize,
    pub success_code: String,
    pub failure_code: String,
    pub palette: Vec<Color>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_preset(Preset::Escalating)
    }
}

impl Config {
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            total_rounds: 5,
            pattern_lengths: preset.pattern_lengths(),
            time_limits_ms: preset.time_limits_ms(),
            min_wins: 3,
            success_code: "1520".to_string(),
            failure_code: "2202".to_string(),
            palette: default_palette(),
        }
    }

    /// Switch to a preset's round policy, keeping codes and palette.
    pub fn with_preset(self, preset: Preset) -> Self {
        Self {
            pattern_lengths: preset.pattern_lengths(),
            time_limits_ms: preset.time_limits_ms(),
            ..self
        }
    }

    pub fn to_game_config(&self) -> Result<GameConfig> {
        GameConfig::try_from(self)
    }
}

impl TryFrom<&Config> for GameConfig {
    type Error = ConfigError;

    fn try_from(cfg: &Config) -> Result<Self> {
        GameConfig::new(
            cfg.total_rounds,
            cfg.pattern_lengths.clone(),
            cfg.time_limits_ms.map(|ms| Duration::from_millis(*ms)),
            cfg.min_wins,
            cfg.success_code.clone(),
            cfg.failure_code.clone(),
            cfg.palette.clone(),
            Timings::default(),
        )
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("colorlock_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(path = %self.path.display(), "ignoring unreadable config: {e}"),
            },
            Err(e) => tracing::debug!(path = %self.path.display(), "no config file: {e}"),
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        write_json(&self.path, cfg)
    }
}

/// Serialize before touching the file so a failure leaves the old one intact.
fn write_json<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let data = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)
}
