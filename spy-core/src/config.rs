//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! Loads and saves settings as TOML from the platform config directory using
//! the [`directories`](https://docs.rs/directories) crate. A missing file is
//! created with defaults on first start.
//!
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::audio::AudioFormat;

/// Color palette selector. Only the renderer looks at this.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Mocha,

    Light,

    Mono,
}

/// Batch runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Capacity of the bounded progress channel
    pub channel_capacity: usize,

    /// Formats offered as "Convert to ..." actions
    pub convert_targets: Vec<AudioFormat>,

    /// Bitrate in kbps for lossy targets
    pub default_quality: u32,

    /// Remove the source file after a successful conversion
    pub delete_original: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            convert_targets: vec![AudioFormat::Mp3, AudioFormat::Flac, AudioFormat::Wav],
            default_quality: 192,
            delete_original: false,
        }
    }
}

/// Audio collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub ffmpeg_path: PathBuf,

    pub ffprobe_path: PathBuf,

    /// Collect audio files from subdirectories too when a directory is the target
    pub recursive: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            recursive: false,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,

    pub file_prefix: String,

    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            file_prefix: "spy".to_string(),
            level: "info".to_string(),
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,

    pub show_hidden: bool,

    /// Ask for `y` before Delete runs
    pub confirm_delete: bool,

    /// Redraw interval for progress and notification expiry
    #[serde(with = "humantime_serde")]
    pub tick_rate: Duration,

    #[serde(with = "humantime_serde")]
    pub notification_ttl: Duration,

    pub batch: BatchConfig,

    pub audio: AudioConfig,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::Mocha,
            show_hidden: false,
            confirm_delete: false,
            tick_rate: Duration::from_millis(250),
            notification_ttl: Duration::from_secs(4),
            batch: BatchConfig::default(),
            audio: AudioConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Loads config from the TOML file in the app config dir, or returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/spy/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(&path).await?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Saves config to the TOML file in the app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;

        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "spy", "spy")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            confirm_delete = true
            tick_rate = "100ms"

            [batch]
            default_quality = 320
            "#,
        )
        .unwrap();

        assert!(cfg.confirm_delete);
        assert_eq!(cfg.tick_rate, Duration::from_millis(100));
        assert_eq!(cfg.batch.default_quality, 320);
        assert_eq!(cfg.batch.channel_capacity, 64);
        assert_eq!(cfg.audio.ffmpeg_path, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.batch.convert_targets, BatchConfig::default().convert_targets);
        assert_eq!(back.theme, Theme::Mocha);
    }
}
