// SPDX-License-Identifier: GPL-3.0-only

//! User configuration handling
//!
//! The configuration is stored as JSON under the user's config directory
//! (`~/.config/photobooth/config.json` on Linux). A missing or unreadable
//! file falls back to defaults so a fresh install works without setup.

use crate::backends::camera::types::FacingMode;
use crate::constants::ResolutionPreset;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Default folder name for saving photos (under the user's Pictures directory)
const DEFAULT_SAVE_FOLDER: &str = "Photobooth";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera facing direction used when a session starts
    pub facing: FacingMode,
    /// Brightness value in [0, 1] applied to preview and capture
    pub brightness: f32,
    /// Resolution hint for stream negotiation
    pub resolution: ResolutionPreset,
    /// Display scale factor for the output raster (capped at 2.0 at use)
    pub output_scale: f32,
    /// Photo save folder (None = Pictures/Photobooth)
    pub save_folder: Option<PathBuf>,
    /// Path to the full-bleed frame overlay image
    pub frame_overlay: Option<PathBuf>,
    /// Path to the anchored logo overlay image
    pub logo_overlay: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            facing: FacingMode::default(), // Front (selfie) by default
            brightness: 0.5,               // Midpoint = unity gain
            resolution: ResolutionPreset::default(),
            output_scale: 1.0,
            save_folder: None,
            frame_overlay: None,
            logo_overlay: None,
        }
    }
}

impl Config {
    /// Path of the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photobooth")
            .join("config.json")
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable
    pub fn load() -> Self {
        let path = Self::config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read config file, using defaults");
                Self::default()
            }
        }
    }

    /// Persist the configuration to disk
    pub fn save(&self) -> AppResult<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("cannot create {}: {}", parent.display(), e)))?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, contents)
            .map_err(|e| AppError::Config(format!("cannot write {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Resolve the directory photos are saved to
    pub fn photo_dir(&self) -> PathBuf {
        self.save_folder
            .clone()
            .unwrap_or_else(default_photo_dir)
    }
}

/// Get default photo directory
pub fn default_photo_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.facing, FacingMode::Front, "Front camera should be the default");
        assert_eq!(config.brightness, 0.5);
        assert_eq!(config.output_scale, 1.0);
        assert!(config.save_folder.is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.facing = FacingMode::Back;
        config.brightness = 0.8;
        config.save_folder = Some(PathBuf::from("/tmp/booth"));

        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        // Older config files may not carry every field
        let parsed: Config = serde_json::from_str(r#"{ "brightness": 0.25 }"#).unwrap();
        assert_eq!(parsed.brightness, 0.25);
        assert_eq!(parsed.resolution, ResolutionPreset::Hd720);
    }
}
