//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{OxboardError, OxboardResult};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default engine tuning.
    pub engine: EngineDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Landmark smoothing pipeline selected by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingPreset {
    /// Per-landmark Kalman filtering only.
    #[default]
    Kalman,
    /// Outlier rejection, prediction and adaptive smoothing before the Kalman pass.
    Advanced,
    /// Raw landmarks.
    None,
}

/// Default engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineDefaults {
    /// Expected landmark frame rate.
    pub target_fps: u32,

    /// Per-frame processing budget in milliseconds.
    pub max_processing_time_ms: f64,

    /// Landmark smoothing pipeline.
    pub smoothing: SmoothingPreset,

    /// Screen width used for distance normalization.
    pub screen_width: u32,

    /// Screen height used for distance normalization.
    pub screen_height: u32,

    /// Minimum confidence for a gesture to reach the mapping registry.
    pub min_confidence: f64,

    /// Whether the governor may skip frames under load.
    pub frame_skipping: bool,

    /// Maximum number of cached classification results.
    pub cache_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "oxboard_gesture_core=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_processing_time_ms: 10.0,
            smoothing: SmoothingPreset::Kalman,
            screen_width: 1920,
            screen_height: 1080,
            min_confidence: 0.6,
            frame_skipping: true,
            cache_capacity: 64,
        }
    }
}

impl EngineDefaults {
    /// Nominal interval between frames in milliseconds.
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps.max(1) as f64
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> OxboardResult<Self> {
        if !path.exists() {
            return Err(OxboardError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to an explicit file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> OxboardResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> OxboardResult<()> {
        let engine = &self.engine;
        if engine.target_fps == 0 {
            return Err(OxboardError::config("target_fps must be positive"));
        }
        if !(engine.max_processing_time_ms > 0.0) {
            return Err(OxboardError::config(
                "max_processing_time_ms must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&engine.min_confidence) {
            return Err(OxboardError::config("min_confidence must be in [0, 1]"));
        }
        if engine.screen_width == 0 || engine.screen_height == 0 {
            return Err(OxboardError::config("screen size must be non-zero"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("oxboard").join("gestures.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sixty_hz_budget() {
        let config = AppConfig::default();
        assert_eq!(config.engine.target_fps, 60);
        assert!((config.engine.frame_interval_ms() - 16.666).abs() < 0.01);
        assert_eq!(config.engine.max_processing_time_ms, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gestures.json");

        let mut config = AppConfig::default();
        config.engine.smoothing = SmoothingPreset::Advanced;
        config.logging.json = true;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gestures.json");
        std::fs::write(&path, r#"{"engine":{"target_fps":30}}"#).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.engine.target_fps, 30);
        assert_eq!(loaded.engine.screen_width, 1920);
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gestures.json");
        std::fs::write(&path, r#"{"engine":{"min_confidence":1.5}}"#).unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, OxboardError::Config { .. }));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = AppConfig::load_from(Path::new("/nonexistent/oxboard.json")).unwrap_err();
        assert!(matches!(err, OxboardError::FileNotFound { .. }));
    }
}
