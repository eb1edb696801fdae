use std::path::{Path, PathBuf};

use egui::Pos2;
use serde::{Deserialize, Serialize};

use lanewatch::{LanewatchError, SceneConfig};

use super::{HISTORY_POINTS, POLL_INTERVAL_MS};

const CONFIG_DIR_NAME: &str = "lanewatch";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct WindowPosition {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Default for WindowPosition {
    fn default() -> Self {
        Self { x: 0., y: 0. }
    }
}

impl From<WindowPosition> for Pos2 {
    fn from(value: WindowPosition) -> Self {
        Pos2::new(value.x, value.y)
    }
}

impl From<Pos2> for WindowPosition {
    fn from(value: Pos2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) base_url: String,
    pub(crate) poll_interval_ms: u64,
    pub(crate) request_timeout_ms: u64,
    pub(crate) alert_sound_url: String,
    pub(crate) alert_duration_ms: u64,
    pub(crate) history_points: usize,
    pub(crate) window_position: WindowPosition,
    pub(crate) scene: SceneConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: POLL_INTERVAL_MS,
            request_timeout_ms: 5000,
            alert_sound_url: "https://actions.google.com/sounds/v1/alarms/alarm_clock.ogg"
                .to_string(),
            alert_duration_ms: 1500,
            history_points: HISTORY_POINTS,
            window_position: WindowPosition::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl AppConfig {
    fn default_path() -> Result<PathBuf, LanewatchError> {
        Ok(dirs::config_dir()
            .ok_or(LanewatchError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Loads the user's config file, `Ok(None)` if there is none yet.
    pub(crate) fn from_local_file() -> Result<Option<Self>, LanewatchError> {
        Self::load_from(&Self::default_path()?)
    }

    pub(crate) fn load_from(config_path: &Path) -> Result<Option<Self>, LanewatchError> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)
            .map_err(|e| LanewatchError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| LanewatchError::ConfigParseError { source: e })
    }

    pub(crate) fn save(&self) -> Result<(), LanewatchError> {
        self.save_to(&Self::default_path()?)
    }

    pub(crate) fn save_to(&self, config_path: &Path) -> Result<(), LanewatchError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| LanewatchError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| LanewatchError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| LanewatchError::ConfigSerializeError { source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            base_url: "http://sim.local:8080".to_string(),
            window_position: WindowPosition { x: 12., y: 34. },
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"poll_interval_ms": 250}"#).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.poll_interval_ms, 250);
        assert_eq!(loaded.base_url, AppConfig::default().base_url);
        assert_eq!(loaded.scene, SceneConfig::default());
    }

    #[test]
    fn test_garbage_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, LanewatchError::ConfigParseError { .. }));
    }
}
