//! Player preferences
//!
//! Input tuning and display hints, persisted separately from high scores.
//! The simulation itself never reads these; hosts feed them into the input
//! adapter and the display layer.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Minimum travel (px) before a touch gesture counts as a swipe
    pub swipe_threshold_px: f32,
    /// Repeat interval for press-and-hold directional controls
    pub hold_repeat_ms: u64,
    /// Touch layouts fire continuously instead of per tap
    pub autofire: bool,
    /// Display hint: skip blast/shake effects
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            swipe_threshold_px: 30.0,
            hold_repeat_ms: 100,
            autofire: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Load from a JSON file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            log::info!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load, falling back to defaults on any error (a corrupt preferences
    /// file should never block play)
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("settings unreadable ({e}), using defaults");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_favor_desktop_play() {
        let settings = Settings::default();
        assert_eq!(settings.swipe_threshold_px, 30.0);
        assert_eq!(settings.hold_repeat_ms, 100);
        assert!(!settings.autofire);
    }

    #[test]
    fn round_trips_through_json() {
        let settings = Settings {
            swipe_threshold_px: 44.0,
            hold_repeat_ms: 80,
            autofire: true,
            reduced_motion: true,
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let loaded = Settings::load(Path::new("/definitely/not/here.json")).unwrap();
        assert_eq!(loaded, Settings::default());
    }
}
