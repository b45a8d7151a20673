//! Physics tuning and feature toggles
//!
//! Persisted in LocalStorage on the web build; native builds may point
//! `LUNAR_LANDER_SETTINGS` at a JSON file.

use serde::{Deserialize, Serialize};

use crate::consts::MIN_X_STEP;

/// A boolean feature that can be flipped at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    Wind,
    ScreenShake,
    Stars,
    DebugMessages,
}

impl Feature {
    /// Label used in toggle notifications
    pub fn label(&self) -> &'static str {
        match self {
            Feature::Wind => "wind",
            Feature::ScreenShake => "screen-shake",
            Feature::Stars => "stars",
            Feature::DebugMessages => "debug messages",
        }
    }

    /// Features that zen mode switches off, in switch-off order
    pub const ZEN: [Feature; 3] = [Feature::Wind, Feature::DebugMessages, Feature::Stars];
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Ship handling ===
    /// Desired-facing change per tick while a turn key is held (radians)
    pub turn_speed: f32,
    /// Impulse applied along the facing per thrusting tick
    pub thrust: f32,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Fuel burnt per thrusting tick (tank is 0..1)
    pub fuel_used_per_tick: f32,
    /// Fuel pumped from pad to ship per landed tick
    pub refuel_per_tick: f32,

    // === Terrain ===
    /// Horizontal spacing of terrain points
    pub x_step: f32,
    /// Landing pad width, should be a multiple of `x_step`
    pub pad_width: f32,

    // === Toggles ===
    pub wind_enabled: bool,
    pub screen_shake_enabled: bool,
    pub stars_enabled: bool,
    pub debug_messages_enabled: bool,
    /// Zen mode hides most non-essential visuals
    ///
    /// Never read back from storage: a session always starts outside zen mode.
    #[serde(skip_deserializing)]
    pub zen_mode_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            turn_speed: 0.18,
            thrust: 0.15,
            gravity: 0.01,
            fuel_used_per_tick: 0.005,
            refuel_per_tick: 0.0035,

            x_step: 15.0,
            pad_width: 90.0,

            wind_enabled: true,
            screen_shake_enabled: true,
            stars_enabled: true,
            debug_messages_enabled: true,
            zen_mode_enabled: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; absent fields keep their defaults
    ///
    /// Terrain spacing and pad width that would break generation are
    /// replaced by their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.x_step >= MIN_X_STEP) {
            log::warn!("Ignoring x_step {}, using {}", self.x_step, defaults.x_step);
            self.x_step = defaults.x_step;
        }
        if !(self.pad_width > 0.0) {
            log::warn!("Ignoring pad_width {}, using {}", self.pad_width, defaults.pad_width);
            self.pad_width = defaults.pad_width;
        }
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Wind => self.wind_enabled,
            Feature::ScreenShake => self.screen_shake_enabled,
            Feature::Stars => self.stars_enabled,
            Feature::DebugMessages => self.debug_messages_enabled,
        }
    }

    pub fn set_enabled(&mut self, feature: Feature, enabled: bool) {
        let flag = match feature {
            Feature::Wind => &mut self.wind_enabled,
            Feature::ScreenShake => &mut self.screen_shake_enabled,
            Feature::Stars => &mut self.stars_enabled,
            Feature::DebugMessages => &mut self.debug_messages_enabled,
        };
        *flag = enabled;
    }

    /// Flip a feature, returning its new state
    pub fn toggle(&mut self, feature: Feature) -> bool {
        let enabled = !self.is_enabled(feature);
        self.set_enabled(feature, enabled);
        enabled
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "lunar_lander_settings";

    /// Environment variable naming a JSON settings file
    #[cfg(not(target_arch = "wasm32"))]
    const SETTINGS_ENV: &'static str = "LUNAR_LANDER_SETTINGS";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from the file named by `LUNAR_LANDER_SETTINGS`, if any
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::SETTINGS_ENV) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read settings {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"gravity": 0.02, "wind_enabled": false}"#).unwrap();
        assert_eq!(settings.gravity, 0.02);
        assert!(!settings.wind_enabled);
        assert_eq!(settings.thrust, Settings::default().thrust);
        assert_eq!(settings.x_step, 15.0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_json_round_trip_preserves_toggles() {
        let mut settings = Settings::default();
        settings.toggle(Feature::Stars);
        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_zen_mode_is_not_loaded() {
        let settings = Settings {
            zen_mode_enabled: true,
            ..Settings::default()
        };
        let json = settings.to_json().unwrap();
        assert!(json.contains("\"zen_mode_enabled\":true"));
        assert!(!Settings::from_json(&json).unwrap().zen_mode_enabled);
    }

    #[test]
    fn test_unusable_terrain_spacing_falls_back() {
        let settings = Settings::from_json(r#"{"x_step": 0.0, "pad_width": -5.0}"#).unwrap();
        assert_eq!(settings.x_step, 15.0);
        assert_eq!(settings.pad_width, 90.0);
        let settings = Settings::from_json(r#"{"x_step": -3.0}"#).unwrap();
        assert_eq!(settings.x_step, 15.0);
        let settings = Settings::from_json(r#"{"x_step": 20.0}"#).unwrap();
        assert_eq!(settings.x_step, 20.0);
    }

    #[test]
    fn test_toggle_flips_and_reports() {
        let mut settings = Settings::default();
        assert!(!settings.toggle(Feature::Wind));
        assert!(!settings.wind_enabled);
        assert!(settings.toggle(Feature::Wind));
        assert!(settings.is_enabled(Feature::Wind));
    }
}
