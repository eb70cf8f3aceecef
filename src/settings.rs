//! Game settings and behavior flags
//!
//! Read by the sim every frame; the host may flip flags between ticks.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === HUD (presentation only) ===
    /// Zero-padded time/score/combo readouts
    pub zero_pad_hud: bool,
    /// Highlight the combo readout at max combo
    pub combo_highlight: bool,

    // === Behavior ===
    /// Neighbours detonate a moment after the hit instead of immediately
    pub chain_delay: bool,
    /// Targets move at reduced speed
    pub slow_targets: bool,
    /// Divisor applied to target dt when `slow_targets` is on
    pub slow_motion_factor: f32,

    // === Fireworks ===
    /// Sparks per burst
    pub burst_count: usize,
    /// Peak spark speed (px per 1/60 s)
    pub burst_power: f32,
    /// Downward spark acceleration (px per (1/60 s)²)
    pub gravity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // HUD
            zero_pad_hud: true,
            combo_highlight: true,

            // Behavior - all flags on by default
            chain_delay: true,
            slow_targets: true,
            slow_motion_factor: 3.0,

            // Fireworks
            burst_count: 120,
            burst_power: 9.0,
            gravity: 0.12,
        }
    }
}

impl Settings {
    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Clamp tuning values into ranges the sim can use
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.slow_motion_factor.is_finite() || self.slow_motion_factor < 1.0 {
            self.slow_motion_factor = defaults.slow_motion_factor;
        }
        if !self.burst_power.is_finite() || self.burst_power <= 0.0 {
            self.burst_power = defaults.burst_power;
        }
        if !self.gravity.is_finite() {
            self.gravity = defaults.gravity;
        }
        self.burst_count = self.burst_count.min(crate::consts::MAX_SPARKS);
        self
    }

    /// Effective target dt scale from the slow-motion flag
    pub fn target_time_scale(&self) -> f32 {
        if self.slow_targets {
            1.0 / self.slow_motion_factor.max(1.0)
        } else {
            1.0
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Invalid settings in {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to a JSON file
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_all_flags_on() {
        let s = Settings::default();
        assert!(s.zero_pad_hud && s.combo_highlight && s.chain_delay && s.slow_targets);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{ "chain_delay": false }"#).unwrap();
        assert!(!s.chain_delay);
        assert!(s.slow_targets);
        assert_eq!(s.burst_count, 120);
    }

    #[test]
    fn test_sanitize_rejects_bad_tuning() {
        let s = Settings::from_json(r#"{ "slow_motion_factor": 0.0, "burst_power": -1.0 }"#).unwrap();
        assert_eq!(s.slow_motion_factor, 3.0);
        assert_eq!(s.burst_power, 9.0);
    }

    #[test]
    fn test_target_time_scale() {
        let mut s = Settings::default();
        assert!((s.target_time_scale() - 1.0 / 3.0).abs() < 1e-6);
        s.slow_targets = false;
        assert_eq!(s.target_time_scale(), 1.0);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let s = Settings::load_from(Path::new("/nonexistent/hanabee-settings.json"));
        assert_eq!(s, Settings::default());
    }
}
