//! HUD readouts
//!
//! Formatting only. Nothing here feeds back into the simulation.

use serde::Serialize;

use crate::consts::MAX_COMBO;
use crate::settings::Settings;
use crate::sim::GameState;

/// Zero-padded non-negative integer
pub fn zpad(n: f64, width: usize) -> String {
    let n = if n.is_finite() { n.max(0.0).floor() as u64 } else { 0 };
    format!("{:0width$}", n, width = width)
}

/// Text and styling for one HUD frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub time: String,
    pub score: String,
    pub combo: String,
    /// "FEVER" while fever is active, "COMBO" otherwise
    pub combo_label: &'static str,
    /// Combo readout drawn in the max-combo colour
    pub combo_highlight: bool,
    pub fever: bool,
    /// Combo window gauge fill in [0, 1]
    pub gauge: f32,
}

impl HudSnapshot {
    pub fn capture(state: &GameState, settings: &Settings) -> Self {
        let remaining = state.remaining();
        let combo = state.combo().min(MAX_COMBO);
        let fever = state.fever_active();

        let (time, score, combo_text) = if settings.zero_pad_hud {
            (
                zpad(remaining.ceil() as f64, 3),
                zpad(state.score() as f64, 8),
                zpad(combo as f64, 2),
            )
        } else {
            (
                format!("{:.1}", remaining),
                state.score().to_string(),
                combo.to_string(),
            )
        };

        Self {
            time,
            score,
            combo: combo_text,
            combo_label: if fever { "FEVER" } else { "COMBO" },
            combo_highlight: settings.combo_highlight && combo >= MAX_COMBO,
            fever,
            gauge: state.combo_window_ratio(),
        }
    }
}
