//! Score and combo bookkeeping
//!
//! Each hit bumps the combo (capped at `MAX_COMBO`) and scores
//! `SCORE_PER_HIT × multiplier(combo)`. A combo dies on its own once
//! `COMBO_WINDOW` seconds pass without a hit.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{combo_t, lerp};

/// Score multiplier: 1.0 at combo 1 rising linearly to 2.5 at `MAX_COMBO`
pub fn score_multiplier(combo: u32) -> f32 {
    lerp(MULT_MIN, MULT_MAX, combo_t(combo))
}

/// Points for a hit that lands at `combo`
pub fn points_for(combo: u32) -> u64 {
    (SCORE_PER_HIT * score_multiplier(combo)).round() as u64
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub score: u64,
    /// Always within 0..=MAX_COMBO
    pub combo: u32,
    pub max_combo: u32,
    /// `None` once the window has lapsed
    pub last_hit_at: Option<f64>,
}

impl ComboState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one detonation at time `now`, returning the points awarded
    pub fn register_hit(&mut self, now: f64) -> u64 {
        let next = (self.combo + 1).min(MAX_COMBO);
        let points = points_for(next);
        self.score += points;
        self.combo = next;
        self.last_hit_at = Some(now);
        self.max_combo = self.max_combo.max(next);
        points
    }

    /// Drop the combo once the window has lapsed. Returns true if it reset.
    pub fn decay(&mut self, now: f64) -> bool {
        match self.last_hit_at {
            Some(at) if self.combo > 0 && now - at > COMBO_WINDOW => {
                self.combo = 0;
                self.last_hit_at = None;
                true
            }
            _ => false,
        }
    }

    /// Fraction of the combo window still open, for the HUD gauge
    pub fn window_ratio(&self, now: f64) -> f32 {
        match self.last_hit_at {
            Some(at) => ((COMBO_WINDOW - (now - at)).max(0.0) / COMBO_WINDOW).min(1.0) as f32,
            None => 0.0,
        }
    }

    pub fn at_max(&self) -> bool {
        self.combo >= MAX_COMBO
    }
}
