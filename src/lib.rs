//! Hanabee - A fireworks chain-reaction arcade game
//!
//! Core modules:
//! - `sim`: Real-time simulation (targets, sparks, chains, combo, fever, rounds)
//! - `settings`: Behavior flags and particle tuning
//! - `hud`: Presentation helpers (formatting only, never feeds the sim)
//! - `web`: wasm-bindgen boundary for browser hosts

pub mod hud;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::Settings;
pub use sim::{GameEvent, GameState, RoundPhase, RoundResult, TickInput, tick};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the sim accepts (avoids spiral of death)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Round length in seconds
    pub const ROUND_DURATION: f32 = 60.0;
    /// Targets on screen right after `start()`
    pub const INITIAL_TARGETS: usize = 4;

    /// Target radius (fixed per target, never scales with combo)
    pub const TARGET_RADIUS: f32 = 24.0;
    /// Horizontal inset from the playfield edge for spawns
    pub const SPAWN_MARGIN: f32 = 12.0;
    /// Apex height as a fraction of playfield height (start → end of round)
    pub const APEX_START: f32 = 0.60;
    pub const APEX_END: f32 = 0.08;
    /// Deceleration in px/s² (start → end of round)
    pub const DECEL_START: f32 = 220.0;
    pub const DECEL_END: f32 = 100.0;
    /// Apparent speed multiplier (start → end of round)
    pub const SPEED_MULT_START: f32 = 1.0;
    pub const SPEED_MULT_END: f32 = 1.8;
    /// Top band (fraction of height) where targets start fading
    pub const FADE_BAND: f32 = 0.05;
    /// Alpha lost per second while fading
    pub const FADE_RATE: f32 = 0.9;
    /// How far past the top edge a target may travel before removal
    pub const EXIT_MARGIN: f32 = 20.0;

    /// Base spawn interval in seconds
    pub const BASE_SPAWN: f32 = 1.1;
    /// Live target bounds (start → end of round)
    pub const MIN_TARGETS_START: f32 = 5.0;
    pub const MIN_TARGETS_END: f32 = 18.0;
    pub const MAX_TARGETS_START: f32 = 10.0;
    pub const MAX_TARGETS_END: f32 = 28.0;
    /// Pause after a forced spawn below the minimum
    pub const FORCED_SPAWN_COOLDOWN: f32 = 0.2;
    /// Upper bound on the wait while below the minimum
    pub const FORCED_SPAWN_WAIT: f32 = 0.1;
    /// Re-check interval while at the maximum
    pub const FULL_RECHECK: f32 = 0.05;

    /// Seconds a combo survives without a hit
    pub const COMBO_WINDOW: f64 = 2.0;
    pub const MAX_COMBO: u32 = 16;
    pub const SCORE_PER_HIT: f32 = 100.0;
    /// Score multiplier at combo 1 and at MAX_COMBO
    pub const MULT_MIN: f32 = 1.0;
    pub const MULT_MAX: f32 = 2.5;

    /// Chain radius = CHAIN_RADIUS_MULT × combo scale × time scale × target radius
    pub const CHAIN_RADIUS_MULT: f32 = 3.0;
    pub const CHAIN_COMBO_SCALE_MAX: f32 = 1.4;
    pub const CHAIN_TIME_SCALE_MAX: f32 = 1.2;
    /// Delay before the secondary blast wave reaches neighbours
    pub const CHAIN_DELAY: f64 = 0.1;

    /// Seconds at MAX_COMBO needed to trigger fever
    pub const FEVER_REQUIRE: f64 = 10.0;
    /// Longest a fever can last
    pub const FEVER_DURATION: f64 = 10.0;
    /// Spawn cadence and target speed multiplier while fever is active
    pub const FEVER_MULT: f32 = 4.0;

    /// Hard cap on live sparks
    pub const MAX_SPARKS: usize = 2500;
    /// Particle velocities are in px per 1/60 s
    pub const FRAME_RATE_SCALE: f32 = 60.0;
    /// Per-step size decay
    pub const SPARK_SHRINK: f32 = 0.995;
    /// Firework scale at combo 1 and at MAX_COMBO
    pub const FIRE_SCALE_MIN: f32 = 0.5;
    pub const FIRE_SCALE_MAX: f32 = 2.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Round progress in [0, 1] (0 = just started, 1 = time up)
#[inline]
pub fn progress_t(remaining: f32) -> f32 {
    let t = 1.0 - remaining / consts::ROUND_DURATION;
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Combo position in [0, 1] (combo 0 and 1 both map to 0)
#[inline]
pub fn combo_t(combo: u32) -> f32 {
    let c = combo.clamp(1, consts::MAX_COMBO);
    (c - 1) as f32 / (consts::MAX_COMBO - 1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(progress_t(consts::ROUND_DURATION), 0.0);
        assert_eq!(progress_t(0.0), 1.0);
        assert_eq!(progress_t(-5.0), 1.0);
        assert_eq!(progress_t(consts::ROUND_DURATION * 2.0), 0.0);
        assert_eq!(progress_t(f32::NAN), 0.0);
    }

    #[test]
    fn test_combo_t_domain() {
        assert_eq!(combo_t(0), 0.0);
        assert_eq!(combo_t(1), 0.0);
        assert_eq!(combo_t(consts::MAX_COMBO), 1.0);
        assert_eq!(combo_t(consts::MAX_COMBO + 10), 1.0);
    }
}
