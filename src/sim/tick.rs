//! Per-frame simulation tick
//!
//! One call per animation frame. Order within a tick:
//! due blast waves → input → combo decay → fever → round clock → targets → sparks.

use glam::Vec2;

use super::state::{GameState, RoundPhase};
use super::target::StepContext;
use crate::consts::*;

/// Input gathered since the previous frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer/touch press in playfield coordinates
    pub pointer: Option<Vec2>,
    /// Fire key (aims at the playfield centre)
    pub key_action: bool,
}

/// Advance the game by one frame of `dt` seconds (clamped to [0, 0.05])
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };
    state.clock += dt as f64;
    let now = state.clock;
    state.apply_settings();

    state.fire_due_waves();

    if let Some(pos) = input.pointer {
        state.pointer_down(pos);
    }
    if input.key_action {
        state.key_action();
    }

    // Combo runs out with or without player action
    let round = &mut state.round;
    if round.combo.decay(now) {
        log::debug!("Combo expired");
    }
    if round.is_playing() {
        round.fever.observe_combo(round.combo.combo, now);
        let transition = round
            .fever
            .update(now, round.combo.combo, round.remaining);
        state.record_fever(transition);
    }

    if state.round.phase == RoundPhase::Playing {
        let round = &mut state.round;
        round.remaining = (round.remaining - dt).max(0.0);

        let ctx = StepContext {
            progress: round.progress(),
            speed_scale: state.settings.target_time_scale() * round.fever.speed_multiplier(),
            spawn_divisor: round.fever.spawn_divisor(),
        };
        let missed = round
            .field
            .step(&mut state.rng, &state.playfield, ctx, dt);
        state.record_misses(missed);

        if state.round.remaining <= 0.0 {
            state.end_round();
        }
    }

    // Sparks keep fading on every screen
    state.round.particles.step(dt);
}
