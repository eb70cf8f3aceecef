//! Browser boundary
//!
//! Thin wasm-bindgen wrapper over `GameState`. The page owns the canvas,
//! the DOM and the animation-frame loop; it feeds `advance(dt)` and pointer
//! presses in, and reads plain numbers/arrays back out for drawing.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::hud::HudSnapshot;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, RoundPhase, TickInput, tick};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
}

#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    /// Set when a round ends, cleared on the next start
    final_result: Option<crate::sim::RoundResult>,
    /// Events since the host last called `drain_events_json`
    events: Vec<GameEvent>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let seed = js_sys::Date::now() as u64;
        let mut state = GameState::new(seed);
        state.resize(width, height);
        log::info!("Hanabee ready with seed {}", seed);
        WebGame {
            state,
            final_result: None,
            events: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(width, height);
    }

    /// Replace settings from JSON; returns false (and keeps the old ones) on error
    pub fn set_settings(&mut self, json: &str) -> bool {
        match Settings::from_json(json) {
            Ok(settings) => {
                self.state.settings = settings;
                true
            }
            Err(e) => {
                log::warn!("Ignoring settings: {}", e);
                false
            }
        }
    }

    /// Start or restart; returns the session token for async follow-ups
    pub fn start(&mut self) -> u64 {
        self.final_result = None;
        self.state.start();
        self.collect_events();
        self.state.generation()
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.state.is_current(token)
    }

    /// Input is applied as it arrives, between frames
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.state.pointer_down(Vec2::new(x, y));
        self.collect_events();
    }

    pub fn key_action(&mut self) {
        self.state.key_action();
        self.collect_events();
    }

    /// Advance one animation frame
    pub fn advance(&mut self, dt: f32) {
        tick(&mut self.state, &TickInput::default(), dt);
        self.collect_events();
    }

    /// Everything that happened since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> String {
        let events = std::mem::take(&mut self.events);
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::warn!("Dropping {} events: {}", events.len(), e);
            "[]".to_string()
        })
    }

    pub fn playing(&self) -> bool {
        self.state.phase() == RoundPhase::Playing
    }

    pub fn ended(&self) -> bool {
        self.state.phase() == RoundPhase::Ended
    }

    pub fn score(&self) -> f64 {
        self.state.score() as f64
    }

    pub fn combo(&self) -> u32 {
        self.state.combo()
    }

    pub fn max_combo(&self) -> u32 {
        self.state.max_combo()
    }

    pub fn remaining(&self) -> f32 {
        self.state.remaining()
    }

    pub fn fever(&self) -> bool {
        self.state.fever_active()
    }

    /// Final (score, max combo) once the round is over, as JSON
    pub fn result_json(&self) -> Option<String> {
        self.final_result
            .and_then(|r| serde_json::to_string(&r).ok())
    }

    /// HUD strings as JSON
    pub fn hud_json(&self) -> String {
        let hud = HudSnapshot::capture(&self.state, &self.state.settings);
        serde_json::to_string(&hud).unwrap_or_default()
    }

    /// Flat [x, y, radius, hue, alpha] per target
    pub fn targets(&self) -> Vec<f32> {
        self.state
            .targets()
            .iter()
            .flat_map(|t| [t.pos.x, t.pos.y, t.radius, t.hue, t.alpha.clamp(0.0, 1.0)])
            .collect()
    }

    /// Flat [x, y, size, hue, saturation, lightness, alpha] per spark
    pub fn particles(&self) -> Vec<f32> {
        self.state
            .particles()
            .iter()
            .flat_map(|p| [p.pos.x, p.pos.y, p.size, p.hue, p.saturation, p.lightness, p.alpha])
            .collect()
    }
}

impl WebGame {
    fn collect_events(&mut self) {
        for event in self.state.drain_events() {
            if let GameEvent::RoundEnded(result) = &event {
                self.final_result = Some(*result);
            }
            self.events.push(event);
        }
    }
}
