//! Game state and round lifecycle
//!
//! `GameState` is the session: clock, RNG, settings, playfield and the
//! generation counter. Everything that belongs to one round lives in
//! `Round`, which `start()` replaces wholesale.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::chain::{self, ChainContext, ChainOutcome, DelayedWave};
use super::combo::ComboState;
use super::fever::{FeverState, FeverTransition};
use super::particles::ParticleSystem;
use super::target::{Playfield, Target, TargetField, TargetId};
use crate::consts::*;
use crate::progress_t;
use crate::settings::Settings;

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Title screen, nothing spawns
    #[default]
    NotStarted,
    /// Clock running
    Playing,
    /// Time up; only `start()` leaves this
    Ended,
}

/// Final numbers handed to leaderboards and score submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub score: u64,
    pub max_combo: u32,
    /// Session token of the round that produced this result
    pub generation: u64,
}

/// Notifications for audio/UI hosts, drained with `GameState::drain_events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { generation: u64 },
    TargetDetonated { id: TargetId, pos: Vec2, hue: f32, points: u64 },
    ChainResolved { targets: usize, points: u64 },
    TargetMissed { id: TargetId },
    FeverStarted,
    FeverEnded,
    RoundEnded(RoundResult),
}

/// Everything owned by a single round
#[derive(Debug, Clone)]
pub struct Round {
    pub phase: RoundPhase,
    /// Seconds left, never negative
    pub remaining: f32,
    pub field: TargetField,
    pub particles: ParticleSystem,
    pub combo: ComboState,
    pub fever: FeverState,
    /// Pending secondary blast waves
    pub waves: Vec<DelayedWave>,
    pub generation: u64,
}

impl Round {
    pub fn new(generation: u64) -> Self {
        Self {
            phase: RoundPhase::NotStarted,
            remaining: ROUND_DURATION,
            field: TargetField::new(),
            particles: ParticleSystem::default(),
            combo: ComboState::new(),
            fever: FeverState::new(),
            waves: Vec::new(),
            generation,
        }
    }

    /// 0 at round start, 1 when time is up
    pub fn progress(&self) -> f32 {
        progress_t(self.remaining)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == RoundPhase::Playing
    }
}

/// Complete game session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// Read every frame; hosts may change it between ticks
    pub settings: Settings,
    pub playfield: Playfield,
    pub round: Round,
    /// Seconds since the session began
    pub(crate) clock: f64,
    generation: u64,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session on the title screen
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, Settings::default())
    }

    pub fn with_settings(seed: u64, settings: Settings) -> Self {
        let mut state = Self {
            seed,
            settings: settings.sanitized(),
            playfield: Playfield::default(),
            round: Round::new(0),
            clock: 0.0,
            generation: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        state.apply_settings();
        state
    }

    /// Session clock in seconds
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Token that changes on every `start()`
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether async work tagged with `token` still belongs to this round
    pub fn is_current(&self, token: u64) -> bool {
        token == self.generation
    }

    /// Begin a fresh round (also used for restart, from any phase)
    pub fn start(&mut self) {
        self.generation += 1;
        self.round = Round::new(self.generation);
        self.apply_settings();

        for _ in 0..INITIAL_TARGETS {
            self.round.field.spawn(&mut self.rng, &self.playfield, 0.0);
        }
        self.round.phase = RoundPhase::Playing;
        self.events.push(GameEvent::RoundStarted {
            generation: self.generation,
        });
        log::info!("Round {} started", self.generation);
    }

    /// Alias for `start()`
    pub fn restart(&mut self) {
        self.start();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.playfield = Playfield {
            width: width.max(0.0),
            height: height.max(0.0),
        };
    }

    /// Push the current settings into the particle system
    pub(crate) fn apply_settings(&mut self) {
        self.round.particles.power = self.settings.burst_power;
        self.round.particles.gravity = self.settings.gravity;
    }

    pub(crate) fn chain_context(&self) -> ChainContext {
        ChainContext {
            now: self.clock,
            progress: self.round.progress(),
            burst_count: self.settings.burst_count,
        }
    }

    /// Pointer press at `pos` in playfield coordinates
    pub fn pointer_down(&mut self, pos: Vec2) {
        self.apply_settings();
        if !self.round.is_playing() {
            // Title and result screens still light fireworks
            let hue = self.rng.random_range(0.0..360.0);
            self.round
                .particles
                .emit(&mut self.rng, pos, self.settings.burst_count, hue, 1.0);
            return;
        }

        // Misses cost nothing
        let Some(id) = chain::hit_test(self.round.field.targets(), pos) else {
            return;
        };
        let ctx = self.chain_context();
        let outcome = chain::detonate(
            &mut self.round,
            &mut self.rng,
            ctx,
            id,
            self.settings.chain_delay,
        );
        self.record(outcome);
    }

    /// Keyboard fire: aims at the playfield centre
    pub fn key_action(&mut self) {
        self.pointer_down(self.playfield.center());
    }

    /// Apply secondary waves whose delay has elapsed
    pub(crate) fn fire_due_waves(&mut self) {
        if !self.round.is_playing() {
            self.round.waves.clear();
            return;
        }
        let ctx = self.chain_context();
        let outcome = chain::fire_due_waves(&mut self.round, &mut self.rng, ctx);
        self.record(outcome);
    }

    pub(crate) fn record(&mut self, outcome: ChainOutcome) {
        self.record_fever(outcome.fever);
        if outcome.is_empty() {
            return;
        }
        let points = outcome.points();
        let targets = outcome.len();
        for d in outcome.detonations {
            self.events.push(GameEvent::TargetDetonated {
                id: d.id,
                pos: d.pos,
                hue: d.hue,
                points: d.points,
            });
        }
        self.events.push(GameEvent::ChainResolved { targets, points });
    }

    pub(crate) fn record_fever(&mut self, transition: Option<FeverTransition>) {
        match transition {
            Some(FeverTransition::Started) => {
                log::info!("Fever! (round {})", self.generation);
                self.events.push(GameEvent::FeverStarted);
            }
            Some(FeverTransition::Ended) => {
                log::info!("Fever over (round {})", self.generation);
                self.events.push(GameEvent::FeverEnded);
            }
            None => {}
        }
    }

    pub(crate) fn record_misses(&mut self, missed: Vec<TargetId>) {
        self.events
            .extend(missed.into_iter().map(|id| GameEvent::TargetMissed { id }));
    }

    /// Time up: freeze the round and publish its result
    pub(crate) fn end_round(&mut self) {
        if self.round.phase != RoundPhase::Playing {
            return;
        }
        let round = &mut self.round;
        round.phase = RoundPhase::Ended;
        round.remaining = 0.0;
        round.combo.max_combo = round.combo.max_combo.max(round.combo.combo);
        round.waves.clear();
        let fever = round.fever.end();
        self.record_fever(fever);

        let result = RoundResult {
            score: self.round.combo.score,
            max_combo: self.round.combo.max_combo,
            generation: self.generation,
        };
        log::info!(
            "Round {} over: score {} (max combo {})",
            result.generation,
            result.score,
            result.max_combo
        );
        self.events.push(GameEvent::RoundEnded(result));
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Queries for the presentation layer ===

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    pub fn targets(&self) -> &[Target] {
        self.round.field.targets()
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.round.particles
    }

    pub fn score(&self) -> u64 {
        self.round.combo.score
    }

    pub fn combo(&self) -> u32 {
        self.round.combo.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.round.combo.max_combo
    }

    pub fn remaining(&self) -> f32 {
        self.round.remaining
    }

    pub fn fever_active(&self) -> bool {
        self.round.fever.is_active()
    }

    /// Combo gauge fill in [0, 1]
    pub fn combo_window_ratio(&self) -> f32 {
        self.round.combo.window_ratio(self.clock)
    }

    /// Final numbers once the round has ended
    pub fn result(&self) -> Option<RoundResult> {
        (self.round.phase == RoundPhase::Ended).then(|| RoundResult {
            score: self.round.combo.score,
            max_combo: self.round.combo.max_combo,
            generation: self.generation,
        })
    }
}
