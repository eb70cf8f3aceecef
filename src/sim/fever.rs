//! Fever mode
//!
//! Holding max combo for `FEVER_REQUIRE` seconds triggers a one-shot fever
//! that speeds up spawning and target motion. It ends when the combo drops
//! to zero, after `FEVER_DURATION`, or when the round clock runs out, and it
//! cannot be re-entered in the same round.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum FeverPhase {
    #[default]
    Idle,
    Active {
        since: f64,
    },
}

/// Edge reported by `FeverState::update`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeverTransition {
    Started,
    Ended,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeverState {
    pub phase: FeverPhase,
    /// Set once fever has fired this round
    pub triggered: bool,
    /// When the combo last reached max (cleared as soon as it drops)
    pub max_combo_since: Option<f64>,
}

impl FeverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, FeverPhase::Active { .. })
    }

    /// Track how long the combo has been pinned at max
    pub fn observe_combo(&mut self, combo: u32, now: f64) {
        if combo >= MAX_COMBO {
            self.max_combo_since.get_or_insert(now);
        } else {
            self.max_combo_since = None;
        }
    }

    /// Check trigger and termination conditions.
    ///
    /// A trigger that would end in the same call (time already up) is
    /// consumed without reporting either edge.
    pub fn update(&mut self, now: f64, combo: u32, remaining: f32) -> Option<FeverTransition> {
        let mut started = false;
        if !self.triggered
            && self
                .max_combo_since
                .is_some_and(|since| now - since >= FEVER_REQUIRE)
        {
            self.phase = FeverPhase::Active { since: now };
            self.triggered = true;
            started = true;
        }

        if let FeverPhase::Active { since } = self.phase
            && (combo == 0 || now - since >= FEVER_DURATION || remaining <= 0.0)
        {
            self.phase = FeverPhase::Idle;
            return (!started).then_some(FeverTransition::Ended);
        }
        started.then_some(FeverTransition::Started)
    }

    /// Force fever off and stop timing the max-combo hold
    pub fn end(&mut self) -> Option<FeverTransition> {
        self.max_combo_since = None;
        if self.is_active() {
            self.phase = FeverPhase::Idle;
            Some(FeverTransition::Ended)
        } else {
            None
        }
    }

    /// Target speed multiplier
    pub fn speed_multiplier(&self) -> f32 {
        if self.is_active() { FEVER_MULT } else { 1.0 }
    }

    /// Spawn cadence divisor
    pub fn spawn_divisor(&self) -> f32 {
        self.speed_multiplier()
    }
}
