//! Rising firework targets
//!
//! Targets launch from the bottom edge with exactly the speed needed to
//! decelerate to zero at a progress-dependent apex, then fade out near the
//! top. The field also owns the spawn controller that keeps the live
//! population between progress-dependent bounds.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::lerp;

/// Stable handle for a target, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Playfield size in px (y grows downward, 0 = top edge)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 720.0,
        }
    }
}

impl Playfield {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A firework target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub pos: Vec2,
    pub radius: f32,
    pub hue: f32,
    /// Vertical velocity (negative = rising)
    pub vy: f32,
    /// Vertical acceleration (positive, decelerates the climb)
    pub ay: f32,
    pub alpha: f32,
}

impl Target {
    /// Constant-acceleration step
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.vy += self.ay * dt;
        self.pos.y += self.vy * dt;
    }
}

/// Apex height for a given progress
pub fn apex_y(field: &Playfield, progress: f32) -> f32 {
    field.height * lerp(APEX_START, APEX_END, progress)
}

/// Deceleration for a given progress
pub fn decel(progress: f32) -> f32 {
    lerp(DECEL_START, DECEL_END, progress)
}

/// Launch speed that stops exactly `s` px higher: v0 = -sqrt(2as)
pub fn launch_velocity(decel: f32, s: f32) -> f32 {
    -(2.0 * decel * s.max(0.0)).max(0.0001).sqrt()
}

/// Per-frame inputs for the field
#[derive(Debug, Clone, Copy)]
pub struct StepContext {
    pub progress: f32,
    /// Product of slow-motion and fever multipliers
    pub speed_scale: f32,
    /// Divisor applied to the spawn interval (fever)
    pub spawn_divisor: f32,
}

/// Owns the live targets and the spawn cadence
#[derive(Debug, Clone, Default)]
pub struct TargetField {
    /// Sorted by id (ids are allocated monotonically and only appended)
    targets: Vec<Target>,
    spawn_timer: f32,
    next_id: u32,
}

impl TargetField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.index_of(id).map(|i| &self.targets[i])
    }

    pub fn contains(&self, id: TargetId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn remove(&mut self, id: TargetId) -> Option<Target> {
        self.index_of(id).map(|i| self.targets.remove(i))
    }

    fn index_of(&self, id: TargetId) -> Option<usize> {
        self.targets.binary_search_by_key(&id, |t| t.id).ok()
    }

    /// Place a target directly (hosts and tests)
    pub fn insert(&mut self, pos: Vec2, radius: f32, hue: f32, vy: f32, ay: f32) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.push(Target {
            id,
            pos,
            radius,
            hue,
            vy,
            ay,
            alpha: 1.0,
        });
        id
    }

    /// Launch one target from the bottom edge
    pub fn spawn(&mut self, rng: &mut impl Rng, field: &Playfield, progress: f32) -> TargetId {
        let r = TARGET_RADIUS;
        let y = field.height - r;
        let lo = r + SPAWN_MARGIN;
        let hi = field.width - r - SPAWN_MARGIN;
        let x = if hi > lo { rng.random_range(lo..hi) } else { lo };
        let hue = rng.random_range(0.0..360.0);

        let ay = decel(progress);
        let s = y - apex_y(field, progress);
        self.insert(Vec2::new(x, y), r, hue, launch_velocity(ay, s), ay)
    }

    /// Move, fade and despawn targets, then run the spawn controller.
    ///
    /// Returns the ids of targets lost without being detonated.
    pub fn step(
        &mut self,
        rng: &mut impl Rng,
        field: &Playfield,
        ctx: StepContext,
        dt: f32,
    ) -> Vec<TargetId> {
        let speed_mult = lerp(SPEED_MULT_START, SPEED_MULT_END, ctx.progress);
        let sdt = dt * ctx.speed_scale * speed_mult;
        let fade_band = field.height * FADE_BAND;

        let mut missed = Vec::new();
        self.targets.retain_mut(|t| {
            t.integrate(sdt);

            // Fade runs on real time, not on the scaled dt
            if t.vy >= 0.0 || t.pos.y < fade_band {
                t.alpha -= dt * FADE_RATE;
                if t.alpha <= 0.0 {
                    missed.push(t.id);
                    return false;
                }
            }
            if t.pos.y + t.radius < -EXIT_MARGIN {
                missed.push(t.id);
                return false;
            }
            true
        });

        self.run_spawner(rng, field, ctx, dt);
        missed
    }

    fn run_spawner(&mut self, rng: &mut impl Rng, field: &Playfield, ctx: StepContext, dt: f32) {
        let p = ctx.progress;
        let every = lerp(BASE_SPAWN * 4.0, BASE_SPAWN / 8.0, p) / ctx.spawn_divisor.max(1.0);
        let min = lerp(MIN_TARGETS_START, MIN_TARGETS_END, p).round() as usize;
        let max = lerp(MAX_TARGETS_START, MAX_TARGETS_END, p).round() as usize;

        self.spawn_timer -= dt;
        if self.targets.len() < min {
            // At most one forced spawn per frame, then a short breather
            if self.spawn_timer <= 0.0 {
                let id = self.spawn(rng, field, p);
                log::trace!("Forced spawn {:?} ({} < {})", id, self.targets.len(), min);
                self.spawn_timer = FORCED_SPAWN_COOLDOWN.min(every);
            } else {
                self.spawn_timer = self.spawn_timer.min(FORCED_SPAWN_WAIT);
            }
        } else if self.spawn_timer <= 0.0 {
            if self.targets.len() < max {
                self.spawn(rng, field, p);
                self.spawn_timer = every;
            } else {
                self.spawn_timer = FULL_RECHECK;
            }
        }
    }
}
