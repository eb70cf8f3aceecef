//! Firework sparks
//!
//! Purely kinematic and time-bounded: no knowledge of targets or scoring.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{FRAME_RATE_SCALE, MAX_SPARKS, SPARK_SHRINK};

/// A single spark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Velocity in px per 1/60 s
    pub vel: Vec2,
    pub accel: Vec2,
    pub age: f32,
    pub life: f32,
    pub size: f32,
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub alpha: f32,
}

/// Bounded spark pool, oldest evicted first
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: VecDeque<Particle>,
    capacity: usize,
    /// Peak launch speed before scaling
    pub power: f32,
    /// Downward acceleration applied to new sparks
    pub gravity: f32,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(MAX_SPARKS)
    }
}

impl ParticleSystem {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: VecDeque::new(),
            capacity,
            power: 9.0,
            gravity: 0.12,
        }
    }

    /// Emit `count` sparks radially from `pos`.
    ///
    /// Speed is uniform in `[0.6, 1.0] × power × scale`; spark size scales too.
    pub fn emit(&mut self, rng: &mut impl Rng, pos: Vec2, count: usize, hue: f32, scale: f32) {
        let power = self.power * scale;
        for _ in 0..count {
            let angle = rng.random_range(0.0..TAU);
            let speed = if power > 0.0 {
                rng.random_range(power * 0.6..=power)
            } else {
                0.0
            };
            self.particles.push_back(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                accel: Vec2::new(0.0, self.gravity),
                age: 0.0,
                life: rng.random_range(0.8..1.6),
                size: rng.random_range(1.5f32..3.5) * scale,
                hue: (hue + rng.random_range(-20.0f32..20.0)).rem_euclid(360.0),
                saturation: rng.random_range(70.0..100.0),
                lightness: rng.random_range(50.0..70.0),
                alpha: 1.0,
            });
        }
        if self.particles.len() > self.capacity {
            let excess = self.particles.len() - self.capacity;
            self.particles.drain(..excess);
        }
    }

    /// Age, integrate and fade every spark; expired sparks are dropped
    pub fn step(&mut self, dt: f32) {
        let k = dt * FRAME_RATE_SCALE;
        self.particles.retain_mut(|p| {
            p.age += dt;
            if p.age >= p.life {
                return false;
            }
            p.vel += p.accel * k;
            p.pos += p.vel * k;
            p.alpha = 1.0 - p.age / p.life;
            p.size *= SPARK_SHRINK;
            true
        });
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live sparks, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_emit_count_and_speed_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut sys = ParticleSystem::default();
        sys.emit(&mut rng, Vec2::new(100.0, 100.0), 50, 200.0, 1.0);
        assert_eq!(sys.len(), 50);
        for p in sys.iter() {
            let speed = p.vel.length();
            assert!(speed >= 9.0 * 0.6 - 1e-3 && speed <= 9.0 + 1e-3);
            assert!(p.hue >= 0.0 && p.hue < 360.0);
            assert_eq!(p.accel, Vec2::new(0.0, 0.12));
        }
    }

    #[test]
    fn test_hue_wraps_near_zero() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut sys = ParticleSystem::default();
        sys.emit(&mut rng, Vec2::ZERO, 200, 5.0, 1.0);
        assert!(sys.iter().all(|p| (0.0..360.0).contains(&p.hue)));
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut sys = ParticleSystem::new(10);
        sys.emit(&mut rng, Vec2::new(1.0, 1.0), 8, 0.0, 1.0);
        sys.emit(&mut rng, Vec2::new(2.0, 2.0), 8, 0.0, 1.0);
        assert_eq!(sys.len(), 10);
        let from_first = sys.iter().filter(|p| p.pos == Vec2::new(1.0, 1.0)).count();
        assert_eq!(from_first, 2);
        // Newest burst survives intact at the back
        assert!(sys.iter().skip(2).all(|p| p.pos == Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_step_fades_shrinks_and_falls() {
        let mut sys = ParticleSystem::default();
        sys.particles.push_back(Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            accel: Vec2::new(0.0, 0.12),
            age: 0.0,
            life: 1.0,
            size: 2.0,
            hue: 0.0,
            saturation: 80.0,
            lightness: 60.0,
            alpha: 1.0,
        });
        sys.step(0.25);
        let p = sys.iter().next().unwrap();
        assert!((p.alpha - 0.75).abs() < 1e-6);
        assert!((p.size - 2.0 * SPARK_SHRINK).abs() < 1e-6);
        assert!(p.pos.y > 0.0);
        assert!(p.vel.y > 0.0);
    }

    #[test]
    fn test_expired_sparks_removed() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut sys = ParticleSystem::default();
        sys.emit(&mut rng, Vec2::ZERO, 30, 90.0, 1.0);
        // Max life is 1.6s
        for _ in 0..40 {
            sys.step(0.05);
        }
        assert!(sys.is_empty());
    }

    proptest! {
        #[test]
        fn prop_age_stays_within_life(seed in any::<u64>(), steps in 1usize..60, dt in 0.0f32..0.05) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut sys = ParticleSystem::default();
            sys.emit(&mut rng, Vec2::ZERO, 20, 0.0, 1.0);
            for _ in 0..steps {
                sys.step(dt);
                for p in sys.iter() {
                    prop_assert!(p.age >= 0.0 && p.age < p.life);
                    prop_assert!(p.alpha > 0.0 && p.alpha <= 1.0);
                }
            }
        }
    }
}
