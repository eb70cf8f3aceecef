//! Chain reactions
//!
//! A detonation spreads breadth-first to every live target within the
//! chain radius of the exploding one. In delayed mode the hit target pops
//! at once and the blast reaches its nearest neighbour `CHAIN_DELAY`
//! seconds later, against the field as it exists at that moment.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::fever::FeverTransition;
use super::state::Round;
use super::target::{Target, TargetId};
use crate::consts::*;
use crate::{combo_t, lerp};

/// Per-call inputs shared by every detonation in a resolution pass
#[derive(Debug, Clone, Copy)]
pub struct ChainContext {
    pub now: f64,
    pub progress: f32,
    pub burst_count: usize,
}

/// One exploded target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detonation {
    pub id: TargetId,
    pub pos: Vec2,
    pub hue: f32,
    pub points: u64,
}

/// Everything a resolution pass detonated, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainOutcome {
    pub detonations: Vec<Detonation>,
    /// Fever edge caused by a stale combo lapsing on this hit
    pub fever: Option<FeverTransition>,
}

impl ChainOutcome {
    pub fn points(&self) -> u64 {
        self.detonations.iter().map(|d| d.points).sum()
    }

    pub fn len(&self) -> usize {
        self.detonations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detonations.is_empty()
    }

    pub fn merge(&mut self, other: ChainOutcome) {
        self.detonations.extend(other.detonations);
        self.fever = self.fever.or(other.fever);
    }
}

/// Secondary blast wave scheduled by a delayed-mode hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayedWave {
    pub fire_at: f64,
    /// Where the hit target exploded
    pub origin: Vec2,
    /// The hit target's radius
    pub radius: f32,
    /// Round that scheduled the wave
    pub generation: u64,
}

/// Reach of a blast from a target of `radius`
pub fn chain_radius(combo: u32, progress: f32, radius: f32) -> f32 {
    let combo_scale = lerp(1.0, CHAIN_COMBO_SCALE_MAX, combo_t(combo));
    let time_scale = lerp(1.0, CHAIN_TIME_SCALE_MAX, progress.clamp(0.0, 1.0));
    CHAIN_RADIUS_MULT * combo_scale * time_scale * radius
}

/// Firework size scale for the current combo
pub fn fire_scale(combo: u32) -> f32 {
    lerp(FIRE_SCALE_MIN, FIRE_SCALE_MAX, combo_t(combo))
}

/// Closest target whose radius strictly contains `point`
pub fn hit_test(targets: &[Target], point: Vec2) -> Option<TargetId> {
    targets
        .iter()
        .map(|t| (t.id, t.pos.distance(point), t.radius))
        .filter(|&(_, d, r)| d < r)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _, _)| id)
}

/// Score a target and light its firework. The caller removes it.
fn explode(round: &mut Round, rng: &mut impl Rng, ctx: ChainContext, target: &Target) -> Detonation {
    let points = round.combo.register_hit(ctx.now);
    round.fever.observe_combo(round.combo.combo, ctx.now);
    let scale = fire_scale(round.combo.combo);
    round
        .particles
        .emit(rng, target.pos, ctx.burst_count, target.hue, scale);
    Detonation {
        id: target.id,
        pos: target.pos,
        hue: target.hue,
        points,
    }
}

/// Breadth-first chain detonation starting at `origin`.
///
/// Queued ids are re-checked on dequeue, so a target reachable along
/// several paths still explodes once. Unknown origins are a no-op.
pub fn resolve_chain(
    round: &mut Round,
    rng: &mut impl Rng,
    ctx: ChainContext,
    origin: TargetId,
) -> ChainOutcome {
    let mut outcome = ChainOutcome::default();
    let mut queue = VecDeque::from([origin]);

    while let Some(id) = queue.pop_front() {
        let Some(current) = round.field.get(id).cloned() else {
            continue;
        };

        outcome.detonations.push(explode(round, rng, ctx, &current));

        let reach = chain_radius(round.combo.combo, ctx.progress, current.radius);
        queue.extend(
            round
                .field
                .targets()
                .iter()
                .filter(|o| o.id != id && o.pos.distance(current.pos) <= reach)
                .map(|o| o.id),
        );

        round.field.remove(id);
    }

    if outcome.len() > 1 {
        log::debug!("Chain of {} from {:?}", outcome.len(), origin);
    }
    outcome
}

/// Player hit on `id`: full chain now, or a single pop plus a delayed wave
pub fn detonate(
    round: &mut Round,
    rng: &mut impl Rng,
    ctx: ChainContext,
    id: TargetId,
    delayed: bool,
) -> ChainOutcome {
    // A stale combo dies before the new hit counts, and fever with it
    let fever = if round.combo.decay(ctx.now) {
        round.fever.end()
    } else {
        None
    };

    if !delayed {
        let mut outcome = resolve_chain(round, rng, ctx, id);
        outcome.fever = fever;
        return outcome;
    }

    let Some(target) = round.field.remove(id) else {
        return ChainOutcome {
            fever,
            ..Default::default()
        };
    };
    let detonation = explode(round, rng, ctx, &target);
    round.waves.push(DelayedWave {
        fire_at: ctx.now + CHAIN_DELAY,
        origin: target.pos,
        radius: target.radius,
        generation: round.generation,
    });

    ChainOutcome {
        detonations: vec![detonation],
        fever,
    }
}

/// Fire every wave due at `ctx.now`.
///
/// The search uses the hit target's recorded position and radius with the
/// combo and progress as they stand now, then chains from the nearest hit.
pub fn fire_due_waves(round: &mut Round, rng: &mut impl Rng, ctx: ChainContext) -> ChainOutcome {
    let mut outcome = ChainOutcome::default();
    if round.waves.is_empty() {
        return outcome;
    }

    let (due, pending): (Vec<_>, Vec<_>) = round
        .waves
        .drain(..)
        .partition(|w| w.fire_at <= ctx.now);
    round.waves = pending;

    for wave in due {
        if wave.generation != round.generation {
            log::trace!("Discarding wave from round {}", wave.generation);
            continue;
        }

        let reach = chain_radius(round.combo.combo, ctx.progress, wave.radius);
        let nearest = round
            .field
            .targets()
            .iter()
            .map(|t| (t.id, t.pos.distance(wave.origin)))
            .filter(|&(_, d)| d <= reach)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        if let Some((id, _)) = nearest {
            log::debug!("Delayed wave at {:?} reached {:?}", wave.origin, id);
            outcome.merge(resolve_chain(round, rng, ctx, id));
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fever::FeverPhase;
    use crate::sim::state::RoundPhase;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn round() -> Round {
        let mut r = Round::new(1);
        r.phase = RoundPhase::Playing;
        r
    }

    fn ctx(now: f64) -> ChainContext {
        ChainContext {
            now,
            progress: 0.0,
            burst_count: 4,
        }
    }

    fn place(r: &mut Round, x: f32, y: f32) -> TargetId {
        r.field.insert(Vec2::new(x, y), TARGET_RADIUS, 30.0, 0.0, 0.0)
    }

    #[test]
    fn test_chain_radius_scales() {
        assert_eq!(chain_radius(0, 0.0, 24.0), 72.0);
        assert_eq!(chain_radius(1, 0.0, 24.0), 72.0);
        assert!((chain_radius(MAX_COMBO, 0.0, 24.0) - 72.0 * 1.4).abs() < 1e-3);
        assert!((chain_radius(MAX_COMBO, 1.0, 24.0) - 72.0 * 1.4 * 1.2).abs() < 1e-3);
        // Out-of-range progress is clamped
        assert_eq!(chain_radius(1, 5.0, 24.0), chain_radius(1, 1.0, 24.0));
    }

    #[test]
    fn test_hit_test_picks_closest_inside_radius() {
        let mut r = round();
        let a = place(&mut r, 100.0, 100.0);
        let b = place(&mut r, 130.0, 100.0);
        assert_eq!(hit_test(r.field.targets(), Vec2::new(120.0, 100.0)), Some(b));
        assert_eq!(hit_test(r.field.targets(), Vec2::new(105.0, 100.0)), Some(a));
        // Exactly on the rim does not count
        assert_eq!(hit_test(r.field.targets(), Vec2::new(100.0, 76.0)), None);
        assert_eq!(hit_test(r.field.targets(), Vec2::new(400.0, 400.0)), None);
    }

    #[test]
    fn test_two_hop_chain() {
        let mut r = round();
        let mut rng = Pcg32::seed_from_u64(1);
        // Chain radius at low combo is 72; D sits 140 from A but 70 from B
        let a = place(&mut r, 100.0, 300.0);
        let b = place(&mut r, 170.0, 300.0);
        let c = place(&mut r, 100.0, 240.0);
        let d = place(&mut r, 240.0, 300.0);
        let far = place(&mut r, 400.0, 600.0);

        let out = resolve_chain(&mut r, &mut rng, ctx(1.0), a);
        let ids: Vec<_> = out.detonations.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![a, b, c, d]);
        assert_eq!(r.combo.combo, 4);
        assert_eq!(r.field.len(), 1);
        assert!(r.field.contains(far));
        assert_eq!(out.points(), r.combo.score);
        assert_eq!(r.particles.len(), 16);
    }

    #[test]
    fn test_missing_origin_is_noop() {
        let mut r = round();
        let mut rng = Pcg32::seed_from_u64(1);
        let a = place(&mut r, 100.0, 100.0);
        r.field.remove(a);
        let out = resolve_chain(&mut r, &mut rng, ctx(0.0), a);
        assert!(out.is_empty());
        assert_eq!(r.combo.combo, 0);
        let out = detonate(&mut r, &mut rng, ctx(0.0), a, true);
        assert!(out.is_empty());
        assert!(r.waves.is_empty());
    }

    #[test]
    fn test_immediate_mode_chains_synchronously() {
        let mut r = round();
        let mut rng = Pcg32::seed_from_u64(1);
        let a = place(&mut r, 100.0, 100.0);
        place(&mut r, 150.0, 100.0);
        let out = detonate(&mut r, &mut rng, ctx(0.0), a, false);
        assert_eq!(out.len(), 2);
        assert!(r.field.is_empty());
        assert!(r.waves.is_empty());
    }

    #[test]
    fn test_delayed_mode_pops_then_waves() {
        let mut r = round();
        let mut rng = Pcg32::seed_from_u64(1);
        let a = place(&mut r, 100.0, 100.0);
        let near = place(&mut r, 150.0, 100.0);
        let nearer = place(&mut r, 100.0, 140.0);

        let out = detonate(&mut r, &mut rng, ctx(1.0), a, true);
        assert_eq!(out.len(), 1);
        assert_eq!(r.combo.combo, 1);
        assert_eq!(r.waves.len(), 1);
        assert!(r.field.contains(near) && r.field.contains(nearer));

        // Not due yet
        assert!(fire_due_waves(&mut r, &mut rng, ctx(1.05)).is_empty());
        assert_eq!(r.waves.len(), 1);

        let out = fire_due_waves(&mut r, &mut rng, ctx(1.2));
        assert_eq!(out.detonations[0].id, nearer);
        assert_eq!(out.len(), 2);
        assert!(r.field.is_empty());
        assert!(r.waves.is_empty());
        assert_eq!(r.combo.combo, 3);
    }

    #[test]
    fn test_wave_sees_field_at_fire_time() {
        let mut r = round();
        let mut rng = Pcg32::seed_from_u64(1);
        let a = place(&mut r, 100.0, 100.0);
        let moved = place(&mut r, 150.0, 100.0);
        detonate(&mut r, &mut rng, ctx(0.0), a, true);

        // The neighbour drifts out of reach during the delay
        r.field.remove(moved);
        let late = place(&mut r, 500.0, 500.0);
        let out = fire_due_waves(&mut r, &mut rng, ctx(0.2));
        assert!(out.is_empty());
        assert!(r.field.contains(late));
    }

    #[test]
    fn test_stale_generation_wave_is_discarded() {
        let mut r = round();
        let mut rng = Pcg32::seed_from_u64(1);
        place(&mut r, 100.0, 100.0);
        r.waves.push(DelayedWave {
            fire_at: 0.0,
            origin: Vec2::new(100.0, 100.0),
            radius: TARGET_RADIUS,
            generation: 0,
        });
        let out = fire_due_waves(&mut r, &mut rng, ctx(1.0));
        assert!(out.is_empty());
        assert_eq!(r.field.len(), 1);
    }

    #[test]
    fn test_hit_after_window_restarts_combo() {
        let mut r = round();
        let mut rng = Pcg32::seed_from_u64(1);
        let a = place(&mut r, 100.0, 100.0);
        let b = place(&mut r, 400.0, 400.0);
        detonate(&mut r, &mut rng, ctx(0.0), a, false);
        detonate(&mut r, &mut rng, ctx(5.0), b, false);
        assert_eq!(r.combo.combo, 1);
        assert_eq!(r.combo.score, 200);
    }

    #[test]
    fn test_lapsed_combo_on_hit_ends_fever() {
        let mut r = round();
        let mut rng = Pcg32::seed_from_u64(1);
        let a = place(&mut r, 100.0, 100.0);
        let b = place(&mut r, 400.0, 400.0);
        detonate(&mut r, &mut rng, ctx(0.0), a, false);
        r.fever.phase = FeverPhase::Active { since: 0.0 };

        let out = detonate(&mut r, &mut rng, ctx(5.0), b, true);
        assert_eq!(out.fever, Some(FeverTransition::Ended));
        assert!(!r.fever.is_active());
        assert_eq!(r.combo.combo, 1);
    }

    proptest! {
        #[test]
        fn prop_chain_terminates_without_double_hits(
            points in proptest::collection::vec((0.0f32..400.0, 0.0f32..400.0), 1..40),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut r = round();
            let mut rng = Pcg32::seed_from_u64(3);
            let ids: Vec<_> = points.iter().map(|&(x, y)| place(&mut r, x, y)).collect();
            let before = r.field.len();
            let origin = ids[pick.index(ids.len())];

            let out = resolve_chain(&mut r, &mut rng, ctx(0.0), origin);

            let mut seen: Vec<_> = out.detonations.iter().map(|d| d.id).collect();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), out.len());
            prop_assert_eq!(out.detonations[0].id, origin);
            prop_assert_eq!(r.field.len() + out.len(), before);
            for d in &out.detonations {
                prop_assert!(!r.field.contains(d.id));
            }
        }
    }
}
