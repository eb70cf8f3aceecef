//! Real-time simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (same seed + same inputs = same round)
//! - Stable target ids, never raw indices
//! - No rendering or platform dependencies

pub mod chain;
pub mod combo;
pub mod fever;
pub mod particles;
pub mod state;
pub mod target;
pub mod tick;

pub use chain::{ChainOutcome, DelayedWave, Detonation, chain_radius, hit_test, resolve_chain};
pub use combo::{ComboState, score_multiplier};
pub use fever::{FeverPhase, FeverState};
pub use particles::{Particle, ParticleSystem};
pub use state::{GameEvent, GameState, Round, RoundPhase, RoundResult};
pub use target::{Playfield, Target, TargetField, TargetId};
pub use tick::{TickInput, tick};
