//! Deterministic random number generation.
//!
//! RULE: Nothing in the engine may call any platform RNG.
//! All randomness flows through a DrawRng. Production code uses PoolRng
//! instances derived from a single master seed; tests may substitute
//! ScriptedRng to force exact outcomes.
//!
//! Each pool slot gets its own RNG stream, seeded deterministically
//! from (master_seed XOR slot). This means:
//!   - Adding a second pool never changes the first pool's stream.
//!   - Each pool's stream is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use std::collections::VecDeque;

/// Source of uniform rolls for the draw engine.
pub trait DrawRng {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;
}

/// A named, deterministic RNG for a single pool slot.
pub struct PoolRng {
    pub name: String,
    inner:    Pcg64Mcg,
}

impl PoolRng {
    /// Create a pool RNG from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot: u64) -> Self {
        let derived_seed = master_seed ^ (slot.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name:  "unnamed".into(),
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }
}

impl DrawRng for PoolRng {
    fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// All pool RNGs for a single run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// Stream for the pool at `slot`. Dual-pool activities use slots 0 and 1.
    pub fn for_pool(&self, pool_id: &str, slot: u64) -> PoolRng {
        PoolRng::new(self.master_seed, slot).with_name(pool_id)
    }
}

/// Replays a fixed list of rolls, then repeats the last one.
/// Used by tests to force specific draws.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    rolls: VecDeque<f64>,
    last:  f64,
}

impl ScriptedRng {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self { rolls: rolls.into_iter().collect(), last: 0.0 }
    }

    /// Always rolls `value`.
    pub fn constant(value: f64) -> Self {
        Self { rolls: VecDeque::new(), last: value }
    }
}

impl DrawRng for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        if let Some(r) = self.rolls.pop_front() {
            self.last = r;
        }
        self.last
    }
}
