//! Single weighted draw against a pool snapshot.
//!
//! ORDER OF OPERATIONS:
//!   1. Pity override: force the jackpot (index 0) once the counter
//!      reaches threshold - 1, unless the jackpot is capped out.
//!   2. Capped-out items leave the pool; their weight moves onto the sink.
//!   3. Cumulative-weight walk over eligible items in catalog order.
//!   4. A walk that overshoots due to float rounding lands on the last
//!      eligible item.

use crate::{
    error::{GachaError, GachaResult},
    pool::{RewardItem, RewardPool},
    rng::DrawRng,
    types::{DrawCount, ItemId, Rarity},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawResult {
    /// Position of the item in the pool catalog.
    pub item_index:           usize,
    /// The item as it stood before this draw was counted.
    pub item:                 RewardItem,
    pub is_pity_triggered:    bool,
    /// Lifetime draw number. Set only on Epic/Legendary results.
    pub draw_sequence_number: Option<DrawCount>,
}

impl DrawResult {
    pub fn item_id(&self) -> &ItemId {
        &self.item.id
    }

    pub fn rarity(&self) -> Rarity {
        self.item.rarity
    }

    pub fn is_highlight(&self) -> bool {
        self.item.rarity.is_highlight()
    }
}

pub struct DrawEngine;

impl DrawEngine {
    /// Perform one draw. `pity_counter` is passed separately so a batch can
    /// thread its own counter through an otherwise unchanged snapshot.
    pub fn draw(
        pool:         &RewardPool,
        pity_counter: u32,
        rng:          &mut impl DrawRng,
    ) -> GachaResult<DrawResult> {
        if let Some(result) = Self::pity_override(pool, pity_counter) {
            return Ok(result);
        }

        let weights = pool.adjusted_weights();
        let Some(&(last_index, _)) = weights.last() else {
            return Err(GachaError::NoEligibleItems { pool_id: pool.pool_id().to_string() });
        };

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        let roll = rng.next_f64() * total;

        let mut cumulative = 0.0;
        let mut picked = None;
        for &(idx, weight) in &weights {
            cumulative += weight;
            if cumulative > roll {
                picked = Some(idx);
                break;
            }
        }

        let index = picked.unwrap_or_else(|| {
            log::debug!(
                "pool={} roll={roll} missed cumulative total {cumulative}, using last eligible",
                pool.pool_id()
            );
            last_index
        });

        Ok(DrawResult {
            item_index:           index,
            item:                 pool.items()[index].clone(),
            is_pity_triggered:    false,
            draw_sequence_number: None,
        })
    }

    fn pity_override(pool: &RewardPool, pity_counter: u32) -> Option<DrawResult> {
        if !pool.pity_enabled() || pity_counter < pool.pity_threshold() - 1 {
            return None;
        }
        let jackpot = pool.jackpot()?;
        if !jackpot.is_eligible() {
            // Pity has nothing left to give; fall through to a normal draw.
            return None;
        }
        log::info!(
            "pool={} pity triggered at counter {pity_counter}: {}",
            pool.pool_id(),
            jackpot.id
        );
        Some(DrawResult {
            item_index:           0,
            item:                 jackpot.clone(),
            is_pity_triggered:    true,
            draw_sequence_number: None,
        })
    }
}
