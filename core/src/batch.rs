//! Multi-draw batch simulation.
//!
//! RULES:
//!   - The caller's pool is never touched. Draws run against a clone.
//!   - Draw k+1 sees the obtained counts and pity counter left by draws 1..k.
//!   - The whole batch completes before anything is revealed or committed.
//!   - Sequence numbers count from the pool's total_draws BEFORE the batch.

use crate::{
    draw::{DrawEngine, DrawResult},
    error::GachaResult,
    pool::{RewardPool, StreakCounters},
    rng::DrawRng,
    snapshot::{HistoryEntry, PoolSnapshot},
    types::{DrawCount, DrawType, Rarity},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub draw_type:      Option<DrawType>,
    pub results:        Vec<DrawResult>,
    pub streaks:        StreakCounters,
    pub currency_yield: u64,
    pub pool:           RewardPool,
    pub pity_counter:   u32,
    pub history:        Vec<HistoryEntry>,
    pub rare_history:   Vec<HistoryEntry>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn total_draws(&self) -> DrawCount {
        self.pool.total_draws()
    }

    pub fn has_highlight(&self) -> bool {
        self.results.iter().any(DrawResult::is_highlight)
    }

    pub fn pity_triggers(&self) -> usize {
        self.results.iter().filter(|r| r.is_pity_triggered).count()
    }

    pub fn count_by_rarity(&self, rarity: Rarity) -> usize {
        self.results.iter().filter(|r| r.rarity() == rarity).count()
    }

    /// The atomic commit payload for the persistence gateway.
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot::from_batch(self)
    }
}

pub struct BatchSimulator;

impl BatchSimulator {
    /// Simulate a draw action of the given type.
    pub fn simulate_action(
        pool:      &RewardPool,
        draw_type: DrawType,
        rng:       &mut impl DrawRng,
    ) -> GachaResult<BatchResult> {
        let mut batch = Self::simulate(pool, draw_type.count(), rng)?;
        batch.draw_type = Some(draw_type);
        Ok(batch)
    }

    /// Draw `count` times, threading state through a private snapshot.
    pub fn simulate(
        pool:  &RewardPool,
        count: u32,
        rng:   &mut impl DrawRng,
    ) -> GachaResult<BatchResult> {
        let mut snapshot = pool.clone();
        let pre_batch_total = pool.total_draws();

        let mut results = Vec::with_capacity(count as usize);
        let mut history = Vec::with_capacity(count as usize);
        let mut rare_history = Vec::new();
        let mut currency_yield = 0u64;

        for position in 1..=count as DrawCount {
            let mut result = DrawEngine::draw(&snapshot, snapshot.pity_counter(), rng)?;
            let jackpot_hit = snapshot.pity_enabled() && result.item_index == 0;
            snapshot.record_draw(result.item_index, jackpot_hit);

            if let Some(amount) = result.item.currency_yield {
                currency_yield += amount;
            }

            let draw_number = pre_batch_total + position;
            if result.is_highlight() {
                result.draw_sequence_number = Some(draw_number);
            }

            let entry = HistoryEntry::new(draw_number, &result);
            if result.is_highlight() {
                rare_history.push(entry.clone());
            }
            history.push(entry);
            results.push(result);
        }

        log::debug!(
            "pool={} batch of {count}: pity {} -> {}, total_draws {} -> {}, yield {currency_yield}",
            pool.pool_id(),
            pool.pity_counter(),
            snapshot.pity_counter(),
            pre_batch_total,
            snapshot.total_draws(),
        );

        Ok(BatchResult {
            draw_type: None,
            results,
            streaks: snapshot.streaks(),
            currency_yield,
            pity_counter: snapshot.pity_counter(),
            pool: snapshot,
            history,
            rare_history,
        })
    }
}
