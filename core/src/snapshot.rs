//! Commit snapshots: the unit handed to a PersistenceGateway.
//!
//! One snapshot per simulated batch. It captures everything needed to
//! rebuild the pool later: obtained counts, counters, and the history
//! rows the batch appended. Gateways must apply it all-or-nothing.

use crate::{
    batch::BatchResult,
    draw::DrawResult,
    pool::{RewardItem, StreakCounters},
    types::{DrawCount, DrawType, ItemId, PoolId, Rarity},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub draw_number:       DrawCount,
    pub item_id:           ItemId,
    pub display_name:      String,
    pub rarity:            Rarity,
    pub is_pity_triggered: bool,
}

impl HistoryEntry {
    pub fn new(draw_number: DrawCount, result: &DrawResult) -> Self {
        Self {
            draw_number,
            item_id:           result.item.id.clone(),
            display_name:      result.item.display_name.clone(),
            rarity:            result.item.rarity,
            is_pity_triggered: result.is_pity_triggered,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub commit_id:             String,
    pub committed_at:          DateTime<Utc>,
    pub pool_id:               PoolId,
    pub draw_type:             Option<DrawType>,
    pub items:                 Vec<RewardItem>,
    pub pity_counter:          u32,
    pub streaks:               StreakCounters,
    pub total_draws:           DrawCount,
    pub currency_yield:        u64,
    pub appended_history:      Vec<HistoryEntry>,
    pub appended_rare_history: Vec<HistoryEntry>,
}

impl PoolSnapshot {
    pub fn from_batch(batch: &BatchResult) -> Self {
        Self {
            commit_id:             uuid::Uuid::new_v4().to_string(),
            committed_at:          Utc::now(),
            pool_id:               batch.pool.pool_id().to_string(),
            draw_type:             batch.draw_type,
            items:                 batch.pool.items().to_vec(),
            pity_counter:          batch.pity_counter,
            streaks:               batch.streaks,
            total_draws:           batch.pool.total_draws(),
            currency_yield:        batch.currency_yield,
            appended_history:      batch.history.clone(),
            appended_rare_history: batch.rare_history.clone(),
        }
    }
}
