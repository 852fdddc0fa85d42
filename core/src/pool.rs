//! Reward pool: the catalog a draw runs against.
//!
//! A RewardPool is an immutable value from the engine's point of view.
//! BatchSimulator clones it, threads draws through the clone, and hands
//! the clone back as the new snapshot. The owner swaps it in wholesale.
//!
//! Construction always validates, so every pool in circulation has at
//! least one uncapped Common item to act as the redistribution sink.

use crate::{
    config::ActivityConfig,
    error::{GachaError, GachaResult},
    types::{DrawCount, ItemId, PoolId, Rarity},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RewardItem {
    pub id:             ItemId,
    pub display_name:   String,
    pub category:       String,
    pub rarity:         Rarity,
    pub weight:         f64,
    /// 0 means unlimited.
    pub cap:            u32,
    pub obtained:       u32,
    pub currency_yield: Option<u64>,
}

impl RewardItem {
    pub fn is_capped(&self) -> bool {
        self.cap > 0
    }

    pub fn is_eligible(&self) -> bool {
        self.cap == 0 || self.obtained < self.cap
    }

    /// Claims left before the item drops out of the pool.
    /// None for unlimited items.
    pub fn remaining(&self) -> Option<u32> {
        self.is_capped().then(|| self.cap.saturating_sub(self.obtained))
    }
}

/// Draws since the last hit at or above each tier. Display only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakCounters {
    pub rare:      u32,
    pub epic:      u32,
    pub legendary: u32,
}

impl StreakCounters {
    pub fn record(&mut self, rarity: Rarity) {
        match rarity {
            Rarity::Legendary => {
                self.rare = 0;
                self.epic = 0;
                self.legendary = 0;
            }
            Rarity::Epic => {
                self.rare = 0;
                self.epic = 0;
                self.legendary += 1;
            }
            Rarity::Rare => {
                self.rare = 0;
                self.epic += 1;
                self.legendary += 1;
            }
            Rarity::Common => {
                self.rare += 1;
                self.epic += 1;
                self.legendary += 1;
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RewardPool {
    pool_id:        PoolId,
    items:          Vec<RewardItem>,
    pity_threshold: u32,
    pity_counter:   u32,
    total_draws:    DrawCount,
    streaks:        StreakCounters,
}

impl RewardPool {
    /// Build and validate a pool. Counters start at zero.
    pub fn new(
        pool_id:        impl Into<PoolId>,
        items:          Vec<RewardItem>,
        pity_threshold: u32,
    ) -> GachaResult<Self> {
        let pool = Self {
            pool_id: pool_id.into(),
            items,
            pity_threshold,
            pity_counter: 0,
            total_draws: 0,
            streaks: StreakCounters::default(),
        };
        pool.validate()?;
        Ok(pool)
    }

    /// Build a pool from a catalog merged with persisted obtained counts.
    /// Items missing from `obtained` start at zero.
    pub fn from_activity(
        activity: &ActivityConfig,
        obtained: &HashMap<ItemId, u32>,
    ) -> GachaResult<Self> {
        let items = activity
            .items
            .iter()
            .map(|cfg| RewardItem {
                id:             cfg.id.clone(),
                display_name:   cfg.display_name.clone(),
                category:       cfg.category.clone(),
                rarity:         cfg.rarity,
                weight:         cfg.weight,
                cap:            cfg.cap,
                obtained:       obtained.get(&cfg.id).copied().unwrap_or(0),
                currency_yield: cfg.currency_yield,
            })
            .collect();
        Self::new(activity.pool_id.clone(), items, activity.pity_threshold)
    }

    /// Restore the persisted counters onto a freshly loaded pool.
    pub fn with_counters(
        mut self,
        pity_counter: u32,
        total_draws:  DrawCount,
        streaks:      StreakCounters,
    ) -> Self {
        self.pity_counter = pity_counter;
        self.total_draws = total_draws;
        self.streaks = streaks;
        self
    }

    fn validate(&self) -> GachaResult<()> {
        if self.items.is_empty() {
            return Err(GachaError::EmptyPool { pool_id: self.pool_id.clone() });
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            if item.id.trim().is_empty() {
                return Err(GachaError::InvalidItem {
                    id:     item.id.clone(),
                    reason: "empty id".into(),
                });
            }
            if !seen.insert(item.id.as_str()) {
                return Err(GachaError::DuplicateItem { id: item.id.clone() });
            }
            if !item.weight.is_finite() || item.weight < 0.0 {
                return Err(GachaError::InvalidItem {
                    id:     item.id.clone(),
                    reason: format!("weight must be finite and non-negative, got {}", item.weight),
                });
            }
            if item.is_capped() && item.obtained > item.cap {
                return Err(GachaError::InvalidItem {
                    id:     item.id.clone(),
                    reason: format!("obtained {} exceeds cap {}", item.obtained, item.cap),
                });
            }
        }

        let total = self.total_weight();
        if total <= 0.0 || !total.is_finite() {
            return Err(GachaError::NonPositiveTotalWeight {
                pool_id: self.pool_id.clone(),
                total,
            });
        }

        if self.sink_index().is_none() {
            return Err(GachaError::NoSinkItem { pool_id: self.pool_id.clone() });
        }
        Ok(())
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn pool_id(&self) -> &str                 { &self.pool_id }
    pub fn items(&self) -> &[RewardItem]          { &self.items }
    pub fn pity_threshold(&self) -> u32           { self.pity_threshold }
    pub fn pity_counter(&self) -> u32             { self.pity_counter }
    pub fn total_draws(&self) -> DrawCount        { self.total_draws }
    pub fn streaks(&self) -> StreakCounters       { self.streaks }

    pub fn item(&self, id: &str) -> Option<&RewardItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn pity_enabled(&self) -> bool {
        self.pity_threshold > 0
    }

    /// The pity target. Only meaningful when pity is enabled.
    pub fn jackpot(&self) -> Option<&RewardItem> {
        self.items.first().filter(|_| self.pity_enabled())
    }

    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|i| i.weight).sum()
    }

    /// The uncapped Common item with the greatest weight.
    /// First in catalog order wins ties.
    pub fn sink_index(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, item) in self.items.iter().enumerate() {
            if item.rarity != Rarity::Common || item.is_capped() {
                continue;
            }
            match best {
                Some(b) if self.items[b].weight >= item.weight => {}
                _ => best = Some(idx),
            }
        }
        best
    }

    /// Eligible items paired with their weight after moving the weight
    /// of every capped-out item onto the sink. Catalog order is kept.
    pub fn adjusted_weights(&self) -> Vec<(usize, f64)> {
        let freed: f64 = self
            .items
            .iter()
            .filter(|i| !i.is_eligible())
            .map(|i| i.weight)
            .sum();
        let sink = self.sink_index();

        self.items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.is_eligible())
            .map(|(idx, i)| {
                if Some(idx) == sink {
                    (idx, i.weight + freed)
                } else {
                    (idx, i.weight)
                }
            })
            .collect()
    }

    /// Skipping the reveal is allowed once at most one capped Epic or
    /// Legendary item is still unclaimed.
    pub fn can_fast_forward(&self) -> bool {
        let unclaimed = self
            .items
            .iter()
            .filter(|i| i.rarity.is_highlight() && i.is_capped() && i.is_eligible())
            .count();
        unclaimed <= 1
    }

    // ── Mutation (batch snapshots only) ────────────────────────────

    pub(crate) fn record_draw(&mut self, index: usize, jackpot_hit: bool) {
        let item = &mut self.items[index];
        item.obtained += 1;
        if item.is_capped() && !item.is_eligible() {
            log::info!("pool={} item={} capped out at {}", self.pool_id, item.id, item.cap);
        }
        let rarity = item.rarity;

        self.pity_counter = if jackpot_hit { 0 } else { self.pity_counter + 1 };
        self.total_draws += 1;
        self.streaks.record(rarity);
    }
}
