//! The gacha machine: one per pool.
//!
//! A draw action runs in this fixed order:
//!   1. Debit the wallet (refunded if anything below fails).
//!   2. Simulate the whole batch against the live pool.
//!   3. Hand the snapshot to the persistence gateway.
//!   4. Swap the new pool in and credit any currency yield.
//!
//! RULES:
//!   - The live pool is replaced wholesale, never mutated in place.
//!   - Nothing is swapped in unless the gateway accepted the commit.
//!   - Revealing is the caller's business and happens after this returns.

use crate::{
    batch::{BatchResult, BatchSimulator},
    config::{ActivityConfig, MachineConfig},
    error::GachaResult,
    gateway::PersistenceGateway,
    pool::RewardPool,
    rng::{PoolRng, RngBank},
    store::GachaStore,
    types::DrawType,
    wallet::Wallet,
};
use std::time::Duration;

pub struct GachaMachine<G: PersistenceGateway> {
    pool:    RewardPool,
    rng:     PoolRng,
    wallet:  Wallet,
    config:  MachineConfig,
    gateway: G,
}

impl<G: PersistenceGateway> GachaMachine<G> {
    pub fn new(pool: RewardPool, rng: PoolRng, config: MachineConfig, gateway: G) -> Self {
        let wallet = Wallet::new(config.starting_balance);
        Self { pool, rng, wallet, config, gateway }
    }

    pub fn pool(&self) -> &RewardPool        { &self.pool }
    pub fn wallet(&self) -> &Wallet          { &self.wallet }
    pub fn gateway(&self) -> &G              { &self.gateway }
    pub fn config(&self) -> &MachineConfig   { &self.config }

    /// How long the host should wait before calling perform_draw.
    pub fn pre_commit_delay(&self) -> Duration {
        self.config.pre_commit_delay()
    }

    pub fn can_fast_forward(&self) -> bool {
        self.pool.can_fast_forward()
    }

    pub fn perform_draw(&mut self, draw_type: DrawType) -> GachaResult<BatchResult> {
        let cost = self.config.cost_of(draw_type);
        self.wallet.debit(cost)?;

        let batch = match self.simulate_and_commit(draw_type) {
            Ok(batch) => batch,
            Err(e) => {
                self.wallet.credit(cost);
                log::warn!("pool={} {} draw rolled back: {e}", self.pool.pool_id(), draw_type.name());
                return Err(e);
            }
        };

        self.pool = batch.pool.clone();
        self.wallet.credit(batch.currency_yield);

        log::debug!(
            "pool={} {} draw committed: total_draws={} pity={} balance={}",
            self.pool.pool_id(),
            draw_type.name(),
            self.pool.total_draws(),
            self.pool.pity_counter(),
            self.wallet.balance()
        );
        Ok(batch)
    }

    fn simulate_and_commit(&mut self, draw_type: DrawType) -> GachaResult<BatchResult> {
        let batch = BatchSimulator::simulate_action(&self.pool, draw_type, &mut self.rng)?;
        self.gateway.commit(&batch.snapshot())?;
        Ok(batch)
    }
}

impl GachaMachine<GachaStore> {
    /// Load the pool for `activity` from the store and wire a machine
    /// around it, using the activity's RNG slot.
    pub fn open(
        activity: &ActivityConfig,
        rng_bank: &RngBank,
        config:   MachineConfig,
        store:    GachaStore,
    ) -> GachaResult<Self> {
        let pool = store.load_pool(activity)?;
        let rng = rng_bank.for_pool(&activity.pool_id, activity.slot);
        Ok(Self::new(pool, rng, config, store))
    }
}
