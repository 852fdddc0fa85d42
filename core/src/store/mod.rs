//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! The engine hands snapshots to the PersistenceGateway impl below.
//! It never executes SQL directly.

use crate::{
    config::ActivityConfig,
    error::GachaResult,
    gateway::PersistenceGateway,
    pool::RewardPool,
    snapshot::PoolSnapshot,
};
mod history;
mod pool;
use rusqlite::Connection;

pub use pool::StoredPoolState;

pub struct GachaStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl GachaStore {
    pub fn open(path: &str) -> GachaResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GachaResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// File path backing this store, None for in-memory.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GachaResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_history.sql"))?;
        Ok(())
    }

    /// Rebuild a pool from its catalog plus whatever this store has
    /// persisted for it. A pool never committed before starts fresh.
    pub fn load_pool(&self, activity: &ActivityConfig) -> GachaResult<RewardPool> {
        let obtained = self.obtained_counts(&activity.pool_id)?;
        let pool = RewardPool::from_activity(activity, &obtained)?;
        let pool = match self.pool_state(&activity.pool_id)? {
            Some(state) => pool.with_counters(state.pity_counter, state.total_draws, state.streaks),
            None => pool,
        };
        log::debug!(
            "Loaded pool {} (pity={}, total_draws={})",
            pool.pool_id(),
            pool.pity_counter(),
            pool.total_draws()
        );
        Ok(pool)
    }

    /// Apply a snapshot inside a single transaction.
    pub fn commit_snapshot(&self, snapshot: &PoolSnapshot) -> GachaResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        Self::upsert_pool_state(&tx, snapshot)?;
        Self::insert_commit(&tx, snapshot)?;
        Self::upsert_items(&tx, snapshot)?;
        Self::append_history(&tx, snapshot)?;
        tx.commit()?;
        log::debug!(
            "Committed {} for pool {} at total_draws={}",
            snapshot.commit_id,
            snapshot.pool_id,
            snapshot.total_draws
        );
        Ok(())
    }

    /// The most recent snapshot committed for a pool, if any.
    pub fn latest_snapshot(&self, pool_id: &str) -> GachaResult<Option<PoolSnapshot>> {
        use rusqlite::OptionalExtension;
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM commit_log WHERE pool_id = ?1
                 ORDER BY total_draws DESC LIMIT 1",
                rusqlite::params![pool_id],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl PersistenceGateway for GachaStore {
    fn commit(&mut self, snapshot: &PoolSnapshot) -> GachaResult<()> {
        self.commit_snapshot(snapshot)
    }
}
