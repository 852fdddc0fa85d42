//! Store methods for pool counters and obtained counts.

use crate::{
    error::GachaResult,
    pool::StreakCounters,
    snapshot::PoolSnapshot,
    types::{DrawCount, ItemId},
};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

use super::GachaStore;

/// Counters persisted alongside a pool's obtained counts.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoolState {
    pub pity_counter: u32,
    pub total_draws:  DrawCount,
    pub streaks:      StreakCounters,
}

impl GachaStore {
    pub fn pool_state(&self, pool_id: &str) -> GachaResult<Option<StoredPoolState>> {
        let state = self
            .conn
            .query_row(
                "SELECT pity_counter, total_draws, streak_rare, streak_epic, streak_legendary
                 FROM pool_state WHERE pool_id = ?1",
                params![pool_id],
                |row| {
                    Ok(StoredPoolState {
                        pity_counter: row.get::<_, i64>(0)? as u32,
                        total_draws:  row.get::<_, i64>(1)? as u64,
                        streaks: StreakCounters {
                            rare:      row.get::<_, i64>(2)? as u32,
                            epic:      row.get::<_, i64>(3)? as u32,
                            legendary: row.get::<_, i64>(4)? as u32,
                        },
                    })
                },
            )
            .optional()?;
        Ok(state)
    }

    pub fn obtained_counts(&self, pool_id: &str) -> GachaResult<HashMap<ItemId, u32>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, obtained FROM pool_item WHERE pool_id = ?1",
        )?;
        let counts = stmt
            .query_map(params![pool_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u32))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(counts)
    }

    // ── Transaction helpers (called from commit_snapshot) ─────────

    pub(super) fn upsert_pool_state(conn: &Connection, snapshot: &PoolSnapshot) -> GachaResult<()> {
        conn.execute(
            "INSERT INTO pool_state
                (pool_id, pity_counter, total_draws, streak_rare, streak_epic, streak_legendary, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(pool_id) DO UPDATE SET
                pity_counter     = excluded.pity_counter,
                total_draws      = excluded.total_draws,
                streak_rare      = excluded.streak_rare,
                streak_epic      = excluded.streak_epic,
                streak_legendary = excluded.streak_legendary,
                updated_at       = excluded.updated_at",
            params![
                snapshot.pool_id,
                snapshot.pity_counter as i64,
                snapshot.total_draws as i64,
                snapshot.streaks.rare as i64,
                snapshot.streaks.epic as i64,
                snapshot.streaks.legendary as i64,
                snapshot.committed_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub(super) fn upsert_items(conn: &Connection, snapshot: &PoolSnapshot) -> GachaResult<()> {
        let mut stmt = conn.prepare(
            "INSERT INTO pool_item (pool_id, item_id, obtained) VALUES (?1, ?2, ?3)
             ON CONFLICT(pool_id, item_id) DO UPDATE SET obtained = excluded.obtained",
        )?;
        for item in &snapshot.items {
            stmt.execute(params![snapshot.pool_id, item.id, item.obtained as i64])?;
        }
        Ok(())
    }

    pub(super) fn insert_commit(conn: &Connection, snapshot: &PoolSnapshot) -> GachaResult<()> {
        conn.execute(
            "INSERT INTO commit_log
                (commit_id, pool_id, draw_type, draw_count, currency_yield, total_draws, committed_at, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                snapshot.commit_id,
                snapshot.pool_id,
                snapshot.draw_type.map(|t| t.name()),
                snapshot.appended_history.len() as i64,
                snapshot.currency_yield as i64,
                snapshot.total_draws as i64,
                snapshot.committed_at.to_rfc3339(),
                serde_json::to_string(snapshot)?,
            ],
        )?;
        Ok(())
    }
}
