//! Store methods for the append-only draw history.

use crate::{
    error::{GachaError, GachaResult},
    snapshot::{HistoryEntry, PoolSnapshot},
    types::Rarity,
};
use rusqlite::{params, Connection};

use super::GachaStore;

impl GachaStore {
    pub(super) fn append_history(conn: &Connection, snapshot: &PoolSnapshot) -> GachaResult<()> {
        Self::insert_entries(conn, "draw_history", snapshot, &snapshot.appended_history)?;
        Self::insert_entries(conn, "rare_history", snapshot, &snapshot.appended_rare_history)?;
        Ok(())
    }

    fn insert_entries(
        conn:     &Connection,
        table:    &str,
        snapshot: &PoolSnapshot,
        entries:  &[HistoryEntry],
    ) -> GachaResult<()> {
        let mut stmt = conn.prepare(&format!(
            "INSERT INTO {table}
                (pool_id, commit_id, draw_number, item_id, display_name, rarity, pity_triggered)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ))?;
        for entry in entries {
            stmt.execute(params![
                snapshot.pool_id,
                snapshot.commit_id,
                entry.draw_number as i64,
                entry.item_id,
                entry.display_name,
                entry.rarity.name(),
                entry.is_pity_triggered,
            ])?;
        }
        Ok(())
    }

    /// Full draw history for a pool, oldest first.
    pub fn history(&self, pool_id: &str) -> GachaResult<Vec<HistoryEntry>> {
        self.read_entries("draw_history", pool_id)
    }

    /// Epic/Legendary history for a pool, oldest first.
    pub fn rare_history(&self, pool_id: &str) -> GachaResult<Vec<HistoryEntry>> {
        self.read_entries("rare_history", pool_id)
    }

    fn read_entries(&self, table: &str, pool_id: &str) -> GachaResult<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT draw_number, item_id, display_name, rarity, pity_triggered
             FROM {table} WHERE pool_id = ?1
             ORDER BY draw_number ASC, id ASC"
        ))?;
        let rows = stmt
            .query_map(params![pool_id], |row| {
                Ok((
                    row.get::<_, i64>(0)? as u64,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(draw_number, item_id, display_name, rarity, is_pity_triggered)| {
                let rarity = Rarity::parse(&rarity).ok_or_else(|| GachaError::InvalidItem {
                    id:     item_id.clone(),
                    reason: format!("unknown rarity '{rarity}' in {table}"),
                })?;
                Ok(HistoryEntry {
                    draw_number,
                    item_id,
                    display_name,
                    rarity,
                    is_pity_triggered,
                })
            })
            .collect()
    }

    // ── Test / summary helpers ────────────────────────────────────────

    /// Number of committed batches for a pool.
    pub fn commit_count(&self, pool_id: &str) -> GachaResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM commit_log WHERE pool_id = ?1",
            params![pool_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of pity-forced draws recorded for a pool.
    pub fn pity_trigger_count(&self, pool_id: &str) -> GachaResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM draw_history WHERE pool_id = ?1 AND pity_triggered = 1",
            params![pool_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
