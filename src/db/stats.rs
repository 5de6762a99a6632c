//! XP record operations.
//!
//! The `stats` table holds exactly one row. Both operations here are single
//! `INSERT ... ON CONFLICT (id) DO UPDATE ... RETURNING` statements, so the row
//! is created on first access without a check-then-insert race.

use super::{Database, Stats, StatsUpdate};
use anyhow::Result;
use tracing::debug;

impl Database {
    /// Return the XP record, creating it with every category at zero if absent.
    pub async fn get_stats(&self) -> Result<Stats> {
        let row = sqlx::query_as::<_, Stats>(
            "INSERT INTO stats (id) VALUES (1)
             ON CONFLICT (id) DO UPDATE SET id = stats.id
             RETURNING id, health_xp, finance_xp, deen_xp, intellect_xp",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Apply a partial XP update and return the full record.
    ///
    /// Supplied values are clamped to `max(0, v)`; absent fields keep their
    /// stored value, or start at zero when the row does not exist yet. An
    /// update with no fields is a plain read.
    pub async fn update_stats(&self, update: &StatsUpdate) -> Result<Stats> {
        if update.is_empty() {
            debug!("empty stats update, nothing to write");
            return self.get_stats().await;
        }
        let clamped = update.clamped();
        let row = sqlx::query_as::<_, Stats>(
            "INSERT INTO stats (id, health_xp, finance_xp, deen_xp, intellect_xp)
             VALUES (1, COALESCE($1, 0), COALESCE($2, 0), COALESCE($3, 0), COALESCE($4, 0))
             ON CONFLICT (id) DO UPDATE SET
               health_xp = COALESCE($1, stats.health_xp),
               finance_xp = COALESCE($2, stats.finance_xp),
               deen_xp = COALESCE($3, stats.deen_xp),
               intellect_xp = COALESCE($4, stats.intellect_xp)
             RETURNING id, health_xp, finance_xp, deen_xp, intellect_xp",
        )
        .bind(clamped.health_xp)
        .bind(clamped.finance_xp)
        .bind(clamped.deen_xp)
        .bind(clamped.intellect_xp)
        .fetch_one(&self.pool)
        .await?;
        debug!(
            health_xp = row.health_xp,
            finance_xp = row.finance_xp,
            deen_xp = row.deen_xp,
            intellect_xp = row.intellect_xp,
            "stats updated"
        );
        Ok(row)
    }
}
