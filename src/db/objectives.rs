//! Daily objective operations — today's listing, create, toggle, prune.
//!
//! "Today" starts at the most recent UK midnight (see [`crate::clock`]). The
//! boundary is recomputed per call; the `*_since`/`*_before` variants take it
//! explicitly so callers and tests can pin a specific instant.

use super::{Database, Objective};
use crate::clock;
use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};

impl Database {
    /// Objectives created since the start of the current UK day, oldest first.
    pub async fn get_objectives(&self) -> Result<Vec<Objective>> {
        self.get_objectives_since(clock::today_uk_midnight()).await
    }

    /// Objectives with `created_at >= since`, oldest first.
    pub async fn get_objectives_since(&self, since: DateTime<Utc>) -> Result<Vec<Objective>> {
        let rows = sqlx::query_as::<_, Objective>(
            "SELECT id, text, completed, created_at
             FROM objectives WHERE created_at >= $1
             ORDER BY created_at, id",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a new, uncompleted objective. Surrounding whitespace is trimmed.
    pub async fn create_objective(&self, text: &str) -> Result<Objective> {
        let text = text.trim();
        ensure!(!text.is_empty(), "objective text must not be empty");
        let row = sqlx::query_as::<_, Objective>(
            "INSERT INTO objectives (text) VALUES ($1)
             RETURNING id, text, completed, created_at",
        )
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Flip `completed` on one objective.
    ///
    /// Returns `Ok(None)` when no objective has this id; nothing is modified.
    pub async fn toggle_objective(&self, id: i32) -> Result<Option<Objective>> {
        let row = sqlx::query_as::<_, Objective>(
            "UPDATE objectives SET completed = NOT completed WHERE id = $1
             RETURNING id, text, completed, created_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete objectives from before the current UK day. Returns the count removed.
    pub async fn clear_old_objectives(&self) -> Result<u64> {
        self.clear_objectives_before(clock::today_uk_midnight()).await
    }

    /// Delete objectives with `created_at < boundary`.
    pub async fn clear_objectives_before(&self, boundary: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM objectives WHERE created_at < $1")
            .bind(boundary)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
