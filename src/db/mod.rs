//! # Database — PostgreSQL Storage Layer
//!
//! Async persistence for the XP record and daily objectives via `sqlx::PgPool`.
//! A [`Database`] is built once at startup and handed to the HTTP layer; there
//! is no process-wide connection.
//!
//! ## Schema
//!
//! - `stats`: a single row (id pinned to 1) holding XP per category
//! - `objectives`: text, completed flag, created_at
//!
//! ## Module Structure
//!
//! - [`stats`] — upsert-on-read and clamped XP updates
//! - [`objectives`] — today's listing, create, toggle, prune
//!
//! Each operation is a single SQL statement, so correctness rests on
//! PostgreSQL's per-statement atomicity and no explicit transactions are used.

mod objectives;
mod stats;

use crate::progression::{Category, StatCard};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

// ── Stats types ─────────────────────────────────────────────────

/// The singleton XP record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Stats {
    pub id: i32,
    #[serde(rename = "healthXP")]
    pub health_xp: i32,
    #[serde(rename = "financeXP")]
    pub finance_xp: i32,
    #[serde(rename = "deenXP")]
    pub deen_xp: i32,
    #[serde(rename = "intellectXP")]
    pub intellect_xp: i32,
}

impl Stats {
    pub fn xp(&self, category: Category) -> i32 {
        match category {
            Category::Health => self.health_xp,
            Category::Finance => self.finance_xp,
            Category::Deen => self.deen_xp,
            Category::Intellect => self.intellect_xp,
        }
    }

    /// One card per category, in display order.
    pub fn cards(&self) -> Vec<StatCard> {
        Category::ALL
            .iter()
            .map(|&c| StatCard::new(c, self.xp(c)))
            .collect()
    }
}

/// Partial XP update. Absent fields keep their stored value; a present field
/// must be an integer (`null` is rejected, not treated as absent).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsUpdate {
    #[serde(
        rename = "healthXP",
        default,
        deserialize_with = "integer_if_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub health_xp: Option<i32>,
    #[serde(
        rename = "financeXP",
        default,
        deserialize_with = "integer_if_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub finance_xp: Option<i32>,
    #[serde(
        rename = "deenXP",
        default,
        deserialize_with = "integer_if_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub deen_xp: Option<i32>,
    #[serde(
        rename = "intellectXP",
        default,
        deserialize_with = "integer_if_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub intellect_xp: Option<i32>,
}

/// Only called for keys present in the input; missing keys fall back to
/// `default`, so `None` can only come from omission.
fn integer_if_present<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    i32::deserialize(deserializer).map(Some)
}

impl StatsUpdate {
    /// Update that sets a single category.
    pub fn single(category: Category, xp: i32) -> Self {
        let mut update = StatsUpdate::default();
        update.set(category, xp);
        update
    }

    pub fn set(&mut self, category: Category, xp: i32) {
        let slot = match category {
            Category::Health => &mut self.health_xp,
            Category::Finance => &mut self.finance_xp,
            Category::Deen => &mut self.deen_xp,
            Category::Intellect => &mut self.intellect_xp,
        };
        *slot = Some(xp);
    }

    /// Every present field raised to at least zero. There is no upper bound.
    pub fn clamped(&self) -> Self {
        let clamp = |v: Option<i32>| v.map(|x| x.max(0));
        StatsUpdate {
            health_xp: clamp(self.health_xp),
            finance_xp: clamp(self.finance_xp),
            deen_xp: clamp(self.deen_xp),
            intellect_xp: clamp(self.intellect_xp),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.health_xp.is_none()
            && self.finance_xp.is_none()
            && self.deen_xp.is_none()
            && self.intellect_xp.is_none()
    }
}

// ── Objective types ─────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: i32,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

// ── Migrations ──────────────────────────────────────────────────

/// Embedded schema, applied in order. Every statement is idempotent.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_create_stats",
        include_str!("../../migrations/001_create_stats.sql"),
    ),
    (
        "002_create_objectives",
        include_str!("../../migrations/002_create_objectives.sql"),
    ),
];

// ── Database struct and connection ──────────────────────────────

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL using the provided database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let opts: PgConnectOptions = database_url
            .parse()
            .context("invalid DATABASE_URL")?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .context("failed to connect to PostgreSQL")?;
        Ok(Database { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create any missing tables and indexes.
    pub async fn migrate(&self) -> Result<()> {
        for (name, sql) in MIGRATIONS {
            sqlx::raw_sql(sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("migration {} failed", name))?;
            info!(migration = name, "schema migration applied");
        }
        Ok(())
    }

    /// Health check: execute `SELECT 1` to verify database connectivity.
    ///
    /// Used by the `/readyz` probe.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────
