//! # levelup
//!
//! A single-user gamification dashboard: XP across four life categories,
//! a daily objectives list that resets at UK midnight, and a local Pomodoro
//! timer.
//!
//! - [`db`] — PostgreSQL persistence for the XP record and objectives
//! - [`dashboard`] — Axum HTTP API over [`db`]
//! - [`client`] — cached API client used by the terminal front-end
//! - [`progression`] — levels, ranks and stat cards derived from XP
//! - [`pomodoro`] — the countdown timer state machine
//! - [`clock`] — UK day boundaries

pub mod client;
pub mod clock;
pub mod dashboard;
pub mod db;
pub mod pomodoro;
pub mod progression;
pub mod prom_metrics;
