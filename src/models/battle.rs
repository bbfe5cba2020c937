// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team battle records and scoring results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A head-to-head mileage contest between two teams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub id: u64,
    pub name: String,
    pub home_team: String,
    pub away_team: String,
    pub start: NaiveDate,
    /// Inclusive
    pub end: NaiveDate,
    pub reward_points: u64,
    /// Set once the pool has been paid out
    pub winner_awarded: bool,
}

/// Current standing of a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct BattleScore {
    pub home_miles: f64,
    pub away_miles: f64,
    /// `None` on a tie
    pub winner: Option<String>,
}

/// What `award_battle` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AwardOutcome {
    Awarded {
        team: String,
        per_member: u64,
        members: Vec<String>,
    },
    AlreadyAwarded,
    NoWinner,
}
