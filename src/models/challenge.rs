// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge definitions, recurrence periods and per-user progress state.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::weekend_saturday;

/// How often a challenge resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Weekend,
    Monthly,
}

impl Period {
    /// Key identifying the period instance containing `date`.
    ///
    /// Daily keys are the ISO date, weekly keys the ISO year and week,
    /// weekend keys the weekend's Saturday and monthly keys year-month.
    pub fn key(self, date: NaiveDate) -> String {
        match self {
            Period::Daily => date.format("%Y-%m-%d").to_string(),
            Period::Weekly => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Period::Weekend => format!("{}-weekend", weekend_saturday(date).format("%Y-%m-%d")),
            Period::Monthly => date.format("%Y-%m").to_string(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Weekend => "weekend",
            Period::Monthly => "monthly",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "weekend" => Ok(Period::Weekend),
            "monthly" => Ok(Period::Monthly),
            other => Err(format!("unknown period '{}'", other)),
        }
    }
}

/// Quantity a user-defined challenge measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Steps,
    Minutes,
    Miles,
    Walks,
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "steps" => Ok(Metric::Steps),
            "minutes" => Ok(Metric::Minutes),
            "miles" => Ok(Metric::Miles),
            "walks" | "walk_count" => Ok(Metric::Walks),
            other => Err(format!("unknown metric '{}'", other)),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Metric::Steps => "steps",
            Metric::Minutes => "minutes",
            Metric::Miles => "miles",
            Metric::Walks => "walks",
        };
        f.write_str(s)
    }
}

/// Whose activity counts toward a user-defined challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum ChallengeScope {
    #[default]
    Individual,
    Team,
}

impl FromStr for ChallengeScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "individual" | "personal" => Ok(ChallengeScope::Individual),
            "team" => Ok(ChallengeScope::Team),
            other => Err(format!("unknown scope '{}'", other)),
        }
    }
}

/// What a challenge asks for. One evaluator exists per variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Today's steps reach the target.
    DailySteps { target: u64 },
    /// Miles over the weekend's Saturday and Sunday reach the target.
    WeekendDistance { target_miles: f64 },
    /// Photos shared with walks this ISO week reach the target.
    WeeklyPhotoShare { target: u32 },
    /// Invites sent this month reach the target.
    MonthlyInvites { target: u32 },
    /// Combined team miles this ISO week reach the target.
    TeamWeeklyDistance { target_miles: f64 },
    /// Every team member walks the target this ISO week.
    TeamRelayWeekly { target_miles: f64 },
    /// Distinct route names logged this month reach the target.
    MonthlyDistinctRoutes { target: u32 },
    /// User-defined metric total over the challenge period.
    Custom {
        scope: ChallengeScope,
        metric: Metric,
        target: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: ChallengeKind,
    pub period: Period,
    pub reward_points: u64,
    /// Author of a user-defined challenge; `None` for the built-in catalog
    pub created_by: Option<String>,
}

impl Challenge {
    pub fn is_builtin(&self) -> bool {
        self.created_by.is_none()
    }
}

/// Progress of one user on one challenge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserChallengeState {
    pub joined: bool,
    pub completed: bool,
    /// Period key at which `completed` was last cleared
    pub last_reset: Option<String>,
    pub completed_at: Option<NaiveDateTime>,
}

impl UserChallengeState {
    /// Clear progress if the period key has moved on. Returns true when a
    /// reset happened.
    pub fn roll_over(&mut self, current_key: &str) -> bool {
        if self.last_reset.as_deref() == Some(current_key) {
            return false;
        }
        let had_previous = self.last_reset.is_some();
        self.last_reset = Some(current_key.to_string());
        self.completed = false;
        self.completed_at = None;
        had_previous
    }
}

fn builtin(
    id: &str,
    name: &str,
    description: &str,
    kind: ChallengeKind,
    period: Period,
    reward_points: u64,
) -> Challenge {
    Challenge {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        kind,
        period,
        reward_points,
        created_by: None,
    }
}

/// The immutable built-in challenge catalog.
pub fn builtin_challenges() -> Vec<Challenge> {
    vec![
        builtin(
            "daily_5000",
            "Daily Step Goal",
            "Hit 5,000 steps today",
            ChallengeKind::DailySteps { target: 5000 },
            Period::Daily,
            50,
        ),
        builtin(
            "weekend_walkathon",
            "Weekend Walkathon",
            "Walk 10 miles Sat–Sun",
            ChallengeKind::WeekendDistance { target_miles: 10.0 },
            Period::Weekend,
            150,
        ),
        builtin(
            "photo_share",
            "Photo Challenge",
            "Share a scenic walk photo this week",
            ChallengeKind::WeeklyPhotoShare { target: 1 },
            Period::Weekly,
            20,
        ),
        builtin(
            "invite_3",
            "Invite Challenge",
            "Invite 3 friends this month",
            ChallengeKind::MonthlyInvites { target: 3 },
            Period::Monthly,
            100,
        ),
        builtin(
            "team_100_miles",
            "Team Mileage Goal",
            "Teams aim for 100 miles combined this week",
            ChallengeKind::TeamWeeklyDistance {
                target_miles: 100.0,
            },
            Period::Weekly,
            300,
        ),
        builtin(
            "relay_pass_baton",
            "Relay Challenge",
            "Each member walks 2 miles this week",
            ChallengeKind::TeamRelayWeekly { target_miles: 2.0 },
            Period::Weekly,
            200,
        ),
        builtin(
            "city_explorer",
            "City Explorer",
            "Walk 5 distinct neighborhoods this month",
            ChallengeKind::MonthlyDistinctRoutes { target: 5 },
            Period::Monthly,
            120,
        ),
    ]
}
