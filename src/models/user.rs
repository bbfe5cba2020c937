//! User record held by the registry.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::privacy::{PrivacySettings, Relationship};
use crate::models::reward::{Badge, Redemption};
use crate::models::social::RouteEntry;

/// Stable user identifier supplied by the external identity layer.
pub type UserId = String;

/// Daily totals of one walk metric, keyed by calendar date.
pub type DailyLog<T> = BTreeMap<NaiveDate, T>;

/// Preferred time of day for walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum ActivityWindow {
    #[default]
    Mornings,
    Lunch,
    Evenings,
    Weekends,
}

/// Fields written by an explicit profile save.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 80))]
    pub display_name: String,
    #[serde(default)]
    #[validate(length(max = 80))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 120))]
    pub organization: String,
    #[serde(default)]
    pub activity_window: ActivityWindow,
}

/// Cosmetic inventory. Never read by any scoring rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collectibles {
    pub coins: u64,
    pub items: BTreeSet<String>,
}

/// A walker and everything the engine knows about them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub city: String,
    pub organization: String,
    pub activity_window: ActivityWindow,
    /// Current team (one at a time)
    pub team: Option<String>,
    pub points: u64,

    // ─── Activity Logs ───────────────────────────────────────────
    /// Timestamp of every recorded walk (append-only)
    pub walk_times: Vec<NaiveDateTime>,
    pub minutes_log: DailyLog<u64>,
    pub steps_log: DailyLog<u64>,
    pub miles_log: DailyLog<f64>,
    pub calories_log: DailyLog<f64>,
    /// Last mood reported per day
    pub mood_log: DailyLog<String>,
    /// Photos shared alongside walks, per day
    pub photo_share_log: DailyLog<u32>,
    /// Friend invites sent, per day
    pub invite_log: DailyLog<u32>,
    pub routes: Vec<RouteEntry>,

    // ─── Progression ─────────────────────────────────────────────
    pub badges: BTreeSet<Badge>,
    pub avatar_tier: u8,
    pub redemptions: Vec<Redemption>,
    pub collectibles: Collectibles,

    // ─── Social ──────────────────────────────────────────────────
    pub buddies: BTreeSet<UserId>,
    pub privacy: PrivacySettings,

    /// Registration order, used for stable leaderboard ties
    pub seq: u64,
}

impl User {
    pub fn new(id: &str, display_name: Option<&str>, seq: u64) -> Self {
        let display_name = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(id)
            .to_string();
        Self {
            id: id.to_string(),
            display_name,
            city: String::new(),
            organization: String::new(),
            activity_window: ActivityWindow::default(),
            team: None,
            points: 0,
            walk_times: Vec::new(),
            minutes_log: DailyLog::new(),
            steps_log: DailyLog::new(),
            miles_log: DailyLog::new(),
            calories_log: DailyLog::new(),
            mood_log: DailyLog::new(),
            photo_share_log: DailyLog::new(),
            invite_log: DailyLog::new(),
            routes: Vec::new(),
            badges: BTreeSet::new(),
            avatar_tier: 1,
            redemptions: Vec::new(),
            collectibles: Collectibles::default(),
            buddies: BTreeSet::new(),
            privacy: PrivacySettings::default(),
            seq,
        }
    }

    pub fn total_walks(&self) -> usize {
        self.walk_times.len()
    }

    pub fn lifetime_miles(&self) -> f64 {
        self.miles_log.values().sum()
    }

    /// Distinct calendar dates with at least one walk.
    pub fn walk_dates(&self) -> BTreeSet<NaiveDate> {
        self.walk_times.iter().map(|t| t.date()).collect()
    }

    pub fn walks_on(&self, date: NaiveDate) -> u64 {
        self.walk_times.iter().filter(|t| t.date() == date).count() as u64
    }

    pub fn steps_on(&self, date: NaiveDate) -> u64 {
        self.steps_log.get(&date).copied().unwrap_or(0)
    }

    pub fn minutes_on(&self, date: NaiveDate) -> u64 {
        self.minutes_log.get(&date).copied().unwrap_or(0)
    }

    pub fn miles_on(&self, date: NaiveDate) -> f64 {
        self.miles_log.get(&date).copied().unwrap_or(0.0)
    }

    pub fn miles_between(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        if start > end {
            return 0.0;
        }
        self.miles_log.range(start..=end).map(|(_, m)| *m).sum()
    }

    pub fn is_teammate_of(&self, other: &User) -> bool {
        matches!((&self.team, &other.team), (Some(a), Some(b)) if a == b)
    }

    /// How `viewer` relates to this user, for audience checks.
    pub fn relationship_to(&self, viewer: &User) -> Relationship {
        Relationship {
            is_self: self.id == viewer.id,
            is_buddy: self.buddies.contains(&viewer.id),
            is_teammate: self.is_teammate_of(viewer),
        }
    }

    /// Name shown on leaderboards: alias, else "First L.", else the raw name.
    pub fn leaderboard_name(&self) -> String {
        let alias = self.privacy.leaderboard_alias.trim();
        if !alias.is_empty() {
            return alias.to_string();
        }
        let mut tokens = self.display_name.split_whitespace();
        match (tokens.next(), tokens.next().and_then(|last| last.chars().next())) {
            (Some(first), Some(initial)) => format!("{} {}.", first, initial),
            _ => self.display_name.clone(),
        }
    }
}
