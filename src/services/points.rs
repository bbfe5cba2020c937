// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Walk recording, point awards and streaks.
//!
//! Recording a walk is the main write path: it appends to the activity
//! logs, credits points, refreshes progression and then re-evaluates the
//! user's joined challenges. Invites and route logs live here too since
//! they feed the same logs and point balance.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use validator::{Validate, ValidationError};

use crate::config::PointRules;
use crate::db::Registry;
use crate::error::{AppError, Result};
use crate::models::social::Invite;
use crate::models::user::DailyLog;
use crate::models::{Audience, Badge, RankTier, RouteEntry};
use crate::services::challenges::{ChallengeCompletion, ChallengeEngine};
use crate::services::collectibles::CollectibleDropper;
use crate::services::progression;
use crate::time_utils::{week_dates, Clock};

const STREAK_7_DAYS: u32 = 7;
const STREAK_30_DAYS: u32 = 30;

/// Consecutive walking days ending today.
///
/// Walks distinct dates newest first, counting while each date is exactly
/// `today - count`. Zero if there was no walk today.
pub fn calc_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0u32;
    for date in dates.iter().rev() {
        let expected = today - Duration::days(i64::from(streak));
        if *date == expected {
            streak += 1;
        } else if *date < expected {
            break;
        }
    }
    streak
}

fn finite_non_negative(value: f64) -> std::result::Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("finite_non_negative"))
    }
}

fn finite_positive(value: f64) -> std::result::Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("finite_positive"))
    }
}

fn add_to_log(log: &mut DailyLog<u64>, date: NaiveDate, amount: u64) {
    let total = log.entry(date).or_insert(0);
    *total = total.saturating_add(amount);
}

/// One walk as reported by the client.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct WalkInput {
    #[validate(range(min = 1, max = 1440))]
    pub minutes: u64,
    #[serde(default)]
    #[validate(range(max = 200000))]
    pub steps: u64,
    #[serde(default)]
    #[validate(custom(function = "finite_non_negative"))]
    pub miles: f64,
    #[serde(default)]
    #[validate(custom(function = "finite_non_negative"))]
    pub calories: f64,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub shared_photo: bool,
    #[serde(default)]
    #[validate(length(max = 40))]
    pub mood: Option<String>,
}

/// What a recorded walk earned.
#[derive(Debug, Clone, Serialize)]
pub struct WalkOutcome {
    pub points_gained: u64,
    /// Balance right after the walk's own points
    pub total_points: u64,
    pub streak: u32,
    pub new_badges: Vec<Badge>,
    pub avatar_tier: u8,
    pub coins_found: Option<u64>,
    pub completed_challenges: Vec<ChallengeCompletion>,
}

/// Today's totals and progression, for the home screen.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub display_name: String,
    pub points: u64,
    pub tier: RankTier,
    pub streak: u32,
    pub steps_today: u64,
    pub minutes_today: u64,
    pub miles_today: f64,
    pub walks_today: u64,
    pub mood_today: Option<String>,
    pub steps_week: u64,
    pub total_walks: usize,
    pub lifetime_miles: f64,
    pub avatar_tier: u8,
    pub badges: Vec<&'static str>,
    pub first_walks_progress: f64,
    pub team: Option<String>,
    pub coins: u64,
}

/// Request body for logging a named route.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRoute {
    /// Blank names are rejected after trimming
    #[validate(length(max = 80))]
    pub name: String,
    #[validate(custom(function = "finite_positive"))]
    pub distance_km: f64,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: String,
    pub audience: Option<Audience>,
}

#[derive(Clone)]
pub struct PointsEngine {
    registry: Registry,
    clock: Arc<dyn Clock>,
    rules: PointRules,
    challenges: ChallengeEngine,
    collectibles: CollectibleDropper,
}

impl PointsEngine {
    pub fn new(
        registry: Registry,
        clock: Arc<dyn Clock>,
        rules: PointRules,
        challenges: ChallengeEngine,
        collectibles: CollectibleDropper,
    ) -> Self {
        Self {
            registry,
            clock,
            rules,
            challenges,
            collectibles,
        }
    }

    /// Record one walk for `user_id`, creating the user if needed.
    pub async fn record_walk(&self, user_id: &str, input: &WalkInput) -> Result<WalkOutcome> {
        input.validate()?;

        let now = self.clock.now();
        let today = now.date();
        let handle = self.registry.get_or_create_user(user_id, None);

        let mut outcome = {
            let mut user = handle.lock().await;

            let mut gained = input.minutes.saturating_mul(self.rules.base_per_minute);
            if input.is_group {
                gained = gained.saturating_add(self.rules.group_walk_bonus);
            }
            if input.shared_photo {
                gained = gained.saturating_add(self.rules.photo_share_bonus);
            }

            user.walk_times.push(now);
            add_to_log(&mut user.minutes_log, today, input.minutes);
            add_to_log(&mut user.steps_log, today, input.steps);
            *user.miles_log.entry(today).or_insert(0.0) += input.miles;
            *user.calories_log.entry(today).or_insert(0.0) += input.calories;
            if input.shared_photo {
                let shared = user.photo_share_log.entry(today).or_insert(0);
                *shared = shared.saturating_add(1);
            }

            let streak = calc_streak(&user.walk_dates(), today);
            if streak >= STREAK_30_DAYS {
                gained = gained.saturating_add(self.rules.streak_30_bonus);
            } else if streak >= STREAK_7_DAYS {
                gained = gained.saturating_add(self.rules.streak_7_bonus);
            }
            user.points = user.points.saturating_add(gained);

            if let Some(mood) = input.mood.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
                user.mood_log.insert(today, mood.to_string());
            }

            let new_badges = progression::refresh(&mut user, streak);
            let coins_found = self.collectibles.walk_drop(&mut user.collectibles).await;

            tracing::info!(
                user_id,
                minutes = input.minutes,
                miles = input.miles,
                gained,
                total = user.points,
                streak,
                "Walk recorded"
            );

            WalkOutcome {
                points_gained: gained,
                total_points: user.points,
                streak,
                new_badges,
                avatar_tier: user.avatar_tier,
                coins_found,
                completed_challenges: Vec::new(),
            }
        };

        outcome.completed_challenges = self.challenges.evaluate_joined(user_id).await?;
        Ok(outcome)
    }

    /// Current streak without recording anything.
    pub async fn streak(&self, user_id: &str) -> u32 {
        match self.registry.user_snapshot(user_id).await {
            Some(user) => calc_streak(&user.walk_dates(), self.clock.today()),
            None => 0,
        }
    }

    pub async fn dashboard(&self, user_id: &str) -> Result<Dashboard> {
        let handle = self.registry.get_or_create_user(user_id, None);
        let user = handle.lock().await.clone();
        let today = self.clock.today();

        Ok(Dashboard {
            display_name: user.display_name.clone(),
            points: user.points,
            tier: RankTier::for_points(user.points),
            streak: calc_streak(&user.walk_dates(), today),
            steps_today: user.steps_on(today),
            minutes_today: user.minutes_on(today),
            miles_today: user.miles_on(today),
            walks_today: user.walks_on(today),
            mood_today: user.mood_log.get(&today).cloned(),
            steps_week: week_dates(today).into_iter().map(|d| user.steps_on(d)).sum(),
            total_walks: user.total_walks(),
            lifetime_miles: user.lifetime_miles(),
            avatar_tier: user.avatar_tier,
            badges: user.badges.iter().map(Badge::label).collect(),
            first_walks_progress: progression::first_walks_progress(user.total_walks()),
            team: user.team.clone(),
            coins: user.collectibles.coins,
        })
    }

    /// Record a friend invite and pay the invite bonus. Returns the new
    /// point balance.
    pub async fn invite_friend(&self, user_id: &str, email: &str) -> Result<u64> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("a valid email is required".to_string()));
        }

        let now = self.clock.now();
        let handle = self.registry.get_or_create_user(user_id, None);
        let total = {
            let mut user = handle.lock().await;
            user.points = user.points.saturating_add(self.rules.invite_bonus);
            let sent = user.invite_log.entry(now.date()).or_insert(0);
            *sent = sent.saturating_add(1);
            user.points
        };
        self.registry
            .add_invite(Invite {
                inviter: user_id.to_string(),
                email: email.to_string(),
                sent_at: now,
            })
            .await;

        tracing::info!(user_id, total, "Invite sent");
        self.challenges.evaluate_joined(user_id).await?;
        Ok(total)
    }

    /// Log a named route walked today.
    pub async fn add_route(&self, user_id: &str, route: &NewRoute) -> Result<RouteEntry> {
        route.validate()?;
        let name = route.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("route name must not be empty".to_string()));
        }

        let handle = self.registry.get_or_create_user(user_id, None);
        let entry = {
            let mut user = handle.lock().await;
            let entry = RouteEntry {
                name: name.to_string(),
                distance_km: route.distance_km,
                notes: route.notes.trim().to_string(),
                audience: route
                    .audience
                    .unwrap_or(user.privacy.default_route_audience),
                date: self.clock.today(),
            };
            user.routes.push(entry.clone());
            entry
        };

        tracing::info!(user_id, route = %entry.name, "Route logged");
        self.challenges.evaluate_joined(user_id).await?;
        Ok(entry)
    }
}
