// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge participation, periodic reset and completion.
//!
//! Completion is evaluated against the period containing "today". When the
//! period key changes, `completed` is cleared before evaluating, so each
//! challenge pays at most once per period instance.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use validator::Validate;

use crate::db::Registry;
use crate::error::{AppError, Result};
use crate::models::user::DailyLog;
use crate::models::{
    Challenge, ChallengeKind, ChallengeScope, Metric, Period, User, UserChallengeState,
};
use crate::time_utils::{same_month, weekend_dates, Clock};

/// A challenge completed during an evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeCompletion {
    pub challenge_id: String,
    pub reward_points: u64,
}

/// One catalog entry together with the caller's progress on it.
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeStatus {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub joined: bool,
    /// Completed in the current period
    pub completed: bool,
    pub period_key: String,
}

/// Request body for a user-defined challenge.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCustomChallenge {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,
    #[serde(default)]
    pub scope: String,
    pub metric: String,
    pub target_value: f64,
    pub period: String,
    #[serde(default)]
    pub reward_points: i64,
}

/// Whether `date` falls inside the instance of `period` containing `today`.
pub fn in_period(period: Period, today: NaiveDate, date: NaiveDate) -> bool {
    match period {
        Period::Daily => date == today,
        Period::Weekly => date.iso_week() == today.iso_week(),
        Period::Weekend => weekend_dates(today).contains(&date),
        Period::Monthly => same_month(date, today),
    }
}

/// A user's total of `metric` over the current instance of `period`.
pub fn metric_total(user: &User, metric: Metric, period: Period, today: NaiveDate) -> f64 {
    let within = |date: &NaiveDate| in_period(period, today, *date);
    match metric {
        Metric::Steps => user
            .steps_log
            .iter()
            .filter(|(d, _)| within(d))
            .map(|(_, v)| *v as f64)
            .sum(),
        Metric::Minutes => user
            .minutes_log
            .iter()
            .filter(|(d, _)| within(d))
            .map(|(_, v)| *v as f64)
            .sum(),
        Metric::Miles => user
            .miles_log
            .iter()
            .filter(|(d, _)| within(d))
            .map(|(_, v)| *v)
            .sum(),
        Metric::Walks => user
            .walk_times
            .iter()
            .filter(|t| within(&t.date()))
            .count() as f64,
    }
}

fn count_in_period(log: &DailyLog<u32>, period: Period, today: NaiveDate) -> u32 {
    log.iter()
        .filter(|(d, _)| in_period(period, today, **d))
        .map(|(_, v)| *v)
        .sum()
}

fn distinct_routes_in_period(user: &User, period: Period, today: NaiveDate) -> u32 {
    user.routes
        .iter()
        .filter(|r| in_period(period, today, r.date))
        .map(|r| r.name.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect::<BTreeSet<_>>()
        .len() as u32
}

/// Does `user` meet `challenge` today?
///
/// `team` holds snapshots of the user's current teammates (the user
/// included) and is empty when the user has no team; team-scoped
/// challenges never complete for a teamless user.
pub fn is_met(challenge: &Challenge, user: &User, team: &[User], today: NaiveDate) -> bool {
    let period = challenge.period;
    match &challenge.kind {
        ChallengeKind::DailySteps { target } => user.steps_on(today) >= *target,
        ChallengeKind::WeekendDistance { target_miles } => {
            metric_total(user, Metric::Miles, Period::Weekend, today) >= *target_miles
        }
        ChallengeKind::WeeklyPhotoShare { target } => {
            count_in_period(&user.photo_share_log, period, today) >= *target
        }
        ChallengeKind::MonthlyInvites { target } => {
            count_in_period(&user.invite_log, period, today) >= *target
        }
        ChallengeKind::TeamWeeklyDistance { target_miles } => {
            !team.is_empty()
                && team
                    .iter()
                    .map(|m| metric_total(m, Metric::Miles, Period::Weekly, today))
                    .sum::<f64>()
                    >= *target_miles
        }
        ChallengeKind::TeamRelayWeekly { target_miles } => {
            !team.is_empty()
                && team
                    .iter()
                    .all(|m| metric_total(m, Metric::Miles, Period::Weekly, today) >= *target_miles)
        }
        ChallengeKind::MonthlyDistinctRoutes { target } => {
            distinct_routes_in_period(user, period, today) >= *target
        }
        ChallengeKind::Custom {
            scope,
            metric,
            target,
        } => match scope {
            ChallengeScope::Individual => metric_total(user, *metric, period, today) >= *target,
            ChallengeScope::Team => {
                !team.is_empty()
                    && team
                        .iter()
                        .map(|m| metric_total(m, *metric, period, today))
                        .sum::<f64>()
                        >= *target
            }
        },
    }
}

fn needs_team(kind: &ChallengeKind) -> bool {
    matches!(
        kind,
        ChallengeKind::TeamWeeklyDistance { .. }
            | ChallengeKind::TeamRelayWeekly { .. }
            | ChallengeKind::Custom {
                scope: ChallengeScope::Team,
                ..
            }
    )
}

#[derive(Clone)]
pub struct ChallengeEngine {
    registry: Registry,
    clock: Arc<dyn Clock>,
}

impl ChallengeEngine {
    pub fn new(registry: Registry, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Catalog with the user's progress, rolled over to the current period.
    pub async fn list(&self, user_id: &str) -> Vec<ChallengeStatus> {
        let today = self.clock.today();
        let mut statuses = Vec::new();
        for challenge in self.registry.challenges().await {
            let period_key = challenge.period.key(today);
            let (joined, completed) =
                match self.registry.existing_challenge_state(user_id, &challenge.id) {
                    Some(handle) => {
                        let mut state = handle.lock().await;
                        if state.joined {
                            state.roll_over(&period_key);
                        }
                        (state.joined, state.joined && state.completed)
                    }
                    None => (false, false),
                };
            statuses.push(ChallengeStatus {
                joined,
                completed,
                period_key,
                challenge,
            });
        }
        statuses
    }

    pub async fn join(&self, user_id: &str, challenge_id: &str) -> Result<UserChallengeState> {
        let challenge = self.registry.challenge(challenge_id).await?;
        self.registry.get_or_create_user(user_id, None);

        let handle = self.registry.challenge_state(user_id, challenge_id);
        let mut state = handle.lock().await;
        state.roll_over(&challenge.period.key(self.clock.today()));
        state.joined = true;

        tracing::info!(user_id, challenge_id, "Joined challenge");
        Ok(state.clone())
    }

    /// Stop participating. Completion in the current period is kept, so
    /// leaving and rejoining cannot earn the reward twice.
    pub async fn leave(&self, user_id: &str, challenge_id: &str) -> Result<()> {
        self.registry.challenge(challenge_id).await?;
        let Some(handle) = self.registry.existing_challenge_state(user_id, challenge_id) else {
            return Ok(());
        };
        handle.lock().await.joined = false;

        tracing::info!(user_id, challenge_id, "Left challenge");
        Ok(())
    }

    /// Evaluate one joined challenge now. Returns whether it is complete
    /// for the current period; the reward is credited only on the
    /// transition to complete.
    pub async fn check(&self, user_id: &str, challenge_id: &str) -> Result<bool> {
        let challenge = self.registry.challenge(challenge_id).await?;
        let not_joined = || {
            AppError::PolicyDenied(format!("join challenge {} before checking it", challenge_id))
        };
        let handle = self
            .registry
            .existing_challenge_state(user_id, challenge_id)
            .ok_or_else(not_joined)?;
        let mut state = handle.lock().await;
        if !state.joined {
            return Err(not_joined());
        }
        let completion = self.evaluate(user_id, &challenge, &mut state).await?;
        Ok(state.completed || completion.is_some())
    }

    /// Re-evaluate every challenge the user has joined. Called after any
    /// activity that may move challenge progress.
    pub async fn evaluate_joined(&self, user_id: &str) -> Result<Vec<ChallengeCompletion>> {
        let mut completions = Vec::new();
        for challenge_id in self.registry.challenge_ids_for(user_id) {
            let Ok(challenge) = self.registry.challenge(&challenge_id).await else {
                continue;
            };
            let Some(handle) = self.registry.existing_challenge_state(user_id, &challenge_id) else {
                continue;
            };
            let mut state = handle.lock().await;
            if !state.joined {
                continue;
            }
            if let Some(done) = self.evaluate(user_id, &challenge, &mut state).await? {
                completions.push(done);
            }
        }
        Ok(completions)
    }

    /// Roll over, evaluate and credit. Caller holds the state lock.
    async fn evaluate(
        &self,
        user_id: &str,
        challenge: &Challenge,
        state: &mut UserChallengeState,
    ) -> Result<Option<ChallengeCompletion>> {
        let now = self.clock.now();
        let today = now.date();
        if state.roll_over(&challenge.period.key(today)) {
            tracing::debug!(user_id, challenge_id = %challenge.id, "Challenge period rolled over");
        }
        if state.completed {
            return Ok(None);
        }

        let Some(user) = self.registry.user_snapshot(user_id).await else {
            return Ok(None);
        };
        let team = if needs_team(&challenge.kind) {
            self.team_snapshots(&user).await
        } else {
            Vec::new()
        };
        if !is_met(challenge, &user, &team, today) {
            return Ok(None);
        }

        state.completed = true;
        state.completed_at = Some(now);
        let handle = self.registry.require_user(user_id)?;
        let total = {
            let mut user = handle.lock().await;
            user.points = user.points.saturating_add(challenge.reward_points);
            user.points
        };

        tracing::info!(
            user_id,
            challenge_id = %challenge.id,
            reward = challenge.reward_points,
            total,
            "Challenge completed"
        );
        Ok(Some(ChallengeCompletion {
            challenge_id: challenge.id.clone(),
            reward_points: challenge.reward_points,
        }))
    }

    async fn team_snapshots(&self, user: &User) -> Vec<User> {
        let Some(team) = &user.team else {
            return Vec::new();
        };
        let mut members = Vec::new();
        for member_id in self.registry.team_member_ids(team).await {
            if let Some(member) = self.registry.user_snapshot(&member_id).await {
                members.push(member);
            }
        }
        members
    }

    /// Add a user-defined challenge to the shared catalog.
    pub async fn create_custom(
        &self,
        creator_id: &str,
        request: &NewCustomChallenge,
    ) -> Result<Challenge> {
        request.validate()?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("challenge name must not be empty".to_string()));
        }
        let scope: ChallengeScope = request.scope.parse().map_err(AppError::Validation)?;
        let metric: Metric = request.metric.parse().map_err(AppError::Validation)?;
        let period: Period = request.period.parse().map_err(AppError::Validation)?;
        if !request.target_value.is_finite() || request.target_value <= 0.0 {
            return Err(AppError::Validation("target must be positive".to_string()));
        }
        let reward_points = u64::try_from(request.reward_points)
            .map_err(|_| AppError::Validation("reward must not be negative".to_string()))?;

        let challenge = Challenge {
            id: format!("custom_{}", self.registry.next_seq()),
            name: name.to_string(),
            description: request.description.trim().to_string(),
            kind: ChallengeKind::Custom {
                scope,
                metric,
                target: request.target_value,
            },
            period,
            reward_points,
            created_by: Some(creator_id.to_string()),
        };
        self.registry.add_challenge(challenge.clone()).await?;

        tracing::info!(
            creator = creator_id,
            challenge_id = %challenge.id,
            metric = %metric,
            period = period.as_str(),
            "Custom challenge created"
        );
        Ok(challenge)
    }
}
