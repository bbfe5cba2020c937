// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team battles: creation, scoring and one-time award.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::db::Registry;
use crate::error::{AppError, Result};
use crate::models::{AwardOutcome, Battle, BattleScore};

/// Request body for a new battle.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewBattle {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub home_team: String,
    pub away_team: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub reward_points: u64,
}

/// Pick the winner of two totals; ties have none.
pub fn winner_of(home: (&str, f64), away: (&str, f64)) -> Option<String> {
    if home.1 > away.1 {
        Some(home.0.to_string())
    } else if away.1 > home.1 {
        Some(away.0.to_string())
    } else {
        None
    }
}

#[derive(Clone)]
pub struct BattleScorer {
    registry: Registry,
}

impl BattleScorer {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub async fn create(&self, request: &NewBattle) -> Result<Battle> {
        request.validate()?;
        let home = request.home_team.trim();
        let away = request.away_team.trim();
        if home == away {
            return Err(AppError::Validation(
                "a team cannot battle itself".to_string(),
            ));
        }
        if request.end < request.start {
            return Err(AppError::Validation(
                "battle must end on or after its start".to_string(),
            ));
        }
        self.registry.require_team(home)?;
        self.registry.require_team(away)?;

        let mut battle = Battle {
            id: 0,
            name: request.name.trim().to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            start: request.start,
            end: request.end,
            reward_points: request.reward_points,
            winner_awarded: false,
        };
        battle.id = self.registry.insert_battle(battle.clone());

        tracing::info!(
            battle_id = battle.id,
            home = %battle.home_team,
            away = %battle.away_team,
            start = %battle.start,
            end = %battle.end,
            "Battle created"
        );
        Ok(battle)
    }

    /// Miles walked by a team's current members over the battle window.
    async fn team_miles(&self, team: &str, start: NaiveDate, end: NaiveDate) -> f64 {
        let mut total = 0.0;
        for member_id in self.registry.team_member_ids(team).await {
            if let Some(member) = self.registry.user_snapshot(&member_id).await {
                total += member.miles_between(start, end);
            }
        }
        total
    }

    async fn score(&self, battle: &Battle) -> BattleScore {
        let home_miles = self
            .team_miles(&battle.home_team, battle.start, battle.end)
            .await;
        let away_miles = self
            .team_miles(&battle.away_team, battle.start, battle.end)
            .await;
        BattleScore {
            winner: winner_of(
                (&battle.home_team, home_miles),
                (&battle.away_team, away_miles),
            ),
            home_miles,
            away_miles,
        }
    }

    /// Score a battle using each team's membership at query time.
    pub async fn compute_score(&self, battle_id: u64) -> Result<BattleScore> {
        let battle = self.registry.battle(battle_id)?.lock().await.clone();
        Ok(self.score(&battle).await)
    }

    /// Split the pool among the winning team's current members. Runs at
    /// most once per battle; the battle lock is held for the whole award.
    pub async fn award(&self, battle_id: u64) -> Result<AwardOutcome> {
        let handle = self.registry.battle(battle_id)?;
        let mut battle = handle.lock().await;
        if battle.winner_awarded {
            return Ok(AwardOutcome::AlreadyAwarded);
        }

        let score = self.score(&battle).await;
        let Some(team) = score.winner else {
            tracing::info!(battle_id, "Battle tied, nothing awarded");
            return Ok(AwardOutcome::NoWinner);
        };
        let members = self.registry.team_member_ids(&team).await;
        if members.is_empty() {
            return Ok(AwardOutcome::NoWinner);
        }

        let per_member = battle.reward_points / members.len() as u64;
        for member_id in &members {
            if let Some(user) = self.registry.user(member_id) {
                let mut user = user.lock().await;
                user.points = user.points.saturating_add(per_member);
            }
        }
        battle.winner_awarded = true;

        tracing::info!(battle_id, team = %team, per_member, members = members.len(), "Battle awarded");
        Ok(AwardOutcome::Awarded {
            team,
            per_member,
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_requires_strictly_more() {
        assert_eq!(winner_of(("a", 3.0), ("b", 2.0)), Some("a".to_string()));
        assert_eq!(winner_of(("a", 1.0), ("b", 2.0)), Some("b".to_string()));
        assert_eq!(winner_of(("a", 2.0), ("b", 2.0)), None);
        assert_eq!(winner_of(("a", 0.0), ("b", 0.0)), None);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_battles() {
        let registry = Registry::new();
        registry.join_team("a", "Red").await.unwrap();
        registry.join_team("b", "Blue").await.unwrap();
        let scorer = BattleScorer::new(registry);

        let d = |day| NaiveDate::from_ymd_opt(2026, 10, day).unwrap();
        let mut request = NewBattle {
            name: "Fall Clash".to_string(),
            home_team: "Red".to_string(),
            away_team: "Red".to_string(),
            start: d(1),
            end: d(7),
            reward_points: 100,
        };
        assert!(matches!(scorer.create(&request).await, Err(AppError::Validation(_))));

        request.away_team = "Green".to_string();
        assert!(matches!(scorer.create(&request).await, Err(AppError::NotFound(_))));

        request.away_team = "Blue".to_string();
        request.end = d(1);
        request.start = d(2);
        assert!(matches!(scorer.create(&request).await, Err(AppError::Validation(_))));

        request.start = d(1);
        let battle = scorer.create(&request).await.unwrap();
        assert!(scorer.compute_score(battle.id).await.unwrap().winner.is_none());
        assert!(matches!(scorer.compute_score(9999).await, Err(AppError::NotFound(_))));
    }
}
