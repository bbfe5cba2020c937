// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Privacy-filtered leaderboards.
//!
//! Every board is built for one viewer. A user appears only if they opted
//! in, or share the viewer's team and allow team visibility, or are the
//! viewer. Aggregates sum visible users only, so hidden users never leak
//! through a team, city or organization total.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::Registry;
use crate::error::Result;
use crate::models::leaderboard::{
    CityRow, IndividualRow, OrganizationRow, TeamMemberRow, TeamRow,
};
use crate::models::{Leaderboards, RankTier, Team, User};
use crate::time_utils::{week_dates, Clock};

/// Whether `owner` may appear on `viewer`'s boards.
pub fn is_visible(owner: &User, viewer: &User) -> bool {
    owner.id == viewer.id
        || owner.privacy.leaderboard_opt_in
        || (owner.privacy.leaderboard_team_visible && owner.is_teammate_of(viewer))
}

/// Sum values by key, keeping first-seen key order for stable ties.
fn tally<I>(entries: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut order: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (key, value) in entries {
        match index.get(&key) {
            Some(&i) => order[i].1 = order[i].1.saturating_add(value),
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, value));
            }
        }
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

/// Build all boards for `viewer` from consistent snapshots.
///
/// `users` and `teams` are expected in registration order; that order
/// breaks ties.
pub fn build_leaderboards(
    viewer: &User,
    users: &[User],
    teams: &[Team],
    today: NaiveDate,
) -> Leaderboards {
    let visible: Vec<&User> = users.iter().filter(|u| is_visible(u, viewer)).collect();
    let by_id: HashMap<&str, &User> = visible.iter().map(|u| (u.id.as_str(), *u)).collect();

    let mut individuals: Vec<IndividualRow> = visible
        .iter()
        .map(|u| IndividualRow {
            name: u.leaderboard_name(),
            points: u.points,
            tier: RankTier::for_points(u.points),
            team: u.team.clone(),
            is_viewer: u.id == viewer.id,
        })
        .collect();
    individuals.sort_by(|a, b| b.points.cmp(&a.points));

    let mut team_rows: Vec<TeamRow> = teams
        .iter()
        .filter_map(|team| {
            let members: Vec<&User> = team
                .members
                .iter()
                .filter_map(|m| by_id.get(m.user_id.as_str()).copied())
                .collect();
            if members.is_empty() {
                return None;
            }
            Some(TeamRow {
                team: team.name.clone(),
                points: members.iter().fold(0u64, |acc, u| acc.saturating_add(u.points)),
                visible_members: members.len() as u32,
            })
        })
        .collect();
    team_rows.sort_by(|a, b| b.points.cmp(&a.points));

    let mut team_members: Vec<TeamMemberRow> = viewer
        .team
        .as_deref()
        .and_then(|name| teams.iter().find(|t| t.name == name))
        .map(|team| {
            team.members
                .iter()
                .filter_map(|m| {
                    by_id.get(m.user_id.as_str()).map(|u| TeamMemberRow {
                        name: u.leaderboard_name(),
                        role: m.role,
                        points: u.points,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    team_members.sort_by(|a, b| b.points.cmp(&a.points));

    let week = week_dates(today);
    let cities = tally(
        visible
            .iter()
            .filter(|u| u.privacy.show_city && !u.city.is_empty())
            .map(|u| {
                let steps = week
                    .iter()
                    .fold(0u64, |acc, d| acc.saturating_add(u.steps_on(*d)));
                (u.city.clone(), steps)
            }),
    )
    .into_iter()
    .map(|(city, steps_week)| CityRow { city, steps_week })
    .collect();

    let organizations = tally(
        visible
            .iter()
            .filter(|u| u.privacy.show_organization && !u.organization.is_empty())
            .map(|u| (u.organization.clone(), u.points)),
    )
    .into_iter()
    .map(|(organization, points)| OrganizationRow {
        organization,
        points,
    })
    .collect();

    Leaderboards {
        individuals,
        teams: team_rows,
        team_members,
        cities,
        organizations,
    }
}

#[derive(Clone)]
pub struct LeaderboardService {
    registry: Registry,
    clock: Arc<dyn Clock>,
}

impl LeaderboardService {
    pub fn new(registry: Registry, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    pub async fn get_leaderboards(&self, viewer_id: &str) -> Result<Leaderboards> {
        let viewer = self
            .registry
            .get_or_create_user(viewer_id, None)
            .lock()
            .await
            .clone();
        let users = self.registry.user_snapshots().await;
        let teams = self.registry.team_snapshots().await;

        let boards = build_leaderboards(&viewer, &users, &teams, self.clock.today());
        tracing::debug!(
            viewer = viewer_id,
            individuals = boards.individuals.len(),
            teams = boards.teams.len(),
            "Leaderboards built"
        );
        Ok(boards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, seq: u64, points: u64) -> User {
        let mut u = User::new(id, None, seq);
        u.points = points;
        u
    }

    #[test]
    fn test_stranger_hidden_without_opt_in() {
        let viewer = user("v", 0, 10);
        let hidden = user("h", 1, 500);
        let mut public = user("p", 2, 300);
        public.privacy.leaderboard_opt_in = true;

        let boards = build_leaderboards(
            &viewer,
            &[viewer.clone(), hidden, public],
            &[],
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        );
        let names: Vec<_> = boards.individuals.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["p", "v"]);
        assert!(boards.individuals[1].is_viewer);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let viewer = user("v", 0, 0);
        let mut a = user("a", 1, 100);
        let mut b = user("b", 2, 100);
        a.privacy.leaderboard_opt_in = true;
        b.privacy.leaderboard_opt_in = true;

        let boards = build_leaderboards(
            &viewer,
            &[viewer.clone(), a, b],
            &[],
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        );
        let names: Vec<_> = boards.individuals.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "v"]);
    }

    #[test]
    fn test_tally_sorts_descending_and_stable() {
        let rows = tally(vec![
            ("x".to_string(), 5),
            ("y".to_string(), 6),
            ("x".to_string(), 2),
            ("z".to_string(), 7),
        ]);
        assert_eq!(
            rows,
            vec![
                ("x".to_string(), 7),
                ("z".to_string(), 7),
                ("y".to_string(), 6)
            ]
        );
    }
}
