// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard visibility across owner settings and viewer relationships.

use walking_buddies::models::{PrivacySettings, Team, User};
use walking_buddies::services::leaderboard::build_leaderboards;
use walking_buddies::services::WalkInput;

mod common;

#[derive(Clone, Copy, Debug)]
enum Relation {
    Myself,
    Teammate,
    Stranger,
}

#[test]
fn test_visibility_matrix() {
    let today = common::monday();

    for opt_in in [false, true] {
        for team_visible in [false, true] {
            for relation in [Relation::Myself, Relation::Teammate, Relation::Stranger] {
                let mut viewer = User::new("viewer", None, 0);
                viewer.team = Some("Home".to_string());

                let mut owner = match relation {
                    Relation::Myself => viewer.clone(),
                    _ => User::new("owner", None, 1),
                };
                owner.points = 42;
                owner.privacy.leaderboard_opt_in = opt_in;
                owner.privacy.leaderboard_team_visible = team_visible;
                owner.team = match relation {
                    Relation::Stranger => Some("Away".to_string()),
                    _ => Some("Home".to_string()),
                };
                let viewer = match relation {
                    Relation::Myself => owner.clone(),
                    _ => viewer,
                };

                let users = match relation {
                    Relation::Myself => vec![owner.clone()],
                    _ => vec![viewer.clone(), owner.clone()],
                };
                let boards = build_leaderboards(&viewer, &users, &[], today);
                let shown = boards.individuals.iter().any(|r| r.points == 42);

                let expected = matches!(relation, Relation::Myself)
                    || opt_in
                    || (team_visible && matches!(relation, Relation::Teammate));
                assert_eq!(
                    shown, expected,
                    "opt_in={} team_visible={} relation={:?}",
                    opt_in, team_visible, relation
                );
            }
        }
    }
}

fn team(name: &str, members: &[&str], seq: u64) -> Team {
    let mut team = Team::new(name, seq);
    for member in members {
        team.add_member(member);
    }
    team
}

#[test]
fn test_aggregates_only_sum_visible_members() {
    let today = common::monday();

    let mut viewer = User::new("v", Some("Vera Vale"), 0);
    viewer.team = Some("Home".to_string());
    viewer.points = 10;

    let mut mate = User::new("t", Some("Tom Tate"), 1);
    mate.team = Some("Home".to_string());
    mate.points = 100;

    let mut shy_mate = User::new("s", Some("Sam Shy"), 2);
    shy_mate.team = Some("Home".to_string());
    shy_mate.points = 1000;
    shy_mate.privacy.leaderboard_team_visible = false;

    let mut hidden = User::new("h", None, 3);
    hidden.team = Some("Away".to_string());
    hidden.points = 5000;

    let mut public = User::new("p", Some("Pat Public"), 4);
    public.points = 300;
    public.city = "Atlanta".to_string();
    public.organization = "HealthCo".to_string();
    public.privacy = PrivacySettings {
        leaderboard_opt_in: true,
        show_city: true,
        ..Default::default()
    };

    let users = vec![viewer.clone(), mate, shy_mate, hidden, public];
    let teams = vec![team("Home", &["v", "t", "s"], 10), team("Away", &["h"], 11)];
    let boards = build_leaderboards(&viewer, &users, &teams, today);

    let names: Vec<_> = boards.individuals.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Pat P.", "Tom T.", "Vera V."]);

    // Away has no visible member; Home sums v and t only
    assert_eq!(boards.teams.len(), 1);
    assert_eq!(boards.teams[0].team, "Home");
    assert_eq!(boards.teams[0].points, 110);
    assert_eq!(boards.teams[0].visible_members, 2);

    let members: Vec<_> = boards.team_members.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(members, vec!["Tom T.", "Vera V."]);

    // Disclosed city shows; organization was never disclosed
    assert_eq!(boards.cities.len(), 1);
    assert_eq!(boards.cities[0].city, "Atlanta");
    assert!(boards.organizations.is_empty());
}

#[tokio::test]
async fn test_city_board_counts_this_weeks_steps() {
    let (state, clock) = common::test_state();

    let mut settings = PrivacySettings::default();
    settings.leaderboard_opt_in = true;
    settings.show_city = true;
    state
        .social
        .update_privacy("p", settings)
        .await
        .unwrap();
    state
        .registry
        .save_profile(
            "p",
            &walking_buddies::models::user::ProfileUpdate {
                display_name: "Pat".to_string(),
                city: "Atlanta".to_string(),
                organization: String::new(),
                activity_window: Default::default(),
            },
        )
        .await
        .unwrap();

    let walk = WalkInput {
        minutes: 10,
        steps: 4000,
        ..Default::default()
    };
    // Sunday of the previous week does not count
    clock.advance_days(-1);
    state.points.record_walk("p", &walk).await.unwrap();
    clock.advance_days(1);
    state.points.record_walk("p", &walk).await.unwrap();

    let boards = state.leaderboards.get_leaderboards("viewer").await.unwrap();
    assert_eq!(boards.cities.len(), 1);
    assert_eq!(boards.cities[0].steps_week, 4000);
}
