// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team battle scoring windows and award idempotency.

use std::sync::Arc;
use walking_buddies::models::AwardOutcome;
use walking_buddies::services::{NewBattle, WalkInput};
use walking_buddies::AppState;

mod common;

fn miles(miles: f64) -> WalkInput {
    WalkInput {
        minutes: 1,
        miles,
        ..Default::default()
    }
}

fn battle_request(reward_points: u64) -> NewBattle {
    NewBattle {
        name: "Fall Clash".to_string(),
        home_team: "Red".to_string(),
        away_team: "Blue".to_string(),
        start: common::date(2026, 10, 19),
        end: common::date(2026, 10, 21),
        reward_points,
    }
}

async fn setup_teams(state: &Arc<AppState>) {
    state.registry.join_team("a", "Red").await.unwrap();
    state.registry.join_team("b", "Red").await.unwrap();
    state.registry.join_team("c", "Blue").await.unwrap();
}

async fn points(state: &Arc<AppState>, user: &str) -> u64 {
    state.registry.user_snapshot(user).await.unwrap().points
}

#[tokio::test]
async fn test_score_only_counts_the_window() {
    // Day before the battle
    let (state, clock) = common::test_state_at(common::date(2026, 10, 18));
    setup_teams(&state).await;
    let battle = state.battles.create(&battle_request(100)).await.unwrap();

    state.points.record_walk("a", &miles(10.0)).await.unwrap();
    clock.advance_days(1);
    state.points.record_walk("a", &miles(3.0)).await.unwrap();
    state.points.record_walk("c", &miles(2.0)).await.unwrap();
    clock.advance_days(1);
    state.points.record_walk("b", &miles(1.0)).await.unwrap();
    // Day after the battle ends
    clock.advance_days(2);
    state.points.record_walk("c", &miles(10.0)).await.unwrap();

    let score = state.battles.compute_score(battle.id).await.unwrap();
    assert_eq!(score.home_miles, 4.0);
    assert_eq!(score.away_miles, 2.0);
    assert_eq!(score.winner.as_deref(), Some("Red"));
}

#[tokio::test]
async fn test_award_pays_once_with_integer_split() {
    let (state, _clock) = common::test_state();
    setup_teams(&state).await;
    let battle = state.battles.create(&battle_request(101)).await.unwrap();

    state.points.record_walk("a", &miles(3.0)).await.unwrap();
    state.points.record_walk("c", &miles(1.0)).await.unwrap();

    let before_a = points(&state, "a").await;
    let before_b = points(&state, "b").await;
    let before_c = points(&state, "c").await;

    let outcome = state.battles.award(battle.id).await.unwrap();
    assert_eq!(
        outcome,
        AwardOutcome::Awarded {
            team: "Red".to_string(),
            per_member: 50,
            members: vec!["a".to_string(), "b".to_string()],
        }
    );
    assert_eq!(
        state.battles.award(battle.id).await.unwrap(),
        AwardOutcome::AlreadyAwarded
    );

    assert_eq!(points(&state, "a").await, before_a + 50);
    assert_eq!(points(&state, "b").await, before_b + 50);
    assert_eq!(points(&state, "c").await, before_c);
}

#[tokio::test]
async fn test_tie_awards_nothing_and_stays_open() {
    let (state, _clock) = common::test_state();
    setup_teams(&state).await;
    let battle = state.battles.create(&battle_request(100)).await.unwrap();

    state.points.record_walk("a", &miles(2.0)).await.unwrap();
    state.points.record_walk("c", &miles(2.0)).await.unwrap();
    assert_eq!(
        state.battles.award(battle.id).await.unwrap(),
        AwardOutcome::NoWinner
    );

    // Breaking the tie later still allows the award
    state.points.record_walk("c", &miles(1.0)).await.unwrap();
    assert!(matches!(
        state.battles.award(battle.id).await.unwrap(),
        AwardOutcome::Awarded { ref team, .. } if team == "Blue"
    ));
}

#[tokio::test]
async fn test_membership_is_read_at_query_time() {
    let (state, _clock) = common::test_state();
    setup_teams(&state).await;
    let battle = state.battles.create(&battle_request(100)).await.unwrap();

    state.points.record_walk("c", &miles(5.0)).await.unwrap();
    state.points.record_walk("a", &miles(1.0)).await.unwrap();
    let score = state.battles.compute_score(battle.id).await.unwrap();
    assert_eq!(score.winner.as_deref(), Some("Blue"));

    // c defects to Red and takes their mileage along
    state.registry.join_team("c", "Red").await.unwrap();
    let score = state.battles.compute_score(battle.id).await.unwrap();
    assert_eq!(score.home_miles, 6.0);
    assert_eq!(score.away_miles, 0.0);
    assert_eq!(score.winner.as_deref(), Some("Red"));
}
