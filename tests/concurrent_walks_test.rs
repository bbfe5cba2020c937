// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concurrent updates to one user, one battle and one buddy pair.

use std::time::Duration;
use walking_buddies::models::AwardOutcome;
use walking_buddies::services::{NewBattle, WalkInput};
use walking_buddies::time_utils::Clock;

mod common;

const NUM_CONCURRENT_WALKS: u64 = 50;
const WALK_MINUTES: u64 = 10;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_walks_are_not_lost() {
    let (state, clock) = common::test_state();

    let mut handles = vec![];
    for _ in 0..NUM_CONCURRENT_WALKS {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let input = WalkInput {
                minutes: WALK_MINUTES,
                steps: 100,
                ..Default::default()
            };
            state.points.record_walk("racer", &input).await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("Task join failed")
            .expect("Walk recording failed");
    }

    let user = state.registry.user_snapshot("racer").await.unwrap();
    assert_eq!(
        user.total_walks() as u64,
        NUM_CONCURRENT_WALKS,
        "Walk count mismatch due to race condition"
    );
    assert_eq!(user.points, NUM_CONCURRENT_WALKS * WALK_MINUTES);
    assert_eq!(user.minutes_on(clock.now().date()), NUM_CONCURRENT_WALKS * WALK_MINUTES);
    assert_eq!(user.steps_on(clock.now().date()), NUM_CONCURRENT_WALKS * 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_awards_pay_once() {
    let (state, _clock) = common::test_state();
    state.registry.join_team("a", "Red").await.unwrap();
    state.registry.join_team("b", "Blue").await.unwrap();
    let battle = state
        .battles
        .create(&NewBattle {
            name: "Sprint".to_string(),
            home_team: "Red".to_string(),
            away_team: "Blue".to_string(),
            start: common::monday(),
            end: common::monday(),
            reward_points: 100,
        })
        .await
        .unwrap();
    state
        .points
        .record_walk(
            "a",
            &WalkInput {
                minutes: 1,
                miles: 2.0,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut handles = vec![];
    for _ in 0..10 {
        let state = state.clone();
        handles.push(tokio::spawn(async move { state.battles.award(battle.id).await }));
    }

    let mut awarded = 0;
    for handle in handles {
        let outcome = handle.await.expect("Task join failed").unwrap();
        if matches!(outcome, AwardOutcome::Awarded { .. }) {
            awarded += 1;
        } else {
            assert_eq!(outcome, AwardOutcome::AlreadyAwarded);
        }
    }

    assert_eq!(awarded, 1);
    let user = state.registry.user_snapshot("a").await.unwrap();
    assert_eq!(user.points, 1 + 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_buddy_requests_do_not_deadlock() {
    let (state, _clock) = common::test_state();
    state.registry.get_or_create_user("a", None);
    state.registry.get_or_create_user("b", None);

    let mut handles = vec![];
    for i in 0..40 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                state.social.add_buddy("a", "b").await
            } else {
                state.social.add_buddy("b", "a").await
            }
        }));
    }

    let all = async {
        for handle in handles {
            handle.await.expect("Task join failed").unwrap();
        }
    };
    tokio::time::timeout(Duration::from_secs(10), all)
        .await
        .expect("buddy requests deadlocked");

    let a = state.registry.user_snapshot("a").await.unwrap();
    let b = state.registry.user_snapshot("b").await.unwrap();
    assert!(a.buddies.contains("b"));
    assert!(b.buddies.contains("a"));
    assert_eq!(a.buddies.len(), 1);
}
