// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Walking Buddies: gamification rules engine for a social walking app
//!
//! This crate turns logged walks into points, streaks, badges, challenge
//! completions, team battle results and privacy-filtered leaderboards, and
//! exposes those operations over a small JSON API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Registry;
use services::{
    BattleScorer, ChallengeEngine, CollectibleDropper, LeaderboardService, PointsEngine,
    RewardService, SocialService,
};
use std::sync::Arc;
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub registry: Registry,
    pub points: PointsEngine,
    pub challenges: ChallengeEngine,
    pub battles: BattleScorer,
    pub leaderboards: LeaderboardService,
    pub social: SocialService,
    pub rewards: RewardService,
    pub collectibles: CollectibleDropper,
}

impl AppState {
    /// Wire every service to one fresh registry and clock.
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        let registry = Registry::new();
        let challenges = ChallengeEngine::new(registry.clone(), clock.clone());
        let collectibles = CollectibleDropper::new(registry.clone(), config.collectible_seed);
        let points = PointsEngine::new(
            registry.clone(),
            clock.clone(),
            config.point_rules,
            challenges.clone(),
            collectibles.clone(),
        );

        Self {
            battles: BattleScorer::new(registry.clone()),
            leaderboards: LeaderboardService::new(registry.clone(), clock.clone()),
            social: SocialService::new(registry.clone(), clock.clone()),
            rewards: RewardService::new(registry.clone(), clock),
            points,
            challenges,
            collectibles,
            registry,
            config,
        }
    }
}
