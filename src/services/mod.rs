// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - rules engine layer.

pub mod battles;
pub mod challenges;
pub mod collectibles;
pub mod leaderboard;
pub mod points;
pub mod progression;
pub mod rewards;
pub mod social;

pub use battles::{BattleScorer, NewBattle};
pub use challenges::{ChallengeCompletion, ChallengeEngine, ChallengeStatus, NewCustomChallenge};
pub use collectibles::{CollectibleDropper, ScanResult};
pub use leaderboard::LeaderboardService;
pub use points::{calc_streak, Dashboard, NewRoute, PointsEngine, WalkInput, WalkOutcome};
pub use rewards::RewardService;
pub use social::{BuddySuggestion, FeedItem, ProfileView, SocialService};
