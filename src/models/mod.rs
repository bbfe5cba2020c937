// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the engine.

pub mod battle;
pub mod challenge;
pub mod leaderboard;
pub mod privacy;
pub mod reward;
pub mod social;
pub mod team;
pub mod user;

pub use battle::{AwardOutcome, Battle, BattleScore};
pub use challenge::{Challenge, ChallengeKind, ChallengeScope, Metric, Period, UserChallengeState};
pub use leaderboard::Leaderboards;
pub use privacy::{Audience, PrivacySettings, Relationship};
pub use reward::{Badge, RankTier, Reward};
pub use social::{MessageAuthorization, PhotoRef, RouteEntry};
pub use team::{Team, TeamRole};
pub use user::{User, UserId};
