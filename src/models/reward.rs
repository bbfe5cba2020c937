// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badges, rank tiers and the redeemable reward catalog.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Milestone badges. Once granted, never revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub enum Badge {
    #[serde(rename = "badge_10_walks")]
    FirstTenWalks,
    #[serde(rename = "badge_100_miles")]
    HundredMilesClub,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstTenWalks => "First 10 Walks",
            Self::HundredMilesClub => "100 Miles Club",
        }
    }
}

/// Rank earned from the points balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub enum RankTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl RankTier {
    pub fn for_points(points: u64) -> Self {
        match points {
            p if p >= 5000 => Self::Platinum,
            p if p >= 1000 => Self::Gold,
            p if p >= 500 => Self::Silver,
            _ => Self::Bronze,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Badge,
    Coupon,
    Gift,
    Unlock,
}

/// Catalog entry a user can spend points on.
#[derive(Debug, Clone, Serialize)]
pub struct Reward {
    pub id: &'static str,
    pub kind: RewardKind,
    pub name: &'static str,
    pub cost: u64,
    pub description: &'static str,
}

/// Record of points spent on a reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub reward_id: String,
    pub cost: u64,
    pub redeemed_at: NaiveDateTime,
}

pub const REWARD_CATALOG: &[Reward] = &[
    Reward {
        id: "badge_10_walks",
        kind: RewardKind::Badge,
        name: "First 10 Walks",
        cost: 0,
        description: "Milestone badge after 10 walks",
    },
    Reward {
        id: "badge_100_miles",
        kind: RewardKind::Badge,
        name: "100 Miles Club",
        cost: 0,
        description: "Milestone badge after 100 miles",
    },
    Reward {
        id: "coupon_sneakers",
        kind: RewardKind::Coupon,
        name: "Sneaker Discount $10",
        cost: 300,
        description: "$10 off partner sneakers",
    },
    Reward {
        id: "coupon_cafe",
        kind: RewardKind::Coupon,
        name: "Local Cafe $5",
        cost: 150,
        description: "$5 voucher at partner cafe",
    },
    Reward {
        id: "giftcard",
        kind: RewardKind::Gift,
        name: "Gift Card $20",
        cost: 800,
        description: "Generic gift card",
    },
    Reward {
        id: "premium_challenge",
        kind: RewardKind::Unlock,
        name: "Exclusive Challenge Pack",
        cost: 400,
        description: "Unlock premium challenge set",
    },
];

pub fn find_reward(id: &str) -> Option<&'static Reward> {
    REWARD_CATALOG.iter().find(|r| r.id == id)
}
