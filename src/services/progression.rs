// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badge and avatar progression.
//!
//! Badges are monotonic. The avatar tier is recomputed from scratch after
//! every walk, so a lapsed streak can lower it unless mileage alone holds
//! the tier.

use crate::models::{Badge, User};

const FIRST_WALKS_TARGET: usize = 10;
const HUNDRED_MILES: f64 = 100.0;

/// (tier, lifetime miles, streak days); either condition unlocks the tier.
const AVATAR_TIERS: [(u8, f64, u32); 3] = [(4, 300.0, 60), (3, 150.0, 30), (2, 50.0, 14)];

/// Avatar tier for the given lifetime mileage and current streak.
pub fn avatar_tier(lifetime_miles: f64, streak: u32) -> u8 {
    AVATAR_TIERS
        .iter()
        .find(|(_, miles, days)| lifetime_miles >= *miles || streak >= *days)
        .map(|(tier, _, _)| *tier)
        .unwrap_or(1)
}

/// Badges whose thresholds are met by these lifetime totals.
pub fn qualifying_badges(total_walks: usize, lifetime_miles: f64) -> Vec<Badge> {
    let mut badges = Vec::new();
    if total_walks >= FIRST_WALKS_TARGET {
        badges.push(Badge::FirstTenWalks);
    }
    if lifetime_miles >= HUNDRED_MILES {
        badges.push(Badge::HundredMilesClub);
    }
    badges
}

/// Re-evaluate a user's badges and avatar. Returns badges granted now.
pub fn refresh(user: &mut User, streak: u32) -> Vec<Badge> {
    let miles = user.lifetime_miles();
    let granted: Vec<Badge> = qualifying_badges(user.total_walks(), miles)
        .into_iter()
        .filter(|badge| user.badges.insert(*badge))
        .collect();
    user.avatar_tier = avatar_tier(miles, streak);
    granted
}

/// Progress toward the first-walks badge, clamped to 1.0.
pub fn first_walks_progress(total_walks: usize) -> f64 {
    (total_walks as f64 / FIRST_WALKS_TARGET as f64).min(1.0)
}
