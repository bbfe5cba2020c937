// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cosmetic coin and item drops.
//!
//! A side channel only: drops land in the user's collectibles inventory
//! and never touch points, streaks or challenge state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::Registry;
use crate::error::Result;
use crate::models::user::Collectibles;

const WALK_DROP_CHANCE: f64 = 0.25;
const SCAN_RARE_CHANCE: f64 = 0.15;
const RARE_ITEMS: [&str; 3] = ["Leaf Token", "Trail Gem", "Sunburst"];

/// Result of an explicit collectible scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "found", rename_all = "snake_case")]
pub enum ScanResult {
    Item { name: String },
    Coins { amount: u64 },
}

/// Seedable drop generator shared across requests.
#[derive(Clone)]
pub struct CollectibleDropper {
    registry: Registry,
    rng: Arc<Mutex<StdRng>>,
}

impl CollectibleDropper {
    /// A fixed seed makes every drop sequence reproducible.
    pub fn new(registry: Registry, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            registry,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Maybe drop 1–10 coins after a walk. Returns the coins found.
    pub async fn walk_drop(&self, inventory: &mut Collectibles) -> Option<u64> {
        let mut rng = self.rng.lock().await;
        if !rng.gen_bool(WALK_DROP_CHANCE) {
            return None;
        }
        let coins = rng.gen_range(1..=10);
        inventory.coins = inventory.coins.saturating_add(coins);
        Some(coins)
    }

    /// Scan for a collectible: a rare item or a handful of coins.
    pub async fn scan(&self, user_id: &str) -> Result<ScanResult> {
        let result = {
            let mut rng = self.rng.lock().await;
            if rng.gen_bool(SCAN_RARE_CHANCE) {
                let name = RARE_ITEMS[rng.gen_range(0..RARE_ITEMS.len())];
                ScanResult::Item {
                    name: name.to_string(),
                }
            } else {
                ScanResult::Coins {
                    amount: rng.gen_range(1..=5),
                }
            }
        };

        let handle = self.registry.get_or_create_user(user_id, None);
        let mut user = handle.lock().await;
        match &result {
            ScanResult::Item { name } => {
                user.collectibles.items.insert(name.clone());
            }
            ScanResult::Coins { amount } => {
                user.collectibles.coins = user.collectibles.coins.saturating_add(*amount);
            }
        }

        tracing::debug!(user_id, result = ?result, "Collectible scan");
        Ok(result)
    }
}
