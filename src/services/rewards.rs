// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spending points on the reward catalog.

use std::sync::Arc;

use crate::db::Registry;
use crate::error::{AppError, Result};
use crate::models::reward::{find_reward, Redemption, REWARD_CATALOG};
use crate::models::Reward;
use crate::time_utils::Clock;

#[derive(Clone)]
pub struct RewardService {
    registry: Registry,
    clock: Arc<dyn Clock>,
}

impl RewardService {
    pub fn new(registry: Registry, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    pub fn catalog(&self) -> &'static [Reward] {
        REWARD_CATALOG
    }

    /// Deduct the reward's cost and record the redemption. Returns the new
    /// balance; an insufficient balance changes nothing.
    pub async fn redeem(&self, user_id: &str, reward_id: &str) -> Result<u64> {
        let reward = find_reward(reward_id)
            .ok_or_else(|| AppError::NotFound(format!("Reward {} not found", reward_id)))?;
        let handle = self.registry.require_user(user_id)?;
        let mut user = handle.lock().await;

        if user.points < reward.cost {
            tracing::info!(
                user_id,
                reward_id,
                cost = reward.cost,
                balance = user.points,
                "Redemption denied"
            );
            return Err(AppError::PolicyDenied(format!(
                "{} costs {} points but you have {}",
                reward.name, reward.cost, user.points
            )));
        }

        user.points -= reward.cost;
        user.redemptions.push(Redemption {
            reward_id: reward.id.to_string(),
            cost: reward.cost,
            redeemed_at: self.clock.now(),
        });

        tracing::info!(user_id, reward_id, cost = reward.cost, balance = user.points, "Reward redeemed");
        Ok(user.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::FixedClock;
    use chrono::NaiveDate;

    fn service() -> (Registry, RewardService) {
        let registry = Registry::new();
        let clock = Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        ));
        (registry.clone(), RewardService::new(registry, clock))
    }

    #[tokio::test]
    async fn test_redeem_deducts_and_records() {
        let (registry, rewards) = service();
        registry.get_or_create_user("m", None).lock().await.points = 400;

        assert_eq!(rewards.redeem("m", "coupon_cafe").await.unwrap(), 250);

        let user = registry.user_snapshot("m").await.unwrap();
        assert_eq!(user.redemptions.len(), 1);
        assert_eq!(user.redemptions[0].reward_id, "coupon_cafe");
    }

    #[tokio::test]
    async fn test_insufficient_balance_is_denied_without_change() {
        let (registry, rewards) = service();
        registry.get_or_create_user("m", None).lock().await.points = 100;

        let err = rewards.redeem("m", "giftcard").await.unwrap_err();
        assert!(err.is_policy_denied());

        let user = registry.user_snapshot("m").await.unwrap();
        assert_eq!(user.points, 100);
        assert!(user.redemptions.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_reward_or_user() {
        let (registry, rewards) = service();
        registry.get_or_create_user("m", None);
        assert!(matches!(
            rewards.redeem("m", "yacht").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            rewards.redeem("ghost", "coupon_cafe").await,
            Err(AppError::NotFound(_))
        ));
    }
}
