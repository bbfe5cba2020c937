//! Application configuration loaded from environment variables.
//!
//! Point rules can be tuned per deployment; everything else has a
//! sensible local-development default.

use std::env;
use std::str::FromStr;

/// Point values applied by the walk scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointRules {
    pub base_per_minute: u64,
    pub group_walk_bonus: u64,
    pub photo_share_bonus: u64,
    pub streak_7_bonus: u64,
    pub streak_30_bonus: u64,
    pub invite_bonus: u64,
}

impl Default for PointRules {
    fn default() -> Self {
        Self {
            base_per_minute: 1,
            group_walk_bonus: 20,
            photo_share_bonus: 5,
            streak_7_bonus: 10,
            streak_30_bonus: 50,
            invite_bonus: 50,
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Scoring rules
    pub point_rules: PointRules,
    /// Seed for cosmetic drops; random when unset
    pub collectible_seed: Option<u64>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            point_rules: PointRules::default(),
            collectible_seed: Some(7),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = PointRules::default();
        let point_rules = PointRules {
            base_per_minute: parse_or("POINTS_PER_MINUTE", defaults.base_per_minute)?,
            group_walk_bonus: parse_or("GROUP_WALK_BONUS", defaults.group_walk_bonus)?,
            photo_share_bonus: parse_or("PHOTO_SHARE_BONUS", defaults.photo_share_bonus)?,
            streak_7_bonus: parse_or("STREAK_7_BONUS", defaults.streak_7_bonus)?,
            streak_30_bonus: parse_or("STREAK_30_BONUS", defaults.streak_30_bonus)?,
            invite_bonus: parse_or("INVITE_BONUS", defaults.invite_bonus)?,
        };

        let collectible_seed = match env::var("COLLECTIBLE_SEED") {
            Ok(raw) => Some(parse_value("COLLECTIBLE_SEED", &raw)?),
            Err(_) => None,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_or("PORT", 8080)?,
            point_rules,
            collectible_seed,
        })
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(name, raw.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
