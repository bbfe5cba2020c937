// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user privacy settings and the audience check shared by every
//! cross-user read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Who may see something a user owns. Ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Private,
    #[default]
    Friends,
    Team,
    Public,
}

/// Who may start a conversation with a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum MessageSenders {
    Nobody,
    #[default]
    Buddies,
    Team,
    Everyone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct MessagePolicy {
    #[serde(default)]
    pub allow_from: MessageSenders,
    #[serde(default)]
    pub blocked: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct SecuritySettings {
    #[serde(default)]
    pub two_factor_enabled: bool,
    #[serde(default = "default_true")]
    pub login_alerts: bool,
    #[serde(default = "default_true")]
    pub strip_photo_location: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            two_factor_enabled: false,
            login_alerts: true,
            strip_photo_location: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Visibility settings owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct PrivacySettings {
    #[serde(default)]
    pub profile_visibility: Audience,
    #[serde(default)]
    pub show_city: bool,
    #[serde(default)]
    pub show_organization: bool,

    // ─── Leaderboards ────────────────────────────────────────────
    #[serde(default)]
    pub leaderboard_opt_in: bool,
    #[serde(default)]
    pub leaderboard_alias: String,
    #[serde(default = "default_true")]
    pub leaderboard_team_visible: bool,

    // ─── Discovery ───────────────────────────────────────────────
    #[serde(default)]
    pub discoverable_by_city: bool,
    #[serde(default)]
    pub discoverable_by_organization: bool,

    // ─── Sharing defaults ────────────────────────────────────────
    #[serde(default)]
    pub default_route_audience: Audience,
    #[serde(default)]
    pub default_photo_audience: Audience,

    #[serde(default)]
    pub messaging: MessagePolicy,
    #[serde(default)]
    pub security: SecuritySettings,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_visibility: Audience::Friends,
            show_city: false,
            show_organization: false,
            leaderboard_opt_in: false,
            leaderboard_alias: String::new(),
            leaderboard_team_visible: true,
            discoverable_by_city: false,
            discoverable_by_organization: false,
            default_route_audience: Audience::Friends,
            default_photo_audience: Audience::Friends,
            messaging: MessagePolicy::default(),
            security: SecuritySettings::default(),
        }
    }
}

/// How a viewer relates to the owner of some piece of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub is_self: bool,
    pub is_buddy: bool,
    pub is_teammate: bool,
}

impl Relationship {
    pub const STRANGER: Relationship = Relationship {
        is_self: false,
        is_buddy: false,
        is_teammate: false,
    };
}

impl Audience {
    /// Whether a viewer with the given relationship is inside this audience.
    pub fn admits(self, rel: Relationship) -> bool {
        if rel.is_self {
            return true;
        }
        match self {
            Audience::Private => false,
            Audience::Friends => rel.is_buddy,
            Audience::Team => rel.is_buddy || rel.is_teammate,
            Audience::Public => true,
        }
    }
}

impl MessageSenders {
    pub fn admits(self, rel: Relationship) -> bool {
        match self {
            MessageSenders::Nobody => false,
            MessageSenders::Buddies => rel.is_buddy,
            MessageSenders::Team => rel.is_buddy || rel.is_teammate,
            MessageSenders::Everyone => true,
        }
    }
}
