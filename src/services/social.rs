// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Privacy-gated social reads and writes: settings, photos, messages,
//! buddies and profiles.

use serde::Serialize;
use std::sync::Arc;

use crate::db::Registry;
use crate::error::{AppError, Result};
use crate::models::user::ActivityWindow;
use crate::models::{
    Audience, MessageAuthorization, PhotoRef, PrivacySettings, RankTier, User,
};
use crate::time_utils::Clock;

const FEED_LIMIT: usize = 20;
const MAX_ALIAS_LEN: usize = 40;
const MAX_CAPTION_LEN: usize = 280;
const MAX_MESSAGE_LEN: usize = 2000;

/// A photo in someone's feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub photo: PhotoRef,
    pub poster: String,
}

/// Someone the viewer might want to walk with.
#[derive(Debug, Clone, Serialize)]
pub struct BuddySuggestion {
    pub user_id: String,
    pub display_name: String,
    pub same_city: bool,
    pub same_organization: bool,
    pub activity_window: ActivityWindow,
}

/// A profile as one viewer is allowed to see it.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user_id: String,
    pub display_name: String,
    /// `None` unless disclosed
    pub city: Option<String>,
    /// `None` unless disclosed
    pub organization: Option<String>,
    pub activity_window: ActivityWindow,
    pub team: Option<String>,
    pub points: u64,
    pub tier: RankTier,
    pub badges: Vec<&'static str>,
}

fn same_attribute(a: &str, b: &str) -> bool {
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

/// Build `owner`'s profile for `viewer`, or `None` if it is hidden.
pub fn profile_for(owner: &User, viewer: &User) -> Option<ProfileView> {
    let rel = owner.relationship_to(viewer);
    if !owner.privacy.profile_visibility.admits(rel) {
        return None;
    }
    let disclose = |flag: bool, value: &str| {
        ((flag || rel.is_self) && !value.is_empty()).then(|| value.to_string())
    };
    Some(ProfileView {
        user_id: owner.id.clone(),
        display_name: owner.display_name.clone(),
        city: disclose(owner.privacy.show_city, &owner.city),
        organization: disclose(owner.privacy.show_organization, &owner.organization),
        activity_window: owner.activity_window,
        team: owner.team.clone(),
        points: owner.points,
        tier: RankTier::for_points(owner.points),
        badges: owner.badges.iter().map(|b| b.label()).collect(),
    })
}

/// Users who opted into discovery and share a city or organization with
/// `viewer`. Existing buddies are skipped.
pub fn suggestions_for(viewer: &User, users: &[User]) -> Vec<BuddySuggestion> {
    users
        .iter()
        .filter(|u| u.id != viewer.id && !viewer.buddies.contains(&u.id))
        .filter_map(|u| {
            let same_city =
                u.privacy.discoverable_by_city && same_attribute(&u.city, &viewer.city);
            let same_organization = u.privacy.discoverable_by_organization
                && same_attribute(&u.organization, &viewer.organization);
            (same_city || same_organization).then(|| BuddySuggestion {
                user_id: u.id.clone(),
                display_name: u.display_name.clone(),
                same_city,
                same_organization,
                activity_window: u.activity_window,
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct SocialService {
    registry: Registry,
    clock: Arc<dyn Clock>,
}

impl SocialService {
    pub fn new(registry: Registry, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    async fn snapshot_or_create(&self, user_id: &str) -> User {
        self.registry
            .get_or_create_user(user_id, None)
            .lock()
            .await
            .clone()
    }

    /// Replace a user's privacy settings wholesale.
    pub async fn update_privacy(
        &self,
        user_id: &str,
        mut settings: PrivacySettings,
    ) -> Result<PrivacySettings> {
        settings.leaderboard_alias = settings.leaderboard_alias.trim().to_string();
        if settings.leaderboard_alias.chars().count() > MAX_ALIAS_LEN {
            return Err(AppError::Validation(format!(
                "leaderboard alias must be at most {} characters",
                MAX_ALIAS_LEN
            )));
        }
        settings.messaging.blocked.remove(user_id);

        let handle = self.registry.get_or_create_user(user_id, None);
        handle.lock().await.privacy = settings.clone();

        tracing::info!(
            user_id,
            profile = ?settings.profile_visibility,
            leaderboard_opt_in = settings.leaderboard_opt_in,
            "Privacy updated"
        );
        Ok(settings)
    }

    /// Record a photo reference. The audience falls back to the user's
    /// photo sharing default.
    pub async fn save_photo(
        &self,
        user_id: &str,
        audience: Option<Audience>,
        caption: &str,
    ) -> Result<PhotoRef> {
        let caption = caption.trim();
        if caption.chars().count() > MAX_CAPTION_LEN {
            return Err(AppError::Validation(format!(
                "caption must be at most {} characters",
                MAX_CAPTION_LEN
            )));
        }

        let audience = match audience {
            Some(audience) => audience,
            None => {
                let handle = self.registry.get_or_create_user(user_id, None);
                let user = handle.lock().await;
                user.privacy.default_photo_audience
            }
        };
        let photo = self
            .registry
            .add_photo(PhotoRef {
                id: 0,
                owner: user_id.to_string(),
                audience,
                caption: caption.to_string(),
                posted_at: self.clock.now(),
            })
            .await;

        tracing::info!(user_id, photo_id = photo.id, audience = ?audience, "Photo saved");
        Ok(photo)
    }

    /// Newest photos whose audience admits `viewer_id`.
    pub async fn photo_feed(&self, viewer_id: &str) -> Vec<FeedItem> {
        let viewer = self.snapshot_or_create(viewer_id).await;
        let mut photos = self.registry.photos().await;
        photos.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then(b.id.cmp(&a.id)));

        let mut feed = Vec::new();
        for photo in photos {
            if feed.len() == FEED_LIMIT {
                break;
            }
            let Some(owner) = self.registry.user_snapshot(&photo.owner).await else {
                continue;
            };
            if photo.audience.admits(owner.relationship_to(&viewer)) {
                feed.push(FeedItem {
                    poster: owner.display_name,
                    photo,
                });
            }
        }
        feed
    }

    /// Decide whether `sender_id` may message `recipient_id`. Delivery is
    /// up to the caller.
    pub async fn send_message(
        &self,
        sender_id: &str,
        recipient_id: &str,
        text: &str,
    ) -> Result<MessageAuthorization> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("message must not be empty".to_string()));
        }
        if text.chars().count() > MAX_MESSAGE_LEN {
            return Err(AppError::Validation(format!(
                "message must be at most {} characters",
                MAX_MESSAGE_LEN
            )));
        }
        if sender_id == recipient_id {
            return Err(AppError::Validation(
                "cannot message yourself".to_string(),
            ));
        }

        let recipient = self
            .registry
            .user_snapshot(recipient_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", recipient_id)))?;
        let sender = self.snapshot_or_create(sender_id).await;

        let policy = &recipient.privacy.messaging;
        if policy.blocked.contains(sender_id) {
            tracing::info!(sender = sender_id, recipient = recipient_id, "Message denied: blocked");
            return Err(AppError::PolicyDenied(
                "recipient does not accept messages from you".to_string(),
            ));
        }
        if !policy.allow_from.admits(recipient.relationship_to(&sender)) {
            tracing::info!(sender = sender_id, recipient = recipient_id, "Message denied: policy");
            return Err(AppError::PolicyDenied(
                "recipient does not accept messages from you".to_string(),
            ));
        }

        tracing::info!(sender = sender_id, recipient = recipient_id, "Message authorized");
        Ok(MessageAuthorization {
            sender: sender_id.to_string(),
            recipient: recipient_id.to_string(),
            text: text.to_string(),
            authorized_at: self.clock.now(),
        })
    }

    pub async fn add_buddy(&self, user_id: &str, buddy_id: &str) -> Result<()> {
        self.registry.add_buddy(user_id, buddy_id).await
    }

    pub async fn discover_buddies(&self, viewer_id: &str) -> Vec<BuddySuggestion> {
        let viewer = self.snapshot_or_create(viewer_id).await;
        let users = self.registry.user_snapshots().await;
        suggestions_for(&viewer, &users)
    }

    pub async fn view_profile(&self, viewer_id: &str, owner_id: &str) -> Result<ProfileView> {
        let owner = self
            .registry
            .user_snapshot(owner_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", owner_id)))?;
        let viewer = self.snapshot_or_create(viewer_id).await;
        profile_for(&owner, &viewer)
            .ok_or_else(|| AppError::PolicyDenied("this profile is not shared with you".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_redacts_undisclosed_fields() {
        let mut owner = User::new("o", Some("Olive Oak"), 0);
        owner.city = "Atlanta".to_string();
        owner.organization = "HealthCo".to_string();
        owner.privacy.profile_visibility = Audience::Public;
        owner.privacy.show_city = true;
        let viewer = User::new("v", None, 1);

        let view = profile_for(&owner, &viewer).unwrap();
        assert_eq!(view.city.as_deref(), Some("Atlanta"));
        assert_eq!(view.organization, None);

        // Owners always see their own fields.
        let own = profile_for(&owner, &owner).unwrap();
        assert_eq!(own.organization.as_deref(), Some("HealthCo"));
    }

    #[test]
    fn test_profile_hidden_from_strangers_by_default() {
        let owner = User::new("o", None, 0);
        let mut viewer = User::new("v", None, 1);
        assert!(profile_for(&owner, &viewer).is_none());

        let mut owner = owner;
        owner.buddies.insert("v".to_string());
        viewer.buddies.insert("o".to_string());
        assert!(profile_for(&owner, &viewer).is_some());
    }

    #[test]
    fn test_discovery_requires_opt_in_and_match() {
        let mut viewer = User::new("v", None, 0);
        viewer.city = "Atlanta".to_string();

        let mut opted = User::new("a", None, 1);
        opted.city = "atlanta".to_string();
        opted.privacy.discoverable_by_city = true;

        let mut quiet = User::new("b", None, 2);
        quiet.city = "Atlanta".to_string();

        let mut elsewhere = User::new("c", None, 3);
        elsewhere.city = "Boston".to_string();
        elsewhere.privacy.discoverable_by_city = true;

        let found = suggestions_for(&viewer, &[viewer.clone(), opted, quiet, elsewhere]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_id, "a");
        assert!(found[0].same_city);
    }

    #[test]
    fn test_empty_attributes_never_match() {
        let viewer = User::new("v", None, 0);
        let mut other = User::new("a", None, 1);
        other.privacy.discoverable_by_city = true;
        other.privacy.discoverable_by_organization = true;
        assert!(suggestions_for(&viewer, &[other]).is_empty());
    }
}
