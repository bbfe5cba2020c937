// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory entity registry with typed operations.
//!
//! Holds users, teams, challenges, per-user challenge state, battles and
//! shared content references. Every mutable record sits behind its own
//! async mutex so read-modify-write sequences on one entity are
//! serialized while unrelated entities proceed in parallel.
//!
//! Lock order: battle, then challenge state, then user, then team. Code
//! holding a team lock never waits on a user lock. Handles are cloned
//! out of the maps before awaiting so no shard guard is held across an
//! `.await`.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::{AppError, Result};
use crate::models::challenge::builtin_challenges;
use crate::models::social::Invite;
use crate::models::user::ProfileUpdate;
use crate::models::{
    Battle, Challenge, PhotoRef, Team, TeamRole, User, UserChallengeState, UserId,
};

/// A registry record shared between tasks.
pub type Shared<T> = Arc<Mutex<T>>;

type StateKey = (UserId, String);

struct Inner {
    users: DashMap<UserId, Shared<User>>,
    teams: DashMap<String, Shared<Team>>,
    challenges: RwLock<Vec<Challenge>>,
    challenge_states: DashMap<StateKey, Shared<UserChallengeState>>,
    battles: DashMap<u64, Shared<Battle>>,
    photos: RwLock<Vec<PhotoRef>>,
    invites: RwLock<Vec<Invite>>,
    seq: AtomicU64,
}

/// Registry handle. Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry seeded with the built-in challenge catalog.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                users: DashMap::new(),
                teams: DashMap::new(),
                challenges: RwLock::new(builtin_challenges()),
                challenge_states: DashMap::new(),
                battles: DashMap::new(),
                photos: RwLock::new(Vec::new()),
                invites: RwLock::new(Vec::new()),
                seq: AtomicU64::new(1),
            }),
        }
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.inner.seq.fetch_add(1, Ordering::Relaxed)
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Look up a user, creating an empty record on first reference.
    ///
    /// Existing users are returned untouched; `display_name` only seeds a
    /// brand-new record.
    pub fn get_or_create_user(&self, id: &str, display_name: Option<&str>) -> Shared<User> {
        if let Some(existing) = self.inner.users.get(id) {
            return existing.value().clone();
        }
        self.inner
            .users
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!(user_id = id, "Creating user");
                Arc::new(Mutex::new(User::new(id, display_name, self.next_seq())))
            })
            .value()
            .clone()
    }

    pub fn user(&self, id: &str) -> Option<Shared<User>> {
        self.inner.users.get(id).map(|u| u.value().clone())
    }

    /// Look up a user that must already exist.
    pub fn require_user(&self, id: &str) -> Result<Shared<User>> {
        self.user(id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Consistent copy of one user.
    pub async fn user_snapshot(&self, id: &str) -> Option<User> {
        let handle = self.user(id)?;
        let user = handle.lock().await;
        Some(user.clone())
    }

    /// Copies of every user in registration order.
    pub async fn user_snapshots(&self) -> Vec<User> {
        let handles: Vec<Shared<User>> = self.inner.users.iter().map(|e| e.value().clone()).collect();
        let mut users = Vec::with_capacity(handles.len());
        for handle in handles {
            users.push(handle.lock().await.clone());
        }
        users.sort_by_key(|u| u.seq);
        users
    }

    /// Apply an explicit profile save. This is the only path that
    /// overrides a display name.
    pub async fn save_profile(&self, id: &str, update: &ProfileUpdate) -> Result<User> {
        let display_name = update.display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::Validation(
                "display name must not be empty".to_string(),
            ));
        }

        let handle = self.get_or_create_user(id, Some(display_name));
        let mut user = handle.lock().await;
        user.display_name = display_name.to_string();
        user.city = update.city.trim().to_string();
        user.organization = update.organization.trim().to_string();
        user.activity_window = update.activity_window;

        tracing::info!(user_id = id, "Profile saved");
        Ok(user.clone())
    }

    /// Link two users as buddies in both directions.
    pub async fn add_buddy(&self, a: &str, b: &str) -> Result<()> {
        if a == b {
            return Err(AppError::Validation(
                "cannot add yourself as a buddy".to_string(),
            ));
        }
        let handle_b = self.require_user(b)?;
        let handle_a = self.get_or_create_user(a, None);

        // Fixed order so two opposite requests cannot deadlock.
        let (first, second) = if a < b {
            (&handle_a, &handle_b)
        } else {
            (&handle_b, &handle_a)
        };
        let mut first = first.lock().await;
        let mut second = second.lock().await;
        let first_id = first.id.clone();
        let second_id = second.id.clone();
        first.buddies.insert(second_id);
        second.buddies.insert(first_id);

        tracing::info!(user_id = a, buddy = b, "Buddies linked");
        Ok(())
    }

    // ─── Team Operations ─────────────────────────────────────────

    pub fn team(&self, name: &str) -> Option<Shared<Team>> {
        self.inner.teams.get(name).map(|t| t.value().clone())
    }

    pub fn require_team(&self, name: &str) -> Result<Shared<Team>> {
        self.team(name)
            .ok_or_else(|| AppError::NotFound(format!("Team {} not found", name)))
    }

    fn get_or_create_team(&self, name: &str) -> Shared<Team> {
        if let Some(existing) = self.inner.teams.get(name) {
            return existing.value().clone();
        }
        self.inner
            .teams
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::info!(team = name, "Creating team");
                Arc::new(Mutex::new(Team::new(name, self.next_seq())))
            })
            .value()
            .clone()
    }

    /// Copies of every team in creation order.
    pub async fn team_snapshots(&self) -> Vec<Team> {
        let handles: Vec<Shared<Team>> = self.inner.teams.iter().map(|e| e.value().clone()).collect();
        let mut teams = Vec::with_capacity(handles.len());
        for handle in handles {
            teams.push(handle.lock().await.clone());
        }
        teams.sort_by_key(|t| t.seq);
        teams
    }

    /// Current member ids of a team, or empty if the team does not exist.
    pub async fn team_member_ids(&self, name: &str) -> Vec<UserId> {
        match self.team(name) {
            Some(handle) => handle.lock().await.member_ids(),
            None => Vec::new(),
        }
    }

    /// Join a team, creating it if absent. The user first leaves any
    /// previous team. Returns the role held in the new team.
    pub async fn join_team(&self, user_id: &str, team_name: &str) -> Result<TeamRole> {
        let team_name = team_name.trim();
        if team_name.is_empty() {
            return Err(AppError::Validation(
                "team name must not be empty".to_string(),
            ));
        }

        let user_handle = self.get_or_create_user(user_id, None);
        let mut user = user_handle.lock().await;

        if let Some(previous) = user.team.clone() {
            if previous == team_name {
                if let Some(handle) = self.team(team_name) {
                    if let Some(role) = handle.lock().await.role_of(user_id) {
                        return Ok(role);
                    }
                }
            } else if let Some(handle) = self.team(&previous) {
                handle.lock().await.remove_member(user_id);
                tracing::info!(user_id, team = %previous, "Left previous team");
            }
        }

        let team_handle = self.get_or_create_team(team_name);
        let mut team = team_handle.lock().await;
        let role = team.add_member(user_id);
        if role == TeamRole::Captain {
            if team.city.is_none() && !user.city.is_empty() {
                team.city = Some(user.city.clone());
            }
            if team.organization.is_none() && !user.organization.is_empty() {
                team.organization = Some(user.organization.clone());
            }
        }
        user.team = Some(team_name.to_string());

        tracing::info!(user_id, team = team_name, role = ?role, "Joined team");
        Ok(role)
    }

    /// Leave the current team, if any. Returns the team left.
    pub async fn leave_team(&self, user_id: &str) -> Result<Option<String>> {
        let user_handle = self.require_user(user_id)?;
        let mut user = user_handle.lock().await;
        let Some(previous) = user.team.take() else {
            return Ok(None);
        };
        if let Some(handle) = self.team(&previous) {
            handle.lock().await.remove_member(user_id);
        }
        tracing::info!(user_id, team = %previous, "Left team");
        Ok(Some(previous))
    }

    /// Change a member's role. Only the team captain may do this.
    pub async fn set_member_role(
        &self,
        actor_id: &str,
        team_name: &str,
        member_id: &str,
        role: TeamRole,
    ) -> Result<()> {
        let handle = self.require_team(team_name)?;
        let mut team = handle.lock().await;
        if team.captain() != Some(actor_id) {
            return Err(AppError::PolicyDenied(
                "only the team captain can change roles".to_string(),
            ));
        }
        if !team.contains(member_id) {
            return Err(AppError::NotFound(format!(
                "User {} is not on team {}",
                member_id, team_name
            )));
        }
        if !team.set_role(member_id, role) {
            return Err(AppError::PolicyDenied(
                "name a new captain before stepping down".to_string(),
            ));
        }
        tracing::info!(team = team_name, member = member_id, role = ?role, "Role changed");
        Ok(())
    }

    // ─── Challenge Operations ────────────────────────────────────

    /// Built-in catalog followed by user-defined challenges in creation order.
    pub async fn challenges(&self) -> Vec<Challenge> {
        self.inner.challenges.read().await.clone()
    }

    pub async fn challenge(&self, id: &str) -> Result<Challenge> {
        self.inner
            .challenges
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Challenge {} not found", id)))
    }

    /// Append a user-defined challenge to the global catalog.
    pub async fn add_challenge(&self, challenge: Challenge) -> Result<()> {
        let mut challenges = self.inner.challenges.write().await;
        if challenges.iter().any(|c| c.id == challenge.id) {
            return Err(AppError::Conflict(format!(
                "Challenge {} already exists",
                challenge.id
            )));
        }
        challenges.push(challenge);
        Ok(())
    }

    /// Progress record for (user, challenge), created empty on first use.
    /// Only joining creates one.
    pub fn challenge_state(&self, user_id: &str, challenge_id: &str) -> Shared<UserChallengeState> {
        self.inner
            .challenge_states
            .entry((user_id.to_string(), challenge_id.to_string()))
            .or_default()
            .value()
            .clone()
    }

    /// Progress record for (user, challenge) if the user ever joined it.
    pub fn existing_challenge_state(
        &self,
        user_id: &str,
        challenge_id: &str,
    ) -> Option<Shared<UserChallengeState>> {
        self.inner
            .challenge_states
            .get(&(user_id.to_string(), challenge_id.to_string()))
            .map(|s| s.value().clone())
    }

    /// Challenge ids a user has any recorded state for.
    pub fn challenge_ids_for(&self, user_id: &str) -> Vec<String> {
        self.inner
            .challenge_states
            .iter()
            .filter(|e| e.key().0 == user_id)
            .map(|e| e.key().1.clone())
            .collect()
    }

    // ─── Battle Operations ───────────────────────────────────────

    /// Store a new battle, assigning its id.
    pub fn insert_battle(&self, mut battle: Battle) -> u64 {
        let id = self.next_seq();
        battle.id = id;
        self.inner.battles.insert(id, Arc::new(Mutex::new(battle)));
        id
    }

    pub fn battle(&self, id: u64) -> Result<Shared<Battle>> {
        self.inner
            .battles
            .get(&id)
            .map(|b| b.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("Battle {} not found", id)))
    }

    // ─── Shared Content ──────────────────────────────────────────

    /// Store a photo reference, assigning its id.
    pub async fn add_photo(&self, mut photo: PhotoRef) -> PhotoRef {
        photo.id = self.next_seq();
        self.inner.photos.write().await.push(photo.clone());
        photo
    }

    pub async fn photos(&self) -> Vec<PhotoRef> {
        self.inner.photos.read().await.clone()
    }

    pub async fn add_invite(&self, invite: Invite) {
        self.inner.invites.write().await.push(invite);
    }

    pub async fn invites(&self) -> Vec<Invite> {
        self.inner.invites.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let registry = Registry::new();
        let handle = registry.get_or_create_user("martha", Some("Martha"));
        handle.lock().await.points = 120;

        let again = registry.get_or_create_user("martha", Some("Someone Else"));
        let user = again.lock().await;
        assert_eq!(user.points, 120);
        assert_eq!(user.display_name, "Martha");
    }

    #[tokio::test]
    async fn test_save_profile_overrides_name() {
        let registry = Registry::new();
        registry.get_or_create_user("martha", Some("Martha"));

        let update = ProfileUpdate {
            display_name: "Martha Stewart".to_string(),
            city: " Atlanta ".to_string(),
            organization: "HealthCo".to_string(),
            activity_window: Default::default(),
        };
        let user = registry.save_profile("martha", &update).await.unwrap();
        assert_eq!(user.display_name, "Martha Stewart");
        assert_eq!(user.city, "Atlanta");
    }

    #[tokio::test]
    async fn test_join_team_moves_membership() {
        let registry = Registry::new();
        assert_eq!(
            registry.join_team("a", "Comeback Kids").await.unwrap(),
            TeamRole::Captain
        );
        assert_eq!(
            registry.join_team("b", "Comeback Kids").await.unwrap(),
            TeamRole::Player
        );
        assert_eq!(
            registry.join_team("a", "Night Owls").await.unwrap(),
            TeamRole::Captain
        );

        let kids = registry.team_member_ids("Comeback Kids").await;
        assert_eq!(kids, vec!["b".to_string()]);
        let team = registry.team("Comeback Kids").unwrap();
        assert_eq!(team.lock().await.captain(), Some("b"));

        let user = registry.user_snapshot("a").await.unwrap();
        assert_eq!(user.team.as_deref(), Some("Night Owls"));
    }

    #[tokio::test]
    async fn test_rejoin_same_team_keeps_role() {
        let registry = Registry::new();
        registry.join_team("a", "t").await.unwrap();
        registry.join_team("b", "t").await.unwrap();
        assert_eq!(registry.join_team("b", "t").await.unwrap(), TeamRole::Player);
        assert_eq!(registry.team_member_ids("t").await.len(), 2);
    }

    #[tokio::test]
    async fn test_only_captain_sets_roles() {
        let registry = Registry::new();
        registry.join_team("a", "t").await.unwrap();
        registry.join_team("b", "t").await.unwrap();

        let err = registry
            .set_member_role("b", "t", "b", TeamRole::CoCaptain)
            .await
            .unwrap_err();
        assert!(err.is_policy_denied());

        registry
            .set_member_role("a", "t", "b", TeamRole::CoCaptain)
            .await
            .unwrap();
        let team = registry.team("t").unwrap();
        assert_eq!(team.lock().await.role_of("b"), Some(TeamRole::CoCaptain));
    }

    #[tokio::test]
    async fn test_buddies_are_symmetric() {
        let registry = Registry::new();
        registry.get_or_create_user("b", None);
        registry.add_buddy("a", "b").await.unwrap();

        let a = registry.user_snapshot("a").await.unwrap();
        let b = registry.user_snapshot("b").await.unwrap();
        assert!(a.buddies.contains("b"));
        assert!(b.buddies.contains("a"));

        assert!(matches!(
            registry.add_buddy("a", "a").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            registry.add_buddy("a", "ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_challenge_id_conflicts() {
        let registry = Registry::new();
        let existing = registry.challenge("daily_5000").await.unwrap();
        let err = registry.add_challenge(existing).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
