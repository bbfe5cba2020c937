// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team model and role bookkeeping.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Captain,
    CoCaptain,
    Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub role: TeamRole,
}

/// A team. Members are kept in join order; a non-empty team has exactly
/// one captain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub members: Vec<TeamMember>,
    pub city: Option<String>,
    pub organization: Option<String>,
    /// Creation order, used for stable leaderboard ties
    pub seq: u64,
}

impl Team {
    pub fn new(name: &str, seq: u64) -> Self {
        Self {
            name: name.to_string(),
            members: Vec::new(),
            city: None,
            organization: None,
            seq,
        }
    }

    pub fn captain(&self) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.role == TeamRole::Captain)
            .map(|m| m.user_id.as_str())
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    pub fn role_of(&self, user_id: &str) -> Option<TeamRole> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.role)
    }

    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.user_id.clone()).collect()
    }

    /// Add a member: captain if the team is empty, otherwise player.
    /// Returns the role held after the call.
    pub fn add_member(&mut self, user_id: &str) -> TeamRole {
        if let Some(role) = self.role_of(user_id) {
            return role;
        }
        let role = if self.members.is_empty() {
            TeamRole::Captain
        } else {
            TeamRole::Player
        };
        self.members.push(TeamMember {
            user_id: user_id.to_string(),
            role,
        });
        role
    }

    /// Remove a member. A departing captain hands over to the first
    /// co-captain, else the longest-standing player.
    pub fn remove_member(&mut self, user_id: &str) -> bool {
        let Some(pos) = self.members.iter().position(|m| m.user_id == user_id) else {
            return false;
        };
        let removed = self.members.remove(pos);
        if removed.role == TeamRole::Captain {
            let successor = self
                .members
                .iter()
                .position(|m| m.role == TeamRole::CoCaptain)
                .or(if self.members.is_empty() { None } else { Some(0) });
            if let Some(idx) = successor {
                self.members[idx].role = TeamRole::Captain;
            }
        }
        true
    }

    /// Change a member's role. Naming a new captain demotes the old one
    /// to co-captain. Returns false if the user is not a member or the
    /// change would leave the team without a captain.
    pub fn set_role(&mut self, user_id: &str, role: TeamRole) -> bool {
        match self.role_of(user_id) {
            None => return false,
            Some(TeamRole::Captain) if role != TeamRole::Captain => return false,
            Some(_) => {}
        }
        if role == TeamRole::Captain {
            for member in self.members.iter_mut() {
                if member.role == TeamRole::Captain && member.user_id != user_id {
                    member.role = TeamRole::CoCaptain;
                }
            }
        }
        for member in self.members.iter_mut() {
            if member.user_id == user_id {
                member.role = role;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captains(team: &Team) -> usize {
        team.members
            .iter()
            .filter(|m| m.role == TeamRole::Captain)
            .count()
    }

    #[test]
    fn test_first_member_is_captain() {
        let mut team = Team::new("Comeback Kids", 0);
        assert_eq!(team.add_member("a"), TeamRole::Captain);
        assert_eq!(team.add_member("b"), TeamRole::Player);
        assert_eq!(team.add_member("a"), TeamRole::Captain);
        assert_eq!(team.members.len(), 2);
        assert_eq!(team.captain(), Some("a"));
    }

    #[test]
    fn test_captain_departure_promotes_co_captain() {
        let mut team = Team::new("t", 0);
        team.add_member("a");
        team.add_member("b");
        team.add_member("c");
        team.set_role("c", TeamRole::CoCaptain);

        assert!(team.remove_member("a"));
        assert_eq!(team.captain(), Some("c"));
        assert_eq!(captains(&team), 1);
    }

    #[test]
    fn test_captain_departure_without_co_captain_promotes_first_player() {
        let mut team = Team::new("t", 0);
        team.add_member("a");
        team.add_member("b");
        team.add_member("c");

        team.remove_member("a");
        assert_eq!(team.captain(), Some("b"));

        team.remove_member("b");
        team.remove_member("c");
        assert_eq!(team.captain(), None);
        assert!(!team.remove_member("c"));
    }

    #[test]
    fn test_new_captain_demotes_old() {
        let mut team = Team::new("t", 0);
        team.add_member("a");
        team.add_member("b");

        assert!(team.set_role("b", TeamRole::Captain));
        assert_eq!(team.captain(), Some("b"));
        assert_eq!(team.role_of("a"), Some(TeamRole::CoCaptain));
        assert_eq!(captains(&team), 1);
        assert!(!team.set_role("zed", TeamRole::Player));
        assert!(!team.set_role("b", TeamRole::Player));
    }
}
