// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for walking, profile, teams, leaderboards and rewards.

use crate::error::Result;
use crate::middleware::CallerId;
use crate::models::reward::Reward;
use crate::models::user::{ActivityWindow, ProfileUpdate};
use crate::models::{Leaderboards, TeamRole};
use crate::services::{Dashboard, NewRoute, ScanResult, WalkInput, WalkOutcome};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require a caller id).
/// The identity middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/walks", post(record_walk))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/profile", put(save_profile))
        .route("/api/team/join", post(join_team))
        .route("/api/team/leave", post(leave_team))
        .route("/api/team/roles", put(set_member_role))
        .route("/api/leaderboards", get(get_leaderboards))
        .route("/api/rewards", get(get_rewards))
        .route("/api/rewards/{id}/redeem", post(redeem_reward))
        .route("/api/invites", post(invite_friend))
        .route("/api/routes", post(add_route))
        .route("/api/collectibles/scan", post(scan_collectible))
}

// ─── Walks ───────────────────────────────────────────────────

async fn record_walk(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(input): Json<WalkInput>,
) -> Result<Json<WalkOutcome>> {
    let outcome = state.points.record_walk(caller.as_str(), &input).await?;
    Ok(Json(outcome))
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
) -> Result<Json<Dashboard>> {
    Ok(Json(state.points.dashboard(caller.as_str()).await?))
}

// ─── Profile ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub user_id: String,
    pub display_name: String,
    pub city: String,
    pub organization: String,
    pub activity_window: ActivityWindow,
}

async fn save_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>> {
    update.validate()?;
    let user = state.registry.save_profile(caller.as_str(), &update).await?;
    Ok(Json(ProfileResponse {
        user_id: user.id,
        display_name: user.display_name,
        city: user.city,
        organization: user.organization,
        activity_window: user.activity_window,
    }))
}

// ─── Teams ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct JoinTeamRequest {
    team: String,
}

#[derive(Serialize)]
pub struct TeamMembershipResponse {
    pub team: Option<String>,
    pub role: Option<TeamRole>,
}

async fn join_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(request): Json<JoinTeamRequest>,
) -> Result<Json<TeamMembershipResponse>> {
    let role = state.registry.join_team(caller.as_str(), &request.team).await?;
    Ok(Json(TeamMembershipResponse {
        team: Some(request.team.trim().to_string()),
        role: Some(role),
    }))
}

async fn leave_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
) -> Result<Json<TeamMembershipResponse>> {
    state.registry.get_or_create_user(caller.as_str(), None);
    state.registry.leave_team(caller.as_str()).await?;
    Ok(Json(TeamMembershipResponse {
        team: None,
        role: None,
    }))
}

#[derive(Deserialize)]
struct SetRoleRequest {
    team: String,
    member_id: String,
    role: TeamRole,
}

async fn set_member_role(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<TeamMembershipResponse>> {
    state
        .registry
        .set_member_role(
            caller.as_str(),
            &request.team,
            &request.member_id,
            request.role,
        )
        .await?;
    Ok(Json(TeamMembershipResponse {
        team: Some(request.team),
        role: Some(request.role),
    }))
}

// ─── Leaderboards ────────────────────────────────────────────

async fn get_leaderboards(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
) -> Result<Json<Leaderboards>> {
    Ok(Json(
        state.leaderboards.get_leaderboards(caller.as_str()).await?,
    ))
}

// ─── Rewards ─────────────────────────────────────────────────

async fn get_rewards(State(state): State<Arc<AppState>>) -> Json<&'static [Reward]> {
    Json(state.rewards.catalog())
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BalanceResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub points: u64,
}

async fn redeem_reward(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Path(reward_id): Path<String>,
) -> Result<Json<BalanceResponse>> {
    let points = state.rewards.redeem(caller.as_str(), &reward_id).await?;
    Ok(Json(BalanceResponse { points }))
}

// ─── Invites, Routes, Collectibles ───────────────────────────

#[derive(Deserialize)]
struct InviteRequest {
    email: String,
}

async fn invite_friend(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(request): Json<InviteRequest>,
) -> Result<Json<BalanceResponse>> {
    let points = state
        .points
        .invite_friend(caller.as_str(), &request.email)
        .await?;
    Ok(Json(BalanceResponse { points }))
}

async fn add_route(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(route): Json<NewRoute>,
) -> Result<Json<crate::models::RouteEntry>> {
    Ok(Json(state.points.add_route(caller.as_str(), &route).await?))
}

async fn scan_collectible(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
) -> Result<Json<ScanResult>> {
    Ok(Json(state.collectibles.scan(caller.as_str()).await?))
}
