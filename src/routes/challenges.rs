// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge and battle routes.

use crate::error::Result;
use crate::middleware::CallerId;
use crate::models::{AwardOutcome, Battle, BattleScore, Challenge, UserChallengeState};
use crate::services::{ChallengeStatus, NewBattle, NewCustomChallenge};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/challenges", get(list_challenges).post(create_challenge))
        .route("/api/challenges/{id}/join", post(join_challenge))
        .route("/api/challenges/{id}/leave", post(leave_challenge))
        .route("/api/challenges/{id}/check", post(check_challenge))
        .route("/api/battles", post(create_battle))
        .route("/api/battles/{id}/score", get(battle_score))
        .route("/api/battles/{id}/award", post(award_battle))
}

// ─── Challenges ──────────────────────────────────────────────

async fn list_challenges(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
) -> Json<Vec<ChallengeStatus>> {
    Json(state.challenges.list(caller.as_str()).await)
}

async fn create_challenge(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(request): Json<NewCustomChallenge>,
) -> Result<(StatusCode, Json<Challenge>)> {
    let challenge = state
        .challenges
        .create_custom(caller.as_str(), &request)
        .await?;
    Ok((StatusCode::CREATED, Json(challenge)))
}

async fn join_challenge(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Path(challenge_id): Path<String>,
) -> Result<Json<UserChallengeState>> {
    Ok(Json(
        state.challenges.join(caller.as_str(), &challenge_id).await?,
    ))
}

async fn leave_challenge(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Path(challenge_id): Path<String>,
) -> Result<StatusCode> {
    state.challenges.leave(caller.as_str(), &challenge_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub completed: bool,
}

async fn check_challenge(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Path(challenge_id): Path<String>,
) -> Result<Json<CheckResponse>> {
    let completed = state
        .challenges
        .check(caller.as_str(), &challenge_id)
        .await?;
    Ok(Json(CheckResponse { completed }))
}

// ─── Battles ─────────────────────────────────────────────────

async fn create_battle(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(request): Json<NewBattle>,
) -> Result<(StatusCode, Json<Battle>)> {
    tracing::debug!(caller = caller.as_str(), name = %request.name, "Creating battle");
    let battle = state.battles.create(&request).await?;
    Ok((StatusCode::CREATED, Json(battle)))
}

async fn battle_score(
    State(state): State<Arc<AppState>>,
    Path(battle_id): Path<u64>,
) -> Result<Json<BattleScore>> {
    Ok(Json(state.battles.compute_score(battle_id).await?))
}

async fn award_battle(
    State(state): State<Arc<AppState>>,
    Path(battle_id): Path<u64>,
) -> Result<Json<AwardOutcome>> {
    Ok(Json(state.battles.award(battle_id).await?))
}
