// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Privacy, photo, messaging, buddy and profile routes.

use crate::error::Result;
use crate::middleware::CallerId;
use crate::models::{Audience, MessageAuthorization, PhotoRef, PrivacySettings};
use crate::services::{BuddySuggestion, FeedItem, ProfileView};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/privacy", put(update_privacy))
        .route("/api/photos", get(photo_feed).post(save_photo))
        .route("/api/messages", post(send_message))
        .route("/api/buddies", post(add_buddy))
        .route("/api/buddies/discover", get(discover_buddies))
        .route("/api/profiles/{id}", get(view_profile))
}

async fn update_privacy(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(settings): Json<PrivacySettings>,
) -> Result<Json<PrivacySettings>> {
    Ok(Json(
        state.social.update_privacy(caller.as_str(), settings).await?,
    ))
}

// ─── Photos ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct SavePhotoRequest {
    audience: Option<Audience>,
    #[serde(default)]
    caption: String,
}

async fn save_photo(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(request): Json<SavePhotoRequest>,
) -> Result<(StatusCode, Json<PhotoRef>)> {
    let photo = state
        .social
        .save_photo(caller.as_str(), request.audience, &request.caption)
        .await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

async fn photo_feed(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
) -> Json<Vec<FeedItem>> {
    Json(state.social.photo_feed(caller.as_str()).await)
}

// ─── Messages ────────────────────────────────────────────────

#[derive(Deserialize)]
struct MessageRequest {
    recipient_id: String,
    text: String,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageAuthorization>> {
    Ok(Json(
        state
            .social
            .send_message(caller.as_str(), &request.recipient_id, &request.text)
            .await?,
    ))
}

// ─── Buddies & Profiles ──────────────────────────────────────

#[derive(Deserialize)]
struct AddBuddyRequest {
    buddy_id: String,
}

async fn add_buddy(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Json(request): Json<AddBuddyRequest>,
) -> Result<StatusCode> {
    state
        .social
        .add_buddy(caller.as_str(), request.buddy_id.trim())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn discover_buddies(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
) -> Json<Vec<BuddySuggestion>> {
    Json(state.social.discover_buddies(caller.as_str()).await)
}

async fn view_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerId>,
    Path(owner_id): Path<String>,
) -> Result<Json<ProfileView>> {
    Ok(Json(
        state.social.view_profile(caller.as_str(), &owner_id).await?,
    ))
}
