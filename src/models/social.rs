// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! References to user-shared content. The engine stores only metadata;
//! media bytes and message delivery live elsewhere.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::privacy::Audience;

/// A named route walked on a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    pub name: String,
    pub distance_km: f64,
    pub notes: String,
    pub audience: Audience,
    pub date: NaiveDate,
}

/// Pointer to a photo held by external media storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRef {
    pub id: u64,
    pub owner: String,
    pub audience: Audience,
    pub caption: String,
    pub posted_at: NaiveDateTime,
}

/// Friend invite sent by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    pub inviter: String,
    pub email: String,
    pub sent_at: NaiveDateTime,
}

/// Permission for the messaging transport to deliver one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAuthorization {
    pub sender: String,
    pub recipient: String,
    pub text: String,
    pub authorized_at: NaiveDateTime,
}
