// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Caller identity middleware.
//!
//! Authentication happens upstream; the identity layer forwards a stable
//! user id in the `X-User-Id` header. Requests without one are rejected.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

pub const USER_ID_HEADER: &str = "x-user-id";

const MAX_USER_ID_LEN: usize = 128;

/// Identity of the caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Middleware that requires a caller id.
pub async fn require_identity(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_USER_ID_LEN)
        .map(str::to_string)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(CallerId(user_id));
    Ok(next.run(request).await)
}
