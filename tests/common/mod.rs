// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::NaiveDate;
use std::sync::Arc;
use walking_buddies::config::Config;
use walking_buddies::routes::create_router;
use walking_buddies::time_utils::FixedClock;
use walking_buddies::AppState;

/// Monday 2026-10-19, the default "today" for tests.
#[allow(dead_code)]
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Engine state pinned to noon on `today`. The returned clock is shared
/// with the state, so advancing it moves every service.
#[allow(dead_code)]
pub fn test_state_at(today: NaiveDate) -> (Arc<AppState>, FixedClock) {
    let clock = FixedClock::at_date(today);
    let state = Arc::new(AppState::new(
        Config::test_default(),
        Arc::new(clock.clone()),
    ));
    (state, clock)
}

#[allow(dead_code)]
pub fn test_state() -> (Arc<AppState>, FixedClock) {
    test_state_at(monday())
}

/// Create a test app with an in-memory registry and a fixed clock.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let (state, _clock) = test_state();
    (create_router(state.clone()), state)
}

/// Build a request as `user`, with an optional JSON body.
#[allow(dead_code)]
pub fn request(
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
