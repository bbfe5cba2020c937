// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Walking Buddies API Server
//!
//! Serves the gamification engine (points, streaks, challenges, battles,
//! leaderboards) to the web client over a JSON API.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use walking_buddies::{config::Config, time_utils::SystemClock, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        seeded_drops = config.collectible_seed.is_some(),
        "Starting Walking Buddies API"
    );

    // Build shared state around one in-memory registry
    let state = Arc::new(AppState::new(config.clone(), Arc::new(SystemClock)));
    tracing::info!(
        challenges = state.registry.challenges().await.len(),
        "Registry initialized"
    );

    // Build router
    let app = walking_buddies::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("walking_buddies=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
