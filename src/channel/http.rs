// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/healthz` liveness endpoint (SPEC_FULL.md §11), mirroring the teacher's
//! unauthenticated `GET /api/v1/health`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::channel::ChannelState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub peer_connected: bool,
}

pub async fn healthz(State(state): State<ChannelState>) -> impl IntoResponse {
    let peer_connected = state.hub.has_peer().await;
    Json(HealthResponse { status: "ok", peer_connected })
}
