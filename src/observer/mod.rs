// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer Set (C5): four cooperative periodic tasks watching OS activity.
//!
//! Observers only read via the [`PlatformProbe`]; they never call the brain or
//! channel directly (spec §4.3) — each pushes [`Observation`]s into the
//! classifier's inbox.

pub mod clipboard;
pub mod clock_ticker;
pub mod idle;
pub mod platform;
pub mod window;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::observer::platform::PlatformProbe;
use crate::state::HubState;

/// A raw observation pushed from an observer task to the classifier.
#[derive(Debug, Clone)]
pub struct Observation {
    pub ts: i64,
    pub kind: ObservationKind,
}

#[derive(Debug, Clone)]
pub enum ObservationKind {
    ClipboardText(String),
    ClipboardImage,
    ActiveTitleChanged { title: String },
    TitleStable { title: String, duration_secs: u64 },
    IdleEntered,
    IdleExited { duration_secs: u64 },
    Tick { hour: u32, minute: u32, weekday: chrono::Weekday },
}

/// Spawn all four observer tasks on their own cadences (spec §4.3 table).
pub fn spawn_all(
    probe: Arc<dyn PlatformProbe>,
    state: Arc<HubState>,
    obs_tx: mpsc::Sender<Observation>,
    shutdown: CancellationToken,
) {
    clipboard::spawn(Arc::clone(&probe), Arc::clone(&state), obs_tx.clone(), shutdown.clone());
    window::spawn(Arc::clone(&probe), Arc::clone(&state), obs_tx.clone(), shutdown.clone());
    idle::spawn(Arc::clone(&probe), Arc::clone(&state), obs_tx.clone(), shutdown.clone());
    clock_ticker::spawn(Arc::clone(&state), obs_tx, shutdown);
}
