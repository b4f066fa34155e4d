// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic health/metrics reporting (SPEC_FULL.md §11 ambient supplement,
//! grounded in the teacher's health-check poller shape).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::state::{epoch_ms, HubState};

/// Process-lifetime counters, incremented by the pipeline stages as triggers
/// move through them. Exposed both via `/healthz` and the periodic
/// `metrics_report` channel event.
#[derive(Default)]
pub struct Metrics {
    pub observations_total: AtomicU64,
    pub triggers_classified_total: AtomicU64,
    pub triggers_admitted_total: AtomicU64,
    pub brain_invocations_total: AtomicU64,
}

impl Metrics {
    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "observationsTotal": self.observations_total.load(Ordering::Relaxed),
            "triggersClassifiedTotal": self.triggers_classified_total.load(Ordering::Relaxed),
            "triggersAdmittedTotal": self.triggers_admitted_total.load(Ordering::Relaxed),
            "brainInvocationsTotal": self.brain_invocations_total.load(Ordering::Relaxed),
        })
    }
}

/// Spawn a task that periodically emits a `metrics_report` event to the
/// connected peer, if any. A no-op when no peer is connected.
pub fn spawn_reporter(state: Arc<HubState>, shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.metrics_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            state
                .send_to_peer(&json!({
                    "type": "metrics_report",
                    "payload": state.metrics.snapshot(),
                    "timestamp": epoch_ms(),
                }))
                .await;
        }
    });
}
