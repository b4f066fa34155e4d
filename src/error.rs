// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy (see spec §7: ERROR HANDLING DESIGN).
//!
//! `TransientIo` and `Parse` are absorbed locally by their callers (logged via
//! `tracing`, never propagated) at each of the points spec §7 names: the
//! platform probe (`src/observer/platform.rs`), the model API client
//! (`src/brain/model.rs`), and the inbound command parser
//! (`src/channel/commands.rs`). `ClassifierConsistency` is the one variant
//! allowed to abort the process — it signals a logic bug (history observed
//! out of emission order, violating spec §5's ordering guarantee), never a
//! runtime condition, and is raised from `Classifier::classify`
//! (`src/classifier/mod.rs`).

/// Internal error taxonomy shared by the observer, classifier, and brain
/// pipelines.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Platform probe call timed out or failed, or the external model API was
    /// unreachable. Absorbed: treated as an empty result by the caller.
    #[error("transient I/O error: {0}")]
    TransientIo(String),

    /// Malformed inbound JSON or an unparsable model response. Absorbed: the
    /// offending unit is dropped.
    #[error("parse error: {0}")]
    Parse(String),

    /// A history buffer was observed out of emission order. Never expected to
    /// occur in practice; propagating this aborts the process.
    #[error("classifier consistency error: {0}")]
    ClassifierConsistency(String),
}
