// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration for the hub.

use std::time::Duration;

/// Configuration for the companion hub process.
#[derive(Debug, Clone, clap::Parser)]
pub struct HubConfig {
    /// Host to bind on. Must be a loopback address.
    #[arg(long, default_value = "127.0.0.1", env = "HUB_HOST")]
    pub host: String,

    /// Port to listen on for the WebSocket channel and `/healthz`.
    #[arg(long, default_value_t = 9320, env = "HUB_PORT")]
    pub port: u16,

    /// Heartbeat interval in milliseconds.
    #[arg(long, default_value_t = 30_000, env = "HUB_HEARTBEAT_MS")]
    pub heartbeat_ms: u64,

    /// Clipboard observer poll interval in milliseconds.
    #[arg(long, default_value_t = 500, env = "HUB_CLIPBOARD_POLL_MS")]
    pub clipboard_poll_ms: u64,

    /// Active-window observer poll interval in milliseconds.
    #[arg(long, default_value_t = 5_000, env = "HUB_WINDOW_POLL_MS")]
    pub window_poll_ms: u64,

    /// Idle detector poll interval in milliseconds.
    #[arg(long, default_value_t = 10_000, env = "HUB_IDLE_POLL_MS")]
    pub idle_poll_ms: u64,

    /// Wall-clock ticker interval in milliseconds.
    #[arg(long, default_value_t = 60_000, env = "HUB_CLOCK_TICK_MS")]
    pub clock_tick_ms: u64,

    /// Global minimum interval between any two trigger fires, in milliseconds.
    #[arg(long, default_value_t = 8_000, env = "HUB_GLOBAL_COOLDOWN_MS")]
    pub global_cooldown_ms: u64,

    /// Default per-trigger cooldown for triggers with no table entry, in milliseconds.
    #[arg(long, default_value_t = 30_000, env = "HUB_DEFAULT_COOLDOWN_MS")]
    pub default_cooldown_ms: u64,

    /// Low-importance batch window duration, in milliseconds.
    #[arg(long, default_value_t = 10_000, env = "HUB_BATCH_WINDOW_MS")]
    pub batch_window_ms: u64,

    /// Per-call timeout for the platform probe (shells out), in milliseconds.
    #[arg(long, default_value_t = 4_000, env = "HUB_PROBE_TIMEOUT_MS")]
    pub probe_timeout_ms: u64,

    /// Per-call timeout for the external model API, in milliseconds.
    #[arg(long, default_value_t = 20_000, env = "HUB_MODEL_TIMEOUT_MS")]
    pub model_timeout_ms: u64,

    /// Health-check / metrics report interval, in milliseconds.
    #[arg(long, default_value_t = 15_000, env = "HUB_METRICS_MS")]
    pub metrics_ms: u64,

    /// Base URL of the external model API. Absent disables real model calls;
    /// brain triggers fall back to a local stub responder.
    #[arg(long, env = "HUB_MODEL_API_BASE")]
    pub model_api_base: Option<String>,

    /// API key for the external model API.
    #[arg(long, env = "HUB_MODEL_API_KEY")]
    pub model_api_key: Option<String>,

    /// Telegram bot token. Absent disables the chat-bot transport for the
    /// natural-language command parser.
    #[arg(long, env = "HUB_TELEGRAM_TOKEN")]
    pub telegram_token: Option<String>,
}

impl HubConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ms)
    }

    pub fn clipboard_poll_interval(&self) -> Duration {
        Duration::from_millis(self.clipboard_poll_ms)
    }

    pub fn window_poll_interval(&self) -> Duration {
        Duration::from_millis(self.window_poll_ms)
    }

    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn clock_tick_interval(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }

    pub fn global_cooldown(&self) -> Duration {
        Duration::from_millis(self.global_cooldown_ms)
    }

    pub fn default_cooldown(&self) -> Duration {
        Duration::from_millis(self.default_cooldown_ms)
    }

    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.batch_window_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_ms)
    }
}

#[cfg(test)]
impl Default for HubConfig {
    /// Test-only default. Production configuration always goes through
    /// `clap::Parser::parse`.
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 0,
            heartbeat_ms: 30_000,
            clipboard_poll_ms: 500,
            window_poll_ms: 5_000,
            idle_poll_ms: 10_000,
            clock_tick_ms: 60_000,
            global_cooldown_ms: 8_000,
            default_cooldown_ms: 30_000,
            batch_window_ms: 10_000,
            probe_timeout_ms: 4_000,
            model_timeout_ms: 20_000,
            metrics_ms: 15_000,
            model_api_base: None,
            model_api_key: None,
            telegram_token: None,
        }
    }
}
