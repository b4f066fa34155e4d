// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Platform Probe (C1): the operating-system signal surface.
//!
//! Out of scope per spec §1 — only its interface is specified here. The shell
//! implementation below shells out to common Linux desktop utilities so the
//! rest of the hub has something real to drive against; every call is bounded
//! by `probe_timeout` (spec §5) and absorbs failures as empty results rather
//! than propagating them (spec §7: `TransientIO`).

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;

/// A window entry as reported by the OS window manager.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WindowInfo {
    pub title: String,
    pub app: String,
}

/// Cursor position in screen coordinates.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CursorPos {
    pub x: i32,
    pub y: i32,
}

/// A downscaled screen capture, base64-encoded JPEG.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScreenCapture {
    pub image_base64: String,
    pub width: u32,
    pub height: u32,
}

/// A well-known user folder the command parser resolves file-operation
/// sources against (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownFolder {
    Desktop,
    Downloads,
    Documents,
}

/// The operating-system signal surface the hub observes and occasionally
/// queries on demand (`query_screen`, `query_windows`).
#[async_trait]
pub trait PlatformProbe: Send + Sync {
    async fn active_window_title(&self) -> Option<String>;
    async fn window_list(&self) -> Vec<WindowInfo>;
    async fn cursor_pos(&self) -> Option<CursorPos>;
    async fn idle_seconds(&self) -> Option<f64>;
    async fn capture_screen(&self) -> Option<ScreenCapture>;
    async fn clipboard_text(&self) -> Option<String>;
    async fn clipboard_image_present(&self) -> bool;

    /// Resolve a known folder to an absolute path (spec §4.2: smart file
    /// operation `source` resolution).
    fn known_folder_path(&self, folder: KnownFolder) -> Option<String>;
}

/// Target dimensions for downscaled screen captures (spec §4.5).
const CAPTURE_WIDTH: u32 = 960;
const CAPTURE_HEIGHT: u32 = 540;

/// A [`PlatformProbe`] backed by shelling out to Linux desktop utilities
/// (`xdotool`, `wmctrl`, `xprintidle`, `scrot`) and `arboard` for the clipboard.
pub struct ShellPlatformProbe {
    timeout: Duration,
}

impl ShellPlatformProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run a shell command, bounded by `self.timeout`. Returns `None` on
    /// timeout, non-zero exit, or spawn failure — all are `TransientIO`.
    async fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let fut = tokio::process::Command::new(program).args(args).output();
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(output)) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_owned())
            }
            Ok(Ok(_)) => None,
            Ok(Err(e)) => {
                let err = crate::error::HubError::TransientIo(format!("{program} failed to spawn: {e}"));
                tracing::debug!(program, %err, "platform probe command failed");
                None
            }
            Err(_) => {
                let err = crate::error::HubError::TransientIo(format!(
                    "{program} timed out after {}ms",
                    self.timeout.as_millis()
                ));
                tracing::debug!(program, %err, "platform probe command timed out");
                None
            }
        }
    }
}

#[async_trait]
impl PlatformProbe for ShellPlatformProbe {
    async fn active_window_title(&self) -> Option<String> {
        let id = self.run("xdotool", &["getactivewindow"]).await?;
        self.run("xdotool", &["getwindowname", id.trim()]).await
    }

    async fn window_list(&self) -> Vec<WindowInfo> {
        let Some(raw) = self.run("wmctrl", &["-l"]).await else { return Vec::new() };
        raw.lines()
            .filter_map(|line| {
                // `wmctrl -l` columns: id desktop pid host title...
                let title = line.splitn(4, char::is_whitespace).nth(3)?.trim().to_owned();
                if title.is_empty() {
                    return None;
                }
                let app = title.rsplit(" - ").next().unwrap_or(&title).to_owned();
                Some(WindowInfo { title, app })
            })
            .collect()
    }

    async fn cursor_pos(&self) -> Option<CursorPos> {
        let raw = self.run("xdotool", &["getmouselocation", "--shell"]).await?;
        let mut x = None;
        let mut y = None;
        for line in raw.lines() {
            if let Some(v) = line.strip_prefix("X=") {
                x = v.parse().ok();
            } else if let Some(v) = line.strip_prefix("Y=") {
                y = v.parse().ok();
            }
        }
        Some(CursorPos { x: x?, y: y? })
    }

    async fn idle_seconds(&self) -> Option<f64> {
        let raw = self.run("xprintidle", &[]).await?;
        let ms: f64 = raw.trim().parse().ok()?;
        Some(ms / 1000.0)
    }

    async fn capture_screen(&self) -> Option<ScreenCapture> {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("companion-hub-capture-{}.png", epoch_nanos()));
        let fut = tokio::process::Command::new("scrot")
            .args(["-o", &path.to_string_lossy()])
            .output();
        let captured = match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(output)) if output.status.success() => true,
            _ => false,
        };
        if !captured {
            return None;
        }

        let result = tokio::task::spawn_blocking(move || {
            let img = image::open(&path).ok()?;
            let resized = img.resize(
                CAPTURE_WIDTH,
                CAPTURE_HEIGHT,
                image::imageops::FilterType::Triangle,
            );
            let mut buf = Vec::new();
            let mut cursor = std::io::Cursor::new(&mut buf);
            resized
                .write_to(&mut cursor, image::ImageFormat::Jpeg)
                .ok()?;
            let _ = std::fs::remove_file(&path);
            Some((base64::engine::general_purpose::STANDARD.encode(&buf), resized.width(), resized.height()))
        })
        .await
        .ok()
        .flatten();

        result.map(|(image_base64, width, height)| ScreenCapture { image_base64, width, height })
    }

    async fn clipboard_text(&self) -> Option<String> {
        tokio::task::spawn_blocking(|| arboard::Clipboard::new().ok()?.get_text().ok())
            .await
            .ok()
            .flatten()
    }

    async fn clipboard_image_present(&self) -> bool {
        tokio::task::spawn_blocking(|| arboard::Clipboard::new().ok()?.get_image().ok())
            .await
            .ok()
            .flatten()
            .is_some()
    }

    fn known_folder_path(&self, folder: KnownFolder) -> Option<String> {
        let path = match folder {
            KnownFolder::Desktop => dirs::desktop_dir(),
            KnownFolder::Downloads => dirs::download_dir(),
            KnownFolder::Documents => dirs::document_dir(),
        };
        path.map(|p| p.to_string_lossy().into_owned())
    }
}

fn epoch_nanos() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

/// Test fixtures. Not gated behind `#[cfg(test)]` so integration tests under
/// `tests/` (compiled as a separate crate) can use them too, matching the
/// teacher's unconditional `test_support` module.
pub mod test_support {
    use super::*;
    use tokio::sync::Mutex;

    /// A scripted probe for tests: returns queued values, then defaults.
    #[derive(Default)]
    pub struct FakeProbe {
        pub titles: Mutex<Vec<String>>,
        pub clipboard: Mutex<Vec<String>>,
        pub idle: Mutex<Vec<f64>>,
    }

    #[async_trait]
    impl PlatformProbe for FakeProbe {
        async fn active_window_title(&self) -> Option<String> {
            self.titles.lock().await.pop()
        }
        async fn window_list(&self) -> Vec<WindowInfo> {
            Vec::new()
        }
        async fn cursor_pos(&self) -> Option<CursorPos> {
            Some(CursorPos { x: 0, y: 0 })
        }
        async fn idle_seconds(&self) -> Option<f64> {
            self.idle.lock().await.pop()
        }
        async fn capture_screen(&self) -> Option<ScreenCapture> {
            Some(ScreenCapture { image_base64: "fake".to_owned(), width: 960, height: 540 })
        }
        async fn clipboard_text(&self) -> Option<String> {
            self.clipboard.lock().await.pop()
        }
        async fn clipboard_image_present(&self) -> bool {
            false
        }
        fn known_folder_path(&self, folder: KnownFolder) -> Option<String> {
            Some(match folder {
                KnownFolder::Desktop => "/home/test/Desktop".to_owned(),
                KnownFolder::Downloads => "/home/test/Downloads".to_owned(),
                KnownFolder::Documents => "/home/test/Documents".to_owned(),
            })
        }
    }
}
