// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ChannelSpec, ResourceRef};

/// File name of the persisted configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent application settings.
///
/// Missing fields in a stored file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Host class implementing the capability surface (slash-separated).
    pub host_class: String,
    /// Title of the single application window.
    pub window_title: String,
    /// Notification channel created at startup and used for every post.
    pub channel: ChannelSpec,
    /// Id passed with each posted notification; reposting replaces it.
    pub notification_id: i32,
    /// Small icon shown with notifications.
    pub notification_icon: ResourceRef,
    /// Runtime permission requested by the "Grant permission" button.
    pub permission: String,
    /// Capacity of each text input buffer, terminator included.
    pub input_capacity: usize,
    /// Base font scale before display scaling.
    pub font_scale: f32,
    /// Target frame interval for the desktop runner.
    pub frame_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host_class: "dev/jila/JilaActivity".into(),
            window_title: "SDL, Dear ImGui and JNI!".into(),
            channel: ChannelSpec {
                id: "default".into(),
                name: "Default".into(),
                description: "Default notification channel".into(),
            },
            notification_id: 1,
            notification_icon: ResourceRef {
                name: "ic_launcher".into(),
                kind: "drawable".into(),
            },
            permission: "android.permission.POST_NOTIFICATIONS".into(),
            input_capacity: 50,
            font_scale: 1.5,
            frame_interval_ms: 16,
        }
    }
}

impl AppConfig {
    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Characters a text input can hold once the terminator slot is
    /// accounted for.
    pub fn max_input_chars(&self) -> usize {
        self.input_capacity.saturating_sub(1)
    }
}
