// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application state owned by the frame loop.

use jila_core::AppConfig;

use crate::surface::{FrameView, Rect};

/// Lifecycle phase of the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Running,
    Quitting,
}

/// Fixed-capacity text input. Holds at most `capacity - 1` characters, the
/// last slot being reserved for the terminator the host UI expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    max_chars: usize,
}

impl InputBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            max_chars: capacity.saturating_sub(1),
        }
    }

    /// Replace the contents, dropping whatever does not fit.
    pub fn set(&mut self, value: &str) {
        let end = value
            .char_indices()
            .nth(self.max_chars)
            .map_or(value.len(), |(index, _)| index);
        self.text.clear();
        self.text.push_str(&value[..end]);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

/// Latest answer to a runtime permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionStatus {
    pub permission: String,
    pub granted: bool,
}

/// Everything the panel shows.
#[derive(Debug, Clone)]
pub struct AppState {
    pub phase: Phase,
    pub window_title: String,
    pub title: InputBuffer,
    pub message: InputBuffer,
    /// Text of the "Error:" line.
    pub error: String,
    /// Folder chosen through the picker; empty until one is chosen.
    pub folder_path: String,
    /// First entry of the selected folder, from the last lookup.
    pub item: String,
    pub permission: Option<PermissionStatus>,
    pub safe_area: Rect,
    pub font_scale: f32,
    pub dpi_scale: f32,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            phase: Phase::Init,
            window_title: config.window_title.clone(),
            title: InputBuffer::new(config.input_capacity),
            message: InputBuffer::new(config.input_capacity),
            error: String::new(),
            folder_path: String::new(),
            item: String::new(),
            permission: None,
            safe_area: Rect::default(),
            font_scale: config.font_scale,
            dpi_scale: 1.0,
        }
    }

    /// Lay out the panel for the current frame.
    pub fn view(&self) -> FrameView {
        let permission = match &self.permission {
            None => "Permission: not requested".to_owned(),
            Some(PermissionStatus {
                permission,
                granted: true,
            }) => format!("Permission: {permission} granted"),
            Some(PermissionStatus {
                permission,
                granted: false,
            }) => format!("Permission: {permission} denied"),
        };

        FrameView {
            title: self.window_title.clone(),
            rect: self.safe_area,
            font_scale: self.font_scale,
            dpi_scale: self.dpi_scale,
            lines: vec![
                "If notifications don't work, tap this button:".into(),
                "[Grant permission]".into(),
                format!("Title: {}", self.title.as_str()),
                format!("Message: {}", self.message.as_str()),
                format!("Error: {}", self.error),
                "[GetError]".into(),
                "[Push Notification]".into(),
                "[Open folder]".into(),
                "[Get first item from opened folder]".into(),
                format!("Current selected folder path: {}", self.folder_path),
                format!("Current file item path: {}", self.item),
                permission,
            ],
        }
    }
}
