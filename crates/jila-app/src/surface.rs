// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render surface seam and the headless surface the desktop runner uses.

use jila_core::error::{BridgeError, Result};
use tracing::{debug, info};

/// Window-relative rectangle in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

/// One rendered frame of the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub title: String,
    /// Where the panel is placed: the safe area at render time.
    pub rect: Rect,
    pub font_scale: f32,
    pub dpi_scale: f32,
    pub lines: Vec<String>,
}

/// Where frames are drawn.
pub trait RenderSurface {
    /// Drawable area not covered by notches, rounded corners or system bars.
    fn safe_area(&self) -> Rect;

    /// Content scale of the display the window is on.
    fn display_scale(&self) -> f32;

    /// The window changed size. Surfaces backed by a real window already
    /// know and can ignore this.
    fn resize(&mut self, _width: u32, _height: u32) {}

    fn present(&mut self, frame: &FrameView) -> Result<()>;

    fn close(&mut self);
}

/// Margins the system reserves on each edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Surface without a window: frames go to the log when they change.
#[derive(Debug)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    scale: f32,
    insets: Insets,
    last: Option<FrameView>,
    presented: usize,
    closed: bool,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale,
            insets: Insets::default(),
            last: None,
            presented: 0,
            closed: false,
        }
    }

    #[cfg(test)]
    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    /// Most recent frame presented.
    #[cfg(test)]
    pub fn last_frame(&self) -> Option<&FrameView> {
        self.last.as_ref()
    }

    #[cfg(test)]
    pub fn presented(&self) -> usize {
        self.presented
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl RenderSurface for HeadlessSurface {
    fn safe_area(&self) -> Rect {
        let Insets {
            top,
            bottom,
            left,
            right,
        } = self.insets;
        Rect {
            x: left as i32,
            y: top as i32,
            w: self.width.saturating_sub(left + right),
            h: self.height.saturating_sub(top + bottom),
        }
    }

    fn display_scale(&self) -> f32 {
        self.scale
    }

    fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "headless surface resized");
        self.width = width;
        self.height = height;
    }

    fn present(&mut self, frame: &FrameView) -> Result<()> {
        if self.closed {
            return Err(BridgeError::Bridge("render surface is closed".into()));
        }
        self.presented += 1;
        if self.last.as_ref() != Some(frame) {
            let r = frame.rect;
            info!(x = r.x, y = r.y, w = r.w, h = r.h, "{}", frame.title);
            for line in &frame.lines {
                info!("  {line}");
            }
            self.last = Some(frame.clone());
        }
        Ok(())
    }

    fn close(&mut self) {
        if !self.closed {
            debug!(frames = self.presented, "headless surface closed");
            self.closed = true;
        }
    }
}
