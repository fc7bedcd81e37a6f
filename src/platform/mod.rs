//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Viewport sizing and device class
//! - Input events reduced to per-tick intents
//! - Frame loop driving and teardown

pub mod autopilot;
pub mod frame_loop;

pub use autopilot::Autopilot;
pub use frame_loop::{CancelToken, FrameLoop};

use serde::Serialize;

use crate::consts::*;
use crate::flow::Intent;
use crate::sim::{Playfield, TickInput};

/// Rough device class from the client width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub fn from_width(client_width: f32) -> Self {
        if client_width < MOBILE_MAX_WIDTH {
            DeviceClass::Mobile
        } else if client_width < MAX_CANVAS_WIDTH {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }

    /// Touch layouts keep the paddle clear of the thumb
    pub fn is_touch(self) -> bool {
        !matches!(self, DeviceClass::Desktop)
    }
}

/// Canvas dimensions the game is laid out for
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub device: DeviceClass,
}

impl Viewport {
    /// Size from the client area; width is capped for readability
    pub fn new(client_width: f32, client_height: f32) -> Self {
        Self {
            width: client_width.min(MAX_CANVAS_WIDTH).max(1.0),
            height: client_height.max(1.0),
            device: DeviceClass::from_width(client_width),
        }
    }

    /// Top edge of the paddle
    pub fn paddle_y(&self) -> f32 {
        if self.device.is_touch() {
            self.height * PADDLE_TOUCH_FRACTION
        } else {
            (self.height - PADDLE_DESKTOP_MARGIN).max(0.0)
        }
    }

    pub fn playfield(&self) -> Playfield {
        Playfield::new(self.width, self.height, self.paddle_y())
    }
}

/// Raw key and pointer state between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    pointer_x: Option<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Held keys steer the paddle; others may map to a
    /// one-shot intent.
    pub fn key_down(&mut self, key: &str) -> Option<Intent> {
        match key {
            "ArrowLeft" | "a" | "A" => self.left = true,
            "ArrowRight" | "d" | "D" => self.right = true,
            "Escape" | "p" | "P" => return Some(Intent::TogglePause),
            "r" | "R" => return Some(Intent::Retry),
            "Enter" | "n" | "N" => return Some(Intent::NextLevel),
            "m" | "M" => return Some(Intent::ReturnToMenu),
            _ => {}
        }
        None
    }

    pub fn key_up(&mut self, key: &str) {
        match key {
            "ArrowLeft" | "a" | "A" => self.left = false,
            "ArrowRight" | "d" | "D" => self.right = false,
            _ => {}
        }
    }

    /// Pointer or touch position in canvas coordinates
    pub fn pointer_moved(&mut self, x: f32) {
        if x.is_finite() {
            self.pointer_x = Some(x);
        }
    }

    /// Release held keys, e.g. when the page loses focus
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// Input for the next tick. Pointer moves are consumed; held keys stay.
    pub fn take_tick_input(&mut self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            pointer_x: self.pointer_x.take(),
        }
    }
}
