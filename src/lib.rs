//! Pixel Breaker - a breakout game against pixel-art figures
//!
//! Core modules:
//! - `sim`: Simulation (physics, collisions, enemies, level data)
//! - `flow`: Screen state machine and user intents
//! - `platform`: Viewport, input mapping and frame loop driving
//! - `persistence`: Key-value storage and saved progress
//! - `audio`: Sound cue dispatch to an external synthesizer

pub mod audio;
pub mod flow;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use audio::{AudioManager, AudioSink, SoundCue};
pub use flow::{Game, Intent, Screen, Snapshot};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Canvas width is capped for readability on wide screens
    pub const MAX_CANVAS_WIDTH: f32 = 1024.0;
    /// Client widths below this count as a phone
    pub const MOBILE_MAX_WIDTH: f32 = 640.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 120.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Horizontal displacement per tick while a direction is held
    pub const PADDLE_SPEED: f32 = 8.0;
    /// Distance from the bottom edge on desktop layouts
    pub const PADDLE_DESKTOP_MARGIN: f32 = 60.0;
    /// Paddle sits at this fraction of the height on touch devices
    pub const PADDLE_TOUCH_FRACTION: f32 = 0.75;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 6.0;
    /// Base per-tick speed, scaled by the speed multiplier
    pub const BALL_SPEED: f32 = 4.0;
    /// Per-axis velocity clamp
    pub const BALL_MAX_AXIS_SPEED: f32 = 12.0;
    /// Maximum concurrent balls
    pub const MAX_BALLS: usize = 6;
    /// Paddle deflection gain applied to the normalized hit offset
    pub const PADDLE_DEFLECT: f32 = 1.5;
    /// Minimum horizontal speed after a paddle hit (scaled by multiplier)
    pub const PADDLE_MIN_DEFLECT: f32 = 0.8;

    /// Figure grid layout
    pub const MAX_CELL_SIZE: f32 = 8.0;
    pub const MIN_CELL_SIZE: f32 = 1.0;
    pub const FIGURE_WIDTH_FRACTION: f32 = 0.9;
    pub const FIGURE_TOP: f32 = 60.0;
    pub const SWAMP_FLOAT_AMPLITUDE: f32 = 24.0;
    pub const SWAMP_FLOAT_RATE: f32 = 0.02;

    /// Enemies roam the top part of the playfield
    pub const ENEMY_ZONE: f32 = 0.7;
    /// Enemy sprites are 11x11 cells
    pub const ENEMY_SPRITE_CELLS: f32 = 11.0;
    pub const FIRE_COOLDOWN_TICKS: u32 = 120;

    /// Projectiles
    pub const PROJECTILE_SPEED: f32 = 3.0;
    pub const PROJECTILE_WIDTH: f32 = 9.0;
    pub const PROJECTILE_HEIGHT: f32 = 12.0;

    /// Particles
    pub const PARTICLE_DECAY: f32 = 0.02;
    pub const DEBRIS_PARTICLES: usize = 4;
    pub const EXPLOSION_PARTICLES: usize = 24;

    /// Scoring
    pub const CELL_SCORE: u64 = 10;
    pub const ENEMY_TOUCH_SCORE: u64 = 25;
    pub const ENEMY_KILL_SCORE: u64 = 500;

    /// Speed multiplier range
    pub const SPEED_MIN: f32 = 0.5;
    pub const SPEED_MAX: f32 = 1.5;
}

/// Neon palette used for cosmetic recoloring (0xRRGGBB)
pub const NEON_COLORS: [u32; 7] = [
    0x39FF14, 0xFF007F, 0x00F3FF, 0xFAFF00, 0xBC13FE, 0xFF5F1F, 0xFF3131,
];

/// Sign of `v`, treating zero as positive
#[inline]
pub fn sign_or_positive(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}
