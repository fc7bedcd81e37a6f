//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed per-tick displacement only
//! - Seeded RNG only (gameplay and cosmetic streams kept apart)
//! - Stable iteration order (by insertion)
//! - No rendering or platform dependencies

pub mod collision;
pub mod completion;
pub mod enemy;
pub mod grid;
pub mod holes;
pub mod levels;
pub mod state;
pub mod tick;

pub use enemy::{FireGate, FireRule};
pub use grid::{Behavior, Grid, GridError, GridLayout, behavior, material, material_color};
pub use holes::{HoleSet, Span};
pub use levels::{EnemySpawn, LEVEL_COUNT, LevelDef, LevelError, Theme};
pub use state::{
    Ball, Enemy, EnemyKind, Flicker, Paddle, Particle, Playfield, Projectile, World,
};
pub use tick::{TickInput, TickOutcome, tick};
