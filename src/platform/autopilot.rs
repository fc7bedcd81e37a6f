//! Demo autopilot
//!
//! Produces paddle input that chases the most dangerous ball, steering the
//! contact point off any punched holes.

use crate::sim::{Ball, TickInput, World};

/// Scan step when looking for solid paddle
const SCAN_STEP: f32 = 4.0;

#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// Preferred contact offset from the paddle center, as a fraction of the
    /// half-width; non-zero values give the ball some angle
    pub aim: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self { aim: 0.3 }
    }
}

impl Autopilot {
    /// Falling ball closest to the paddle, or the lowest ball otherwise
    pub fn threat(world: &World) -> Option<&Ball> {
        let lowest = |a: &&Ball, b: &&Ball| a.pos.y.total_cmp(&b.pos.y);
        world
            .balls
            .iter()
            .filter(|b| b.vel.y > 0.0)
            .max_by(lowest)
            .or_else(|| world.balls.iter().max_by(lowest))
    }

    pub fn input(&self, world: &World) -> TickInput {
        let Some(ball) = Self::threat(world) else {
            return TickInput::default();
        };
        let paddle = &world.paddle;
        let half = paddle.width / 2.0;
        let preferred = half - self.aim.clamp(-0.9, 0.9) * half;

        // Nearest paddle-relative offset to the preferred one that is solid
        let steps = (paddle.width / SCAN_STEP) as i32;
        let offset = (0..=steps)
            .flat_map(|i| [i, -i])
            .map(|i| preferred + i as f32 * SCAN_STEP)
            .find(|o| *o > 0.0 && *o < paddle.width && !paddle.holes.contains(*o))
            .unwrap_or(preferred);

        TickInput {
            pointer_x: Some(ball.pos.x - offset + half),
            ..TickInput::default()
        }
    }
}
