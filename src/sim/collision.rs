//! Collision detection and response for one ball sub-step
//!
//! Each resolver moves the ball out of whatever it hit and rewrites its
//! velocity. They report what happened; scoring and cues are left to the
//! caller.

use glam::Vec2;

use super::grid::{Behavior, Grid, GridLayout, behavior};
use super::state::{Ball, Enemy, Paddle, Playfield};
use crate::consts::*;
use crate::sign_or_positive;

/// Outcome of the wall check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallContact {
    None,
    /// Bounced off the left, right or top edge
    Bounce,
    /// Fell past the bottom edge
    Lost,
}

/// Reflect off the left, right and top edges; detect the bottom edge
pub fn resolve_walls(ball: &mut Ball, field: &Playfield) -> WallContact {
    let mut bounced = false;
    if ball.pos.x - ball.radius < 0.0 {
        ball.pos.x = ball.radius;
        ball.vel.x = ball.vel.x.abs();
        bounced = true;
    } else if ball.pos.x + ball.radius > field.width {
        ball.pos.x = field.width - ball.radius;
        ball.vel.x = -ball.vel.x.abs();
        bounced = true;
    }
    if ball.pos.y - ball.radius < 0.0 {
        ball.pos.y = ball.radius;
        ball.vel.y = ball.vel.y.abs();
        bounced = true;
    }

    if ball.pos.y + ball.radius > field.height {
        WallContact::Lost
    } else if bounced {
        WallContact::Bounce
    } else {
        WallContact::None
    }
}

/// Bounce off the paddle top. Returns false when the ball misses, is moving
/// up, or lands over a hole.
pub fn resolve_paddle(ball: &mut Ball, paddle: &Paddle, speed: f32, speed_multiplier: f32) -> bool {
    if ball.vel.y <= 0.0 {
        return false;
    }
    let vertical = ball.pos.y + ball.radius > paddle.y && ball.pos.y - ball.radius < paddle.y + paddle.height;
    let horizontal = ball.pos.x > paddle.x && ball.pos.x < paddle.x + paddle.width;
    if !vertical || !horizontal || paddle.is_hole_at(ball.pos.x) {
        return false;
    }

    let offset = ((ball.pos.x - paddle.center_x()) / (paddle.width / 2.0)).clamp(-1.0, 1.0);
    let min_dx = PADDLE_MIN_DEFLECT * speed_multiplier;
    let mut dx = offset * speed * PADDLE_DEFLECT;
    if dx.abs() < min_dx {
        dx = sign_or_positive(offset) * min_dx;
    }
    ball.vel = Vec2::new(dx, -speed);
    ball.pos.y = paddle.y - ball.radius;
    ball.clamp_velocity();
    true
}

/// Axis-aligned overlap between a ball's bounding square and a box
#[inline]
pub fn ball_overlaps_box(ball: &Ball, min: Vec2, max: Vec2) -> bool {
    let r = Vec2::splat(ball.radius);
    let (bmin, bmax) = (ball.pos - r, ball.pos + r);
    bmin.x < max.x && bmax.x > min.x && bmin.y < max.y && bmax.y > min.y
}

/// Axis chosen for a box bounce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Point the velocity away from a box's center along the axis where the
/// ball sits further out (offset normalized by the box half-extent). The
/// component keeps its magnitude.
pub fn reflect_off_box(ball: &mut Ball, min: Vec2, max: Vec2) -> Axis {
    let center = (min + max) / 2.0;
    let half = ((max - min) / 2.0).max(Vec2::splat(f32::EPSILON));
    let rel = (ball.pos - center) / half;
    if rel.x.abs() > rel.y.abs() {
        ball.vel.x = sign_or_positive(rel.x) * ball.vel.x.abs();
        Axis::X
    } else {
        ball.vel.y = sign_or_positive(rel.y) * ball.vel.y.abs();
        Axis::Y
    }
}

/// Place the ball just outside a box along `axis`, on its own side
pub fn push_out_of_box(ball: &mut Ball, min: Vec2, max: Vec2, axis: Axis) {
    let center = (min + max) / 2.0;
    match axis {
        Axis::X if ball.pos.x >= center.x => ball.pos.x = max.x + ball.radius,
        Axis::X => ball.pos.x = min.x - ball.radius,
        Axis::Y if ball.pos.y >= center.y => ball.pos.y = max.y + ball.radius,
        Axis::Y => ball.pos.y = min.y - ball.radius,
    }
}

/// Index of the first enemy the ball overlaps, bouncing off it. Enemies
/// killed earlier in the same tick are skipped.
pub fn resolve_enemies(ball: &mut Ball, enemies: &[Enemy]) -> Option<usize> {
    let idx = enemies
        .iter()
        .position(|e| !e.dead && ball_overlaps_box(ball, e.pos, e.pos + e.size))?;
    let enemy = &enemies[idx];
    reflect_off_box(ball, enemy.pos, enemy.pos + enemy.size);
    Some(idx)
}

/// The points sampled against the grid, in priority order
pub fn sample_points(ball: &Ball) -> [Vec2; 5] {
    let (p, r) = (ball.pos, ball.radius);
    [
        p,
        p + Vec2::new(r, 0.0),
        p - Vec2::new(r, 0.0),
        p + Vec2::new(0.0, r),
        p - Vec2::new(0.0, r),
    ]
}

/// A grid cell the ball bounced off
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHit {
    pub col: usize,
    pub row: usize,
    pub material: u8,
    pub behavior: Behavior,
    /// Screen-space center of the cell
    pub center: Vec2,
}

/// Bounce off the first occupied cell under a sample point, clearing it if
/// destructible. Resolves at most one cell.
pub fn resolve_grid(ball: &mut Ball, grid: &mut Grid, layout: &GridLayout) -> Option<GridHit> {
    if grid.is_degenerate() {
        return None;
    }
    let (col, row, material) = sample_points(ball).into_iter().find_map(|point| {
        let (col, row) = layout.cell_at(grid, point)?;
        let material = grid.get(col, row)?;
        (behavior(material) != Behavior::Empty).then_some((col, row, material))
    })?;

    let (min, max) = layout.cell_bounds(col, row);
    let axis = reflect_off_box(ball, min, max);
    push_out_of_box(ball, min, max, axis);

    let kind = behavior(material);
    if kind == Behavior::Destructible {
        grid.clear(col, row);
    }
    Some(GridHit {
        col,
        row,
        material,
        behavior: kind,
        center: (min + max) / 2.0,
    })
}
