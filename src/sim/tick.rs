//! Fixed-displacement simulation tick
//!
//! One call advances the world by one frame. Displacements are per tick, not
//! per second, so speed follows the display refresh rate.

use glam::Vec2;
use rand::Rng;

use super::collision::{self, WallContact};
use super::completion;
use super::enemy;
use super::grid::{Behavior, material_color};
use super::state::{Ball, World};
use crate::audio::SoundCue;
use crate::consts::*;

/// Input intents for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Move-left held
    pub left: bool,
    /// Move-right held
    pub right: bool,
    /// Absolute pointer/touch x; centers the paddle there
    pub pointer_x: Option<f32>,
}

/// How a tick ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The last ball left the playfield
    BallsLost,
    /// No destructible cells remain
    FigureCleared,
}

/// Advance the world by one tick
pub fn tick(world: &mut World, input: &TickInput) -> TickOutcome {
    world.frame += 1;

    move_paddle(world, input);
    if step_balls(world) {
        world.cue(SoundCue::Lose);
        return TickOutcome::BallsLost;
    }
    enemy::step_enemies(world);
    step_projectiles(world);
    step_particles(world);

    if completion::is_cleared(&world.grid) {
        return TickOutcome::FigureCleared;
    }
    TickOutcome::Continue
}

fn move_paddle(world: &mut World, input: &TickInput) {
    let paddle = &mut world.paddle;
    if let Some(x) = input.pointer_x {
        paddle.x = x - paddle.width / 2.0;
    }
    if input.left {
        paddle.x -= PADDLE_SPEED;
    }
    if input.right {
        paddle.x += PADDLE_SPEED;
    }
    paddle.clamp_to(world.field.width);
}

/// What one ball did during this tick
#[derive(Debug, Default)]
struct BallReport {
    lost: bool,
    paddle: bool,
    /// (enemy index, spawn a sibling)
    enemy: Option<(usize, bool)>,
    grid: Option<collision::GridHit>,
}

/// Integrate all balls. Returns true when none are left.
fn step_balls(world: &mut World) -> bool {
    let substeps = world.substeps.max(1);
    let speed = world.current_speed();
    let layout = world.grid_layout();
    let mut balls = std::mem::take(&mut world.balls);
    let existing = balls.len();
    let mut spawned: Vec<Ball> = Vec::new();
    let mut lost: Vec<u32> = Vec::new();

    for ball in balls.iter_mut() {
        let report = integrate_ball(world, ball, substeps, speed, &layout);

        if report.paddle {
            ball.color = world.random_neon();
            world.paddle.color = world.random_neon();
            world.cue(SoundCue::Paddle);
        }
        if let Some((idx, spawn)) = report.enemy {
            on_enemy_hit(world, idx);
            if spawn && existing + spawned.len() < MAX_BALLS {
                let vx = world.rng.random_range(-speed..=speed);
                let id = world.next_entity_id();
                let mut sibling = Ball::new(id, ball.pos, Vec2::new(vx, -speed));
                sibling.last_spawn_source = ball.last_spawn_source;
                spawned.push(sibling);
                world.cue(SoundCue::Spawn);
            }
        }
        if let Some(hit) = report.grid {
            on_grid_hit(world, &hit);
        }
        if report.lost {
            lost.push(ball.id);
        }
    }

    world.enemies.retain(|e| !e.dead);
    balls.retain(|b| !lost.contains(&b.id));
    let room = MAX_BALLS.saturating_sub(balls.len());
    balls.extend(spawned.into_iter().take(room));
    world.balls = balls;
    world.balls.is_empty()
}

/// Run the sub-steps of one ball. Every check runs within a sub-step; any
/// collision ends the remaining sub-steps.
fn integrate_ball(
    world: &mut World,
    ball: &mut Ball,
    substeps: u32,
    speed: f32,
    layout: &super::grid::GridLayout,
) -> BallReport {
    let mut report = BallReport::default();
    let fraction = 1.0 / substeps as f32;

    for _ in 0..substeps {
        ball.pos += ball.vel * fraction;
        let mut collided = false;

        match collision::resolve_walls(ball, &world.field) {
            WallContact::Lost => {
                report.lost = true;
                break;
            }
            WallContact::Bounce => {
                world.cue(SoundCue::Wall);
                collided = true;
            }
            WallContact::None => {}
        }

        if collision::resolve_paddle(ball, &world.paddle, speed, world.speed_multiplier) {
            report.paddle = true;
            collided = true;
        }

        match collision::resolve_enemies(ball, &world.enemies) {
            Some(idx) => {
                let enemy = &world.enemies[idx];
                let spawn = enemy.is_spawner() && ball.last_spawn_source != Some(enemy.id);
                if enemy.is_spawner() {
                    ball.last_spawn_source = Some(enemy.id);
                }
                report.enemy = Some((idx, spawn));
                collided = true;
            }
            None => ball.last_spawn_source = None,
        }

        if let Some(hit) = collision::resolve_grid(ball, &mut world.grid, layout) {
            report.grid = Some(hit);
            collided = true;
        }

        if collided {
            break;
        }
    }

    ball.clamp_velocity();
    report
}

fn on_enemy_hit(world: &mut World, idx: usize) {
    let killed = world.enemies[idx].register_hit();
    world.score += ENEMY_TOUCH_SCORE;
    world.cue(SoundCue::Ghost);
    if killed {
        let enemy = &world.enemies[idx];
        let (center, id) = (enemy.center(), enemy.id);
        log::info!("enemy {} destroyed", id);
        world.score += ENEMY_KILL_SCORE;
        world.burst(center, 0xFF4500, EXPLOSION_PARTICLES, 4.0);
        world.cue(SoundCue::Hit);
    }
}

fn on_grid_hit(world: &mut World, hit: &collision::GridHit) {
    match hit.behavior {
        Behavior::Destructible => {
            world.score += CELL_SCORE;
            world.burst(hit.center, material_color(hit.material), DEBRIS_PARTICLES, 2.0);
            world.cue(SoundCue::Hit);
        }
        Behavior::Indestructible => world.cue(SoundCue::Wall),
        Behavior::Empty => {}
    }
}

/// Move projectiles; they may take out a ball (never the last one) or punch
/// a hole in the paddle
fn step_projectiles(world: &mut World) {
    let mut projectiles = std::mem::take(&mut world.projectiles);

    projectiles.retain_mut(|shot| {
        shot.pos += shot.vel;
        let center = shot.center();
        let half = shot.size / 2.0;

        if world.balls.len() > 1 {
            let struck = world.balls.iter().position(|b| {
                let d = (b.pos - center).abs();
                d.x < half.x + b.radius && d.y < half.y + b.radius
            });
            if let Some(i) = struck {
                let ball = world.balls.remove(i);
                log::debug!("projectile {} destroyed ball {}", shot.id, ball.id);
                world.burst(ball.pos, ball.color, DEBRIS_PARTICLES, 2.0);
                world.cue(SoundCue::Hit);
                return false;
            }
        }

        let paddle = &mut world.paddle;
        let overlaps_paddle = shot.pos.x < paddle.x + paddle.width
            && shot.pos.x + shot.size.x > paddle.x
            && shot.pos.y < paddle.y + paddle.height
            && shot.pos.y + shot.size.y > paddle.y;
        if overlaps_paddle {
            paddle.holes.insert(shot.pos.x - paddle.x, shot.size.x, paddle.width);
            log::debug!("paddle holed at offset {:.0}", shot.pos.x - paddle.x);
            world.cue(SoundCue::Hit);
            return false;
        }

        shot.pos.y <= world.field.height
    });

    world.projectiles = projectiles;
}

fn step_particles(world: &mut World) {
    for particle in world.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life -= PARTICLE_DECAY;
    }
    world.particles.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Grid;
    use crate::sim::levels;
    use crate::sim::state::{Playfield, Projectile};

    fn world(level: u32) -> World {
        let def = levels::level(level).unwrap();
        World::new(def, def.grid().unwrap(), Playfield::new(800.0, 600.0, 540.0), 1.0, 11)
    }

    /// A world with no enemies and a single ball parked far from everything
    fn quiet_world() -> World {
        let mut w = world(1);
        w.enemies.clear();
        w.balls[0].pos = Vec2::new(400.0, 450.0);
        w.balls[0].vel = Vec2::new(0.0, -1.0);
        w
    }

    #[test]
    fn test_paddle_moves_and_clamps() {
        let mut w = quiet_world();
        let start = w.paddle.x;
        tick(&mut w, &TickInput { left: true, ..Default::default() });
        assert_eq!(w.paddle.x, start - PADDLE_SPEED);

        tick(&mut w, &TickInput { pointer_x: Some(5000.0), ..Default::default() });
        assert_eq!(w.paddle.x, 800.0 - PADDLE_WIDTH);

        tick(&mut w, &TickInput { pointer_x: Some(100.0), ..Default::default() });
        assert_eq!(w.paddle.center_x(), 100.0);
    }

    #[test]
    fn test_last_ball_lost_ends_tick() {
        let mut w = quiet_world();
        w.balls[0].pos = Vec2::new(20.0, 598.0);
        w.balls[0].vel = Vec2::new(0.0, 4.0);
        assert_eq!(tick(&mut w, &TickInput::default()), TickOutcome::BallsLost);
        assert!(w.balls.is_empty());
        assert!(w.drain_cues().contains(&SoundCue::Lose));
    }

    #[test]
    fn test_losing_one_of_two_balls_continues() {
        let mut w = quiet_world();
        let mut doomed = w.balls[0].clone();
        doomed.id = 77;
        doomed.pos = Vec2::new(20.0, 598.0);
        doomed.vel = Vec2::new(0.0, 4.0);
        w.balls.push(doomed);
        assert_eq!(tick(&mut w, &TickInput::default()), TickOutcome::Continue);
        assert_eq!(w.balls.len(), 1);
    }

    #[test]
    fn test_spawner_adds_one_ball_per_overlap() {
        let mut w = quiet_world();
        let mut spawner = world(1).enemies.into_iter().find(|e| e.is_smallest).unwrap();
        spawner.pos = Vec2::new(380.0, 300.0);
        spawner.vel = Vec2::ZERO;
        let spawner_id = spawner.id;
        w.enemies.push(spawner);

        // Ball touching the spawner's bottom edge, moving up into it
        w.balls[0].pos = Vec2::new(391.0, 324.0);
        w.balls[0].vel = Vec2::new(0.0, -2.0);
        tick(&mut w, &TickInput::default());
        assert_eq!(w.balls.len(), 2);
        assert_eq!(w.balls[0].last_spawn_source, Some(spawner_id));
        assert!(w.balls[1].vel.y < 0.0);
        assert_eq!(w.enemies[0].hit_count, 1);
        assert_eq!(w.score, ENEMY_TOUCH_SCORE);
    }

    #[test]
    fn test_wall_bounce_still_checks_paddle() {
        let mut w = quiet_world();
        w.substeps = 1;
        w.paddle.x = 0.0;
        w.balls[0].pos = Vec2::new(8.0, 535.0);
        w.balls[0].vel = Vec2::new(-4.0, 4.0);
        tick(&mut w, &TickInput::default());

        let ball = &w.balls[0];
        assert_eq!(ball.pos.x, ball.radius);
        assert!(ball.vel.y < 0.0);
        assert_eq!(ball.pos.y, w.paddle.y - ball.radius);
        let cues = w.drain_cues();
        assert!(cues.contains(&SoundCue::Wall));
        assert!(cues.contains(&SoundCue::Paddle));
    }

    #[test]
    fn test_enemy_hit_still_checks_grid() {
        let mut w = quiet_world();
        w.substeps = 1;
        w.grid = Grid::from_rows(&[[1u8; 10], [1; 10], [1; 10]]).unwrap();
        let layout = w.grid_layout();
        let cell = layout.cell_size;
        let ball_pos = layout.origin + Vec2::new(cell / 2.0, 2.5 * cell);
        w.balls[0].pos = ball_pos;
        w.balls[0].vel = Vec2::new(0.0, -1.0);

        let mut ghost = world(1).enemies.remove(0);
        ghost.is_smallest = false;
        ghost.health = None;
        ghost.vel = Vec2::ZERO;
        ghost.pos = Vec2::new(ball_pos.x - 3.0, ball_pos.y - ghost.size.y - 3.0);
        w.enemies.push(ghost);

        tick(&mut w, &TickInput::default());
        assert_eq!(w.enemies[0].hit_count, 1);
        assert_eq!(w.grid.get(0, 2), Some(0));
        assert_eq!(w.grid.remaining_destructible(), 29);
        assert_eq!(w.score, ENEMY_TOUCH_SCORE + CELL_SCORE);
    }

    #[test]
    fn test_killed_enemy_leaves_the_world() {
        let mut w = quiet_world();
        let mut ghost = world(1).enemies.remove(0);
        ghost.is_smallest = false;
        ghost.health = Some(1);
        ghost.vel = Vec2::ZERO;
        ghost.pos = Vec2::new(380.0, 400.0);
        w.enemies.push(ghost);

        let below = Vec2::new(w.enemies[0].center().x, 400.0 + w.enemies[0].size.y + BALL_RADIUS - 1.0);
        w.balls[0].pos = below;
        w.balls[0].vel = Vec2::new(0.0, -2.0);
        tick(&mut w, &TickInput::default());
        assert!(w.enemies.is_empty());
        assert_eq!(w.score, ENEMY_TOUCH_SCORE + ENEMY_KILL_SCORE);
    }

    #[test]
    fn test_ball_cap_respected() {
        let mut w = quiet_world();
        let mut spawner = world(1).enemies.into_iter().find(|e| e.is_smallest).unwrap();
        spawner.pos = Vec2::new(380.0, 300.0);
        spawner.vel = Vec2::ZERO;
        w.enemies.push(spawner);
        let template = w.balls[0].clone();
        w.balls = (0..MAX_BALLS as u32)
            .map(|i| Ball {
                id: 100 + i,
                pos: Vec2::new(391.0, 324.0),
                vel: Vec2::new(0.0, -2.0),
                ..template.clone()
            })
            .collect();
        tick(&mut w, &TickInput::default());
        assert_eq!(w.balls.len(), MAX_BALLS);
    }

    #[test]
    fn test_projectile_spares_last_ball() {
        let mut w = quiet_world();
        let ball_pos = w.balls[0].pos;
        w.projectiles.push(Projectile {
            id: 500,
            pos: ball_pos - Vec2::new(4.0, 9.0),
            vel: Vec2::new(0.0, PROJECTILE_SPEED),
            size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
        });
        tick(&mut w, &TickInput::default());
        assert_eq!(w.balls.len(), 1);
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn test_projectile_takes_ball_when_more_than_one() {
        let mut w = quiet_world();
        let mut other = w.balls[0].clone();
        other.id = 42;
        other.pos = Vec2::new(100.0, 450.0);
        w.balls.push(other);
        let ball_pos = w.balls[0].pos;
        w.projectiles.push(Projectile {
            id: 500,
            pos: ball_pos - Vec2::new(4.0, 9.0),
            vel: Vec2::new(0.0, PROJECTILE_SPEED),
            size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
        });
        tick(&mut w, &TickInput::default());
        assert_eq!(w.balls.len(), 1);
        assert_eq!(w.balls[0].id, 42);
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_punches_paddle_hole() {
        let mut w = quiet_world();
        let px = w.paddle.x;
        w.projectiles.push(Projectile {
            id: 500,
            pos: Vec2::new(px + 30.0, 532.0),
            vel: Vec2::new(0.0, PROJECTILE_SPEED),
            size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
        });
        tick(&mut w, &TickInput::default());
        assert!(w.projectiles.is_empty());
        assert_eq!(w.paddle.holes.len(), 1);
        assert!(w.paddle.is_hole_at(px + 34.0));
    }

    #[test]
    fn test_projectile_leaves_screen() {
        let mut w = quiet_world();
        w.projectiles.push(Projectile {
            id: 500,
            pos: Vec2::new(20.0, 599.0),
            vel: Vec2::new(0.0, PROJECTILE_SPEED),
            size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
        });
        tick(&mut w, &TickInput::default());
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_particles_decay_and_vanish() {
        let mut w = quiet_world();
        w.burst(Vec2::new(200.0, 200.0), 0xFFFFFF, 5, 1.0);
        tick(&mut w, &TickInput::default());
        assert!(w.particles.iter().all(|p| (p.life - (1.0 - PARTICLE_DECAY)).abs() < 1e-6));
        for _ in 0..60 {
            tick(&mut w, &TickInput::default());
        }
        assert!(w.particles.is_empty());
    }

    #[test]
    fn test_cleared_grid_reports_completion() {
        let mut w = quiet_world();
        w.grid = Grid::from_rows(&[[0u8, 33]]).unwrap();
        assert_eq!(tick(&mut w, &TickInput::default()), TickOutcome::FigureCleared);
    }
}
