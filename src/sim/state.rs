//! World state and core simulation types
//!
//! Everything one tick reads or writes lives in [`World`]. Renderers only
//! ever see it through a shared reference.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::enemy::{FireGate, FireRule};
use super::grid::{Grid, GridLayout};
use super::holes::HoleSet;
use super::levels::{LevelDef, Theme};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::NEON_COLORS;

/// Playable area in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    /// Top edge of the paddle
    pub paddle_y: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32, paddle_y: f32) -> Self {
        Self {
            width,
            height,
            paddle_y,
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, Serialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: u32,
    /// Enemy this ball last spawned a sibling from (blocks repeat spawns
    /// while the two keep overlapping)
    pub last_spawn_source: Option<u32>,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2) -> Self {
        let mut ball = Self {
            id,
            pos,
            vel,
            radius: BALL_RADIUS,
            color: 0xFFFFFF,
            last_spawn_source: None,
        };
        ball.clamp_velocity();
        ball
    }

    /// Keep each velocity component within the safety maximum
    pub fn clamp_velocity(&mut self) {
        self.vel = self
            .vel
            .clamp(Vec2::splat(-BALL_MAX_AXIS_SPEED), Vec2::splat(BALL_MAX_AXIS_SPEED));
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: u32,
    pub holes: HoleSet,
}

impl Paddle {
    /// Centered paddle on the playfield
    pub fn new(field: &Playfield) -> Self {
        Self {
            x: (field.width - PADDLE_WIDTH) / 2.0,
            y: field.paddle_y,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            color: 0xFACC15,
            holes: HoleSet::new(),
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Keep the paddle inside `[0, canvas_width - width]`
    pub fn clamp_to(&mut self, canvas_width: f32) {
        self.x = self.x.min(canvas_width - self.width).max(0.0);
    }

    /// Whether an absolute x lies over a punched hole
    pub fn is_hole_at(&self, x: f32) -> bool {
        self.holes.contains(x - self.x)
    }
}

/// Visual hit state of an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Flicker {
    #[default]
    Normal,
    Flickering,
}

impl Flicker {
    pub fn toggled(self) -> Self {
        match self {
            Flicker::Normal => Flicker::Flickering,
            Flicker::Flickering => Flicker::Normal,
        }
    }
}

/// Enemy sprite family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnemyKind {
    Ghost,
    Firefly,
    Ogre,
}

/// A roaming enemy
#[derive(Debug, Clone, Serialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Render edge length of one sprite cell
    pub scale: f32,
    pub is_smallest: bool,
    pub is_largest: bool,
    /// Only heavy enemies have finite health
    pub health: Option<u32>,
    pub max_health: Option<u32>,
    pub fire_cooldown: u32,
    /// Whether this enemy shoots at all
    pub fires: bool,
    pub dead: bool,
    pub flicker: Flicker,
    pub hit_count: u32,
}

impl Enemy {
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Smallest enemy of the level spawns extra balls when touched
    pub fn is_spawner(&self) -> bool {
        self.is_smallest && !self.dead
    }

    /// Record a touch: flicker toggles, counter grows, health drops.
    /// Returns true when this touch killed the enemy.
    pub fn register_hit(&mut self) -> bool {
        self.flicker = self.flicker.toggled();
        self.hit_count += 1;
        match self.health.as_mut() {
            Some(hp) => {
                *hp = hp.saturating_sub(1);
                if *hp == 0 {
                    self.dead = true;
                }
                self.dead
            }
            None => false,
        }
    }
}

/// Enemy shot falling toward the paddle
#[derive(Debug, Clone, Serialize)]
pub struct Projectile {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl Projectile {
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases linearly
    pub life: f32,
    pub color: u32,
    pub size: f32,
}

/// Complete simulation state for one level attempt
#[derive(Debug, Clone, Serialize)]
pub struct World {
    pub level: u32,
    pub theme: Theme,
    pub field: Playfield,
    /// Integration sub-steps per tick for balls
    pub substeps: u32,
    pub fire_rule: FireRule,
    pub fire_gate: FireGate,
    pub speed_multiplier: f32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub grid: Grid,
    pub score: u64,
    /// Tick counter for this attempt
    pub frame: u64,
    pub max_particles: usize,
    /// Cues raised since the last drain
    #[serde(skip)]
    pub cues: Vec<SoundCue>,
    /// Gameplay randomness (spawned ball directions)
    #[serde(skip)]
    pub rng: Pcg32,
    /// Cosmetic randomness (colors, particle spread)
    #[serde(skip)]
    pub fx_rng: Pcg32,
    next_id: u32,
}

impl World {
    /// Build the world for a level: grid copied from the template, one ball
    /// above the centered paddle, enemies from the spawn layout.
    pub fn new(def: &LevelDef, grid: Grid, field: Playfield, speed_multiplier: f32, seed: u64) -> Self {
        let mut world = Self {
            level: def.number,
            theme: def.theme,
            field,
            substeps: def.substeps.max(1),
            fire_rule: def.fire_rule,
            fire_gate: def.fire_gate,
            speed_multiplier: speed_multiplier.clamp(SPEED_MIN, SPEED_MAX),
            paddle: Paddle::new(&field),
            balls: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            grid,
            score: 0,
            frame: 0,
            max_particles: 256,
            cues: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::new(seed, 0x0a02_bdbf_7bb3_c0a7),
            next_id: 1,
        };

        let speed = world.current_speed();
        let dir = if world.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let id = world.next_entity_id();
        world.balls.push(Ball::new(
            id,
            Vec2::new(field.width / 2.0, field.paddle_y - 40.0),
            Vec2::new(speed * dir, -speed),
        ));

        super::enemy::spawn_enemies(&mut world, def.spawns);
        world
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Ball speed for this attempt
    pub fn current_speed(&self) -> f32 {
        BALL_SPEED * self.speed_multiplier
    }

    /// Horizontal float offset of the figure this tick
    pub fn figure_float(&self) -> f32 {
        match self.theme {
            Theme::Swamp => (self.frame as f32 * SWAMP_FLOAT_RATE).sin() * SWAMP_FLOAT_AMPLITUDE,
            _ => 0.0,
        }
    }

    /// Current on-screen layout of the figure grid
    pub fn grid_layout(&self) -> GridLayout {
        GridLayout::compute(&self.grid, self.field.width, self.figure_float())
    }

    pub fn cue(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }

    /// Take all cues raised since the previous call
    pub fn drain_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }

    /// Pick a neon color from the cosmetic stream
    pub fn random_neon(&mut self) -> u32 {
        NEON_COLORS[self.fx_rng.random_range(0..NEON_COLORS.len())]
    }

    /// Scatter `count` particles from `origin` using the cosmetic stream
    pub fn burst(&mut self, origin: Vec2, color: u32, count: usize, speed: f32) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                if self.max_particles == 0 {
                    return;
                }
                self.particles.remove(0);
            }
            let angle = self.fx_rng.random_range(0.0..std::f32::consts::TAU);
            let magnitude = self.fx_rng.random_range(0.3..1.0) * speed;
            let size = self.fx_rng.random_range(1.5..4.0);
            self.particles.push(Particle {
                pos: origin,
                vel: Vec2::from_angle(angle) * magnitude,
                life: 1.0,
                color,
                size,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::levels;

    fn field() -> Playfield {
        Playfield::new(800.0, 600.0, 540.0)
    }

    #[test]
    fn test_world_starts_with_one_ball_above_paddle() {
        let def = levels::level(1).unwrap();
        let world = World::new(def, def.grid().unwrap(), field(), 1.0, 7);
        assert_eq!(world.balls.len(), 1);
        let ball = &world.balls[0];
        assert!(ball.pos.y < world.paddle.y);
        assert_eq!(ball.vel.y, -BALL_SPEED);
        assert_eq!(ball.vel.x.abs(), BALL_SPEED);
        assert_eq!(world.paddle.x, (800.0 - PADDLE_WIDTH) / 2.0);
        assert!(!world.enemies.is_empty());
    }

    #[test]
    fn test_speed_multiplier_clamped() {
        let def = levels::level(1).unwrap();
        let world = World::new(def, def.grid().unwrap(), field(), 9.0, 7);
        assert_eq!(world.speed_multiplier, SPEED_MAX);
    }

    #[test]
    fn test_ball_velocity_clamped_per_axis() {
        let ball = Ball::new(1, Vec2::ZERO, Vec2::new(100.0, -100.0));
        assert_eq!(ball.vel, Vec2::new(BALL_MAX_AXIS_SPEED, -BALL_MAX_AXIS_SPEED));
    }

    #[test]
    fn test_paddle_clamp() {
        let mut paddle = Paddle::new(&field());
        paddle.x = -30.0;
        paddle.clamp_to(800.0);
        assert_eq!(paddle.x, 0.0);
        paddle.x = 790.0;
        paddle.clamp_to(800.0);
        assert_eq!(paddle.x, 800.0 - PADDLE_WIDTH);
    }

    #[test]
    fn test_enemy_hit_bookkeeping() {
        let mut enemy = Enemy {
            id: 1,
            kind: EnemyKind::Ogre,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            size: Vec2::splat(33.0),
            scale: 3.0,
            is_smallest: false,
            is_largest: true,
            health: Some(2),
            max_health: Some(2),
            fire_cooldown: 0,
            fires: false,
            dead: false,
            flicker: Flicker::Normal,
            hit_count: 0,
        };
        assert!(!enemy.register_hit());
        assert_eq!(enemy.flicker, Flicker::Flickering);
        assert!(enemy.register_hit());
        assert_eq!(enemy.flicker, Flicker::Normal);
        assert_eq!(enemy.hit_count, 2);
        assert_eq!(enemy.health, Some(0));
        assert!(enemy.dead);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let def = levels::level(2).unwrap();
        let a = World::new(def, def.grid().unwrap(), field(), 1.0, 42);
        let b = World::new(def, def.grid().unwrap(), field(), 1.0, 42);
        assert_eq!(a.balls[0].vel, b.balls[0].vel);
        assert_eq!(a.enemies.len(), b.enemies.len());
    }
}
