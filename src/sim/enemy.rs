//! Enemy motion and firing
//!
//! Enemies bounce around the upper part of the playfield independently of
//! the balls' sub-stepping, and some of them drop projectiles on a cooldown.

use glam::Vec2;
use serde::Serialize;

use super::levels::EnemySpawn;
use super::state::{Enemy, Flicker, Projectile, World};
use crate::consts::*;

/// Which enemies of a level may shoot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FireRule {
    None,
    /// Only the largest enemy
    Largest,
    /// The smallest and the largest enemy
    Extremes,
    /// Enemies with finite health
    Heavy,
    All,
}

impl FireRule {
    pub fn allows(self, enemy: &Enemy) -> bool {
        match self {
            FireRule::None => false,
            FireRule::Largest => enemy.is_largest,
            FireRule::Extremes => enemy.is_smallest || enemy.is_largest,
            FireRule::Heavy => enemy.max_health.is_some(),
            FireRule::All => true,
        }
    }
}

/// When eligible enemies may shoot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FireGate {
    /// Only while at least two balls are in play, so a lone ball is never
    /// punished
    TwoBalls,
    Always,
}

impl FireGate {
    pub fn is_open(self, ball_count: usize) -> bool {
        match self {
            FireGate::TwoBalls => ball_count >= 2,
            FireGate::Always => true,
        }
    }
}

/// Place the level's enemies and derive their role flags
pub fn spawn_enemies(world: &mut World, spawns: &[EnemySpawn]) {
    let min_scale = spawns.iter().map(|s| s.scale).fold(f32::INFINITY, f32::min);
    let max_scale = spawns.iter().map(|s| s.scale).fold(f32::NEG_INFINITY, f32::max);
    let mut smallest_taken = false;
    let mut largest_taken = false;

    for spawn in spawns {
        let size = Vec2::splat(ENEMY_SPRITE_CELLS * spawn.scale);
        let is_smallest = !smallest_taken && spawn.scale == min_scale;
        let is_largest = !largest_taken && spawn.scale == max_scale && !is_smallest;
        smallest_taken |= is_smallest;
        largest_taken |= is_largest;

        let zone = Vec2::new(world.field.width, world.field.height * ENEMY_ZONE);
        let pos = (Vec2::new(spawn.x * world.field.width, spawn.y * zone.y) - size / 2.0)
            .clamp(Vec2::ZERO, (zone - size).max(Vec2::ZERO));

        let id = world.next_entity_id();
        let mut enemy = Enemy {
            id,
            kind: spawn.kind,
            pos,
            vel: Vec2::new(spawn.vx, spawn.vy),
            size,
            scale: spawn.scale,
            is_smallest,
            is_largest,
            health: spawn.health,
            max_health: spawn.health,
            fire_cooldown: FIRE_COOLDOWN_TICKS,
            fires: false,
            dead: false,
            flicker: Flicker::Normal,
            hit_count: 0,
        };
        enemy.fires = world.fire_rule.allows(&enemy);
        world.enemies.push(enemy);
    }
}

/// Move every enemy, then let eligible ones fire
pub fn step_enemies(world: &mut World) {
    let zone = Vec2::new(world.field.width, world.field.height * ENEMY_ZONE);
    let gate_open = world.fire_gate.is_open(world.balls.len());
    let mut shots = Vec::new();

    for enemy in world.enemies.iter_mut() {
        enemy.pos += enemy.vel;
        let max = (zone - enemy.size).max(Vec2::ZERO);
        if enemy.pos.x < 0.0 {
            enemy.pos.x = 0.0;
            enemy.vel.x = enemy.vel.x.abs();
        } else if enemy.pos.x > max.x {
            enemy.pos.x = max.x;
            enemy.vel.x = -enemy.vel.x.abs();
        }
        if enemy.pos.y < 0.0 {
            enemy.pos.y = 0.0;
            enemy.vel.y = enemy.vel.y.abs();
        } else if enemy.pos.y > max.y {
            enemy.pos.y = max.y;
            enemy.vel.y = -enemy.vel.y.abs();
        }

        if enemy.fire_cooldown > 0 {
            enemy.fire_cooldown -= 1;
        } else if enemy.fires && gate_open {
            let size = Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT);
            let muzzle = Vec2::new(enemy.center().x - size.x / 2.0, enemy.pos.y + enemy.size.y);
            shots.push((muzzle, size));
            enemy.fire_cooldown = FIRE_COOLDOWN_TICKS;
        }
    }

    for (pos, size) in shots {
        let id = world.next_entity_id();
        log::debug!("enemy projectile {} fired at ({:.0}, {:.0})", id, pos.x, pos.y);
        world.projectiles.push(Projectile {
            id,
            pos,
            vel: Vec2::new(0.0, PROJECTILE_SPEED),
            size,
        });
    }
}
