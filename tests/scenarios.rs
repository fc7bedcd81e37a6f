use glam::Vec2;

use pixel_breaker::audio::{AudioError, AudioManager, AudioSink, SoundCue};
use pixel_breaker::consts::*;
use pixel_breaker::persistence::MemoryStore;
use pixel_breaker::platform::Viewport;
use pixel_breaker::sim::{Grid, Playfield, Projectile, TickInput, TickOutcome, World, levels, tick};
use pixel_breaker::{Game, Intent, Screen};

fn game() -> Game {
    Game::new(
        Viewport::new(800.0, 600.0),
        Box::new(MemoryStore::new()),
        AudioManager::default(),
        17,
    )
}

/// Level 1 running with no enemies
fn quiet_game() -> Game {
    let mut game = game();
    assert!(game.apply(Intent::StartLevel(1)));
    game.world_mut().expect("world").enemies.clear();
    game
}

#[test]
fn two_by_two_figure_takes_four_hits_and_completes_once() {
    let mut game = quiet_game();
    let world = game.world_mut().expect("world");
    world.grid = Grid::from_rows(&[[1u8, 1], [1, 1]]).expect("rectangular");
    let layout = world.grid_layout();
    let size = layout.cell_size;
    let origin = layout.origin;

    // Bottom row first, then the top row through the cleared gap
    let shots = [(0, 1), (1, 1), (0, 0), (1, 0)];
    let mut completions = 0;
    for (i, (col, row)) in shots.into_iter().enumerate() {
        let world = game.world_mut().expect("world");
        let x = origin.x + (col as f32 + 0.5) * size;
        let y = origin.y + (row as f32 + 1.0) * size + BALL_RADIUS + 1.0;
        world.balls[0].pos = Vec2::new(x, y);
        world.balls[0].vel = Vec2::new(0.0, -2.0);

        let outcome = game.update(&TickInput::default());
        let world = game.world().expect("world");
        assert_eq!(world.grid.get(col, row), Some(0), "shot {i} missed");
        assert_eq!(world.grid.remaining_destructible(), 3 - i);
        if outcome == Some(TickOutcome::FigureCleared) {
            completions += 1;
        }
    }

    for _ in 0..30 {
        if game.update(&TickInput::default()) == Some(TickOutcome::FigureCleared) {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(game.screen(), Screen::LevelCleared);
    assert_eq!(game.score(), 4 * CELL_SCORE);
    assert_eq!(game.progress().max_level_completed, 1);
}

#[test]
fn a_ball_clears_at_most_one_cell_per_tick() {
    let def = levels::level(4).expect("level 4");
    let mut world = World::new(
        def,
        def.grid().expect("grid"),
        Playfield::new(800.0, 600.0, 540.0),
        1.5,
        8,
    );
    world.enemies.clear();
    world.grid = Grid::from_rows(&vec![vec![2u8; 12]; 12]).expect("rectangular");
    let layout = world.grid_layout();
    let center = layout.origin + Vec2::splat(6.0 * layout.cell_size);

    for tick_index in 0..40 {
        // Park the ball inside the solid block every tick
        world.balls[0].pos = center;
        world.balls[0].vel = Vec2::new(BALL_MAX_AXIS_SPEED, -BALL_MAX_AXIS_SPEED);
        let before = world.grid.remaining_destructible();
        tick(&mut world, &TickInput::default());
        let after = world.grid.remaining_destructible();
        assert!(before - after <= 1, "tick {tick_index} cleared {}", before - after);
    }
}

#[test]
fn heavy_enemy_dies_after_its_health_in_hits() {
    let def = levels::level(4).expect("level 4");
    let mut world = World::new(
        def,
        def.grid().expect("grid"),
        Playfield::new(800.0, 600.0, 540.0),
        1.0,
        21,
    );
    world.grid = Grid::from_rows(&[[1u8]]).expect("rectangular");
    let ogre_index = world
        .enemies
        .iter()
        .position(|e| e.max_health.is_some())
        .expect("an ogre");
    let mut ogre = world.enemies.swap_remove(ogre_index);
    world.enemies.clear();
    ogre.pos = Vec2::new(50.0, 200.0);
    ogre.vel = Vec2::ZERO;
    let health = ogre.max_health.expect("finite health");
    world.enemies.push(ogre);

    let aim = |world: &mut World| {
        let ogre = &world.enemies[0];
        let below = Vec2::new(ogre.center().x, ogre.pos.y + ogre.size.y + BALL_RADIUS + 1.0);
        world.balls[0].pos = below;
        world.balls[0].vel = Vec2::new(0.0, -2.0);
    };

    for hit in 1..health {
        aim(&mut world);
        world.drain_cues();
        tick(&mut world, &TickInput::default());
        assert!(world.drain_cues().contains(&SoundCue::Ghost));
        assert_eq!(world.enemies[0].hit_count, hit);
        assert_eq!(world.enemies[0].health, Some(health - hit));
    }

    // The final hit removes it from play
    let spot = world.enemies[0].pos;
    aim(&mut world);
    tick(&mut world, &TickInput::default());
    let cues = world.drain_cues();
    assert!(cues.contains(&SoundCue::Ghost));
    assert!(cues.contains(&SoundCue::Hit));
    assert!(world.enemies.is_empty());
    let expected = health as u64 * ENEMY_TOUCH_SCORE + ENEMY_KILL_SCORE;
    assert_eq!(world.score, expected);
    assert!(!world.particles.is_empty());

    // Nothing is left to hit where it stood
    world.balls[0].pos = Vec2::new(spot.x + 4.0, spot.y + 4.0);
    world.balls[0].vel = Vec2::new(0.0, -2.0);
    tick(&mut world, &TickInput::default());
    assert!(!world.drain_cues().contains(&SoundCue::Ghost));
    assert_eq!(world.score, expected);
}

#[test]
fn losing_the_last_ball_is_a_sticky_game_over() {
    let mut game = quiet_game();
    let world = game.world_mut().expect("world");
    let mut second = world.balls[0].clone();
    second.id = 900;
    second.pos = Vec2::new(20.0, 300.0);
    second.vel = Vec2::new(0.0, 6.0);
    world.balls[0].pos = Vec2::new(780.0, 594.0);
    world.balls[0].vel = Vec2::new(0.0, 4.0);
    world.balls.push(second);

    assert_eq!(game.update(&TickInput::default()), Some(TickOutcome::Continue));
    assert_eq!(game.world().expect("world").balls.len(), 1);

    let mut outcome = None;
    for _ in 0..100 {
        outcome = game.update(&TickInput::default());
        if outcome != Some(TickOutcome::Continue) {
            break;
        }
    }
    assert_eq!(outcome, Some(TickOutcome::BallsLost));
    assert_eq!(game.screen(), Screen::GameOver);

    for _ in 0..20 {
        assert_eq!(game.update(&TickInput::default()), None);
    }
    assert!(!game.apply(Intent::TogglePause));
    assert!(!game.apply(Intent::NextLevel));
    assert_eq!(game.screen(), Screen::GameOver);
}

#[test]
fn paddle_holes_persist_until_restart() {
    let mut game = quiet_game();
    let world = game.world_mut().expect("world");
    let paddle_x = world.paddle.x;
    let paddle_y = world.paddle.y;
    world.projectiles.push(Projectile {
        id: 1000,
        pos: Vec2::new(paddle_x + 30.0, paddle_y - 10.0),
        vel: Vec2::new(0.0, PROJECTILE_SPEED),
        size: Vec2::new(PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
    });

    game.update(&TickInput::default());
    let holes = game.world().expect("world").paddle.holes.clone();
    assert_eq!(holes.len(), 1);

    for _ in 0..10 {
        game.update(&TickInput {
            left: true,
            ..TickInput::default()
        });
    }
    let world = game.world().expect("world");
    assert!(world.paddle.x < paddle_x);
    assert_eq!(world.paddle.holes, holes);
    assert!(world.paddle.is_hole_at(world.paddle.x + 34.0));

    // A ball dropping onto the hole passes straight through
    let world = game.world_mut().expect("world");
    let over_hole = Vec2::new(world.paddle.x + 34.0, world.paddle.y - 3.0);
    world.balls[0].pos = over_hole;
    world.balls[0].vel = Vec2::new(0.0, 4.0);
    game.update(&TickInput::default());
    let ball = &game.world().expect("world").balls[0];
    assert_eq!(ball.vel, Vec2::new(0.0, 4.0));
    assert!(ball.pos.y > over_hole.y);

    assert!(game.apply(Intent::Retry));
    assert!(game.world().expect("world").paddle.holes.is_empty());
}

/// Counts cues that reach the audio output
struct CountingSink(std::rc::Rc<std::cell::Cell<usize>>);

impl AudioSink for CountingSink {
    fn play(&mut self, _cue: SoundCue, _volume: f32) -> Result<(), AudioError> {
        self.0.set(self.0.get() + 1);
        Ok(())
    }
}

#[test]
fn world_cues_reach_the_audio_sink() {
    let count = std::rc::Rc::new(std::cell::Cell::new(0));
    let audio = AudioManager::new(Box::new(CountingSink(count.clone())));
    let mut game = Game::new(Viewport::new(800.0, 600.0), Box::new(MemoryStore::new()), audio, 4);
    game.apply(Intent::StartLevel(1));
    let selects = count.get();
    assert_eq!(selects, 1);

    let world = game.world_mut().expect("world");
    world.enemies.clear();
    world.balls[0].pos = Vec2::new(3.0, 300.0);
    world.balls[0].vel = Vec2::new(-4.0, 1.0);
    game.update(&TickInput::default());
    assert_eq!(count.get(), selects + 1);
    assert!(game.world().expect("world").cues.is_empty());
}
