//! Game flow state machine
//!
//! Owns the [`World`] for the current attempt and moves between screens in
//! response to user intents and tick outcomes. Progress and settings are
//! written through the key-value store; failures are logged, never raised.

use serde::Serialize;

use crate::audio::{AudioManager, SoundCue};
use crate::persistence::{KeyValueStore, Progress};
use crate::platform::Viewport;
use crate::settings::Settings;
use crate::sim::{self, LEVEL_COUNT, TickInput, TickOutcome, World, levels};

/// Current screen. Exactly one is active, so paused, game-over, win and
/// level-cleared can never hold together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Screen {
    Start,
    LevelSelect,
    Playing,
    Paused,
    LevelCleared,
    GameOver,
    Win,
}

impl Screen {
    /// An attempt is underway (running or paused)
    pub fn started(self) -> bool {
        matches!(self, Screen::Playing | Screen::Paused)
    }

    /// Physics advances only here
    pub fn simulates(self) -> bool {
        self == Screen::Playing
    }
}

/// User intents
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    OpenLevelSelect,
    StartLevel(u32),
    TogglePause,
    Retry,
    NextLevel,
    ReturnToMenu,
    /// Ball speed multiplier for subsequent attempts
    SetSpeed(f32),
}

/// Read-only view for renderers
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub screen: Screen,
    pub started: bool,
    pub paused: bool,
    pub game_over: bool,
    pub win: bool,
    pub level_cleared: bool,
    pub level: u32,
    pub score: u64,
    pub best_score: u64,
    pub max_level_completed: u32,
    pub speed_multiplier: f32,
    pub world: Option<&'a World>,
}

pub struct Game {
    screen: Screen,
    world: Option<World>,
    viewport: Viewport,
    settings: Settings,
    progress: Progress,
    store: Box<dyn KeyValueStore>,
    audio: AudioManager,
    seed: u64,
    attempts: u64,
    /// Score carried into the current attempt, restored on retry
    attempt_start_score: u64,
}

impl Game {
    pub fn new(viewport: Viewport, store: Box<dyn KeyValueStore>, mut audio: AudioManager, seed: u64) -> Self {
        let settings = Settings::load(store.as_ref());
        let progress = Progress::load(store.as_ref());
        audio.set_master_volume(settings.master_volume);
        audio.set_muted(settings.muted);
        log::info!(
            "Game created ({}x{}, {:?}), {} of {} levels completed",
            viewport.width,
            viewport.height,
            viewport.device,
            progress.max_level_completed,
            LEVEL_COUNT
        );
        Self {
            screen: Screen::Start,
            world: None,
            viewport,
            settings,
            progress,
            store,
            audio,
            seed,
            attempts: 0,
            attempt_start_score: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// Direct world access for tools and tests
    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.world.as_mut()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    pub fn score(&self) -> u64 {
        self.world.as_ref().map_or(0, |w| w.score)
    }

    /// Apply a user intent. Returns false when it does not apply to the
    /// current screen.
    pub fn apply(&mut self, intent: Intent) -> bool {
        let accepted = match intent {
            Intent::OpenLevelSelect => {
                if self.screen.started() {
                    false
                } else {
                    self.screen = Screen::LevelSelect;
                    true
                }
            }
            Intent::StartLevel(level) => {
                !self.screen.started() && self.progress.is_unlocked(level) && self.start_level(level, 0)
            }
            Intent::TogglePause => match self.screen {
                Screen::Playing => {
                    self.screen = Screen::Paused;
                    true
                }
                Screen::Paused => {
                    self.screen = Screen::Playing;
                    true
                }
                _ => false,
            },
            Intent::Retry => match (self.screen, self.world.as_ref()) {
                (Screen::Playing | Screen::Paused | Screen::GameOver | Screen::LevelCleared, Some(world)) => {
                    let level = world.level;
                    self.start_level(level, self.attempt_start_score)
                }
                _ => false,
            },
            Intent::NextLevel => match (self.screen, self.world.as_ref()) {
                (Screen::LevelCleared, Some(world)) => {
                    let (level, score) = (world.level + 1, world.score);
                    self.start_level(level, score)
                }
                _ => false,
            },
            Intent::ReturnToMenu => {
                if self.screen == Screen::Start {
                    false
                } else {
                    self.world = None;
                    self.screen = Screen::Start;
                    true
                }
            }
            Intent::SetSpeed(multiplier) => {
                self.settings.set_speed(multiplier);
                self.save_settings();
                true
            }
        };

        if accepted {
            log::info!("{:?} -> {:?}", intent, self.screen);
            if !matches!(intent, Intent::SetSpeed(_)) {
                self.audio.play(SoundCue::Select);
            }
        } else {
            log::debug!("{:?} ignored on {:?}", intent, self.screen);
        }
        accepted
    }

    /// Build a fresh world for `level` carrying `score`
    fn start_level(&mut self, level: u32, score: u64) -> bool {
        let def = match levels::level(level) {
            Ok(def) => def,
            Err(err) => {
                log::warn!("{}", err);
                return false;
            }
        };
        let grid = match def.grid() {
            Ok(grid) => grid,
            Err(err) => {
                log::warn!("{}", err);
                return false;
            }
        };

        self.attempts += 1;
        let seed = self.seed ^ self.attempts.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut world = World::new(def, grid, self.viewport.playfield(), self.settings.speed_multiplier, seed);
        world.score = score;
        world.max_particles = self.settings.max_particles();
        log::info!("Level {} ({}) started with score {}", level, def.name, score);

        self.attempt_start_score = score;
        self.world = Some(world);
        self.screen = Screen::Playing;
        true
    }

    /// Run one frame. Physics only advances while playing.
    pub fn update(&mut self, input: &TickInput) -> Option<TickOutcome> {
        if !self.screen.simulates() {
            return None;
        }
        let world = self.world.as_mut()?;
        let outcome = sim::tick(world, input);
        let (level, score) = (world.level, world.score);
        let cues = world.drain_cues();
        self.audio.play_all(cues);

        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::BallsLost => {
                log::info!("Game over on level {} with score {}", level, score);
                self.screen = Screen::GameOver;
                if self.progress.record_score(score) {
                    self.save_progress();
                }
            }
            TickOutcome::FigureCleared => {
                self.progress.record_completion(level, score);
                self.save_progress();
                self.screen = if level >= LEVEL_COUNT {
                    Screen::Win
                } else {
                    Screen::LevelCleared
                };
                log::info!("Level {} cleared with score {} -> {:?}", level, score, self.screen);
                self.audio.play(SoundCue::Win);
            }
        }
        Some(outcome)
    }

    /// Adopt a new canvas size, keeping entities inside it
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let field = viewport.playfield();
        world.field = field;
        world.paddle.y = field.paddle_y;
        world.paddle.clamp_to(field.width);
        for ball in &mut world.balls {
            ball.pos.x = ball.pos.x.clamp(ball.radius, (field.width - ball.radius).max(ball.radius));
            ball.pos.y = ball.pos.y.min(field.paddle_y - ball.radius).max(ball.radius);
        }
        log::info!("Resized to {}x{}", field.width, field.height);
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            screen: self.screen,
            started: self.screen.started(),
            paused: self.screen == Screen::Paused,
            game_over: self.screen == Screen::GameOver,
            win: self.screen == Screen::Win,
            level_cleared: self.screen == Screen::LevelCleared,
            level: self.world.as_ref().map_or(0, |w| w.level),
            score: self.score(),
            best_score: self.progress.best_score,
            max_level_completed: self.progress.max_level_completed,
            speed_multiplier: self.settings.speed_multiplier,
            world: self.world.as_ref(),
        }
    }

    fn save_progress(&mut self) {
        if let Err(err) = self.progress.save(self.store.as_mut()) {
            log::warn!("Failed to save progress: {}", err);
        } else {
            log::info!("Progress saved: {:?}", self.progress);
        }
    }

    fn save_settings(&mut self) {
        if let Err(err) = self.settings.save(self.store.as_mut()) {
            log::warn!("Failed to save settings: {}", err);
        }
    }
}
