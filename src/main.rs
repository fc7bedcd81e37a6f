//! Pixel Breaker entry point
//!
//! The browser build is driven from JS through `WebGame`. Natively this runs
//! a headless demo: the autopilot plays a level and the outcome is logged.
//!
//! Usage: `pixel-breaker [level] [max_frames]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use pixel_breaker::audio::{AudioError, AudioManager, AudioSink, SoundCue};
    use pixel_breaker::persistence::{MemoryStore, Progress};
    use pixel_breaker::platform::{Autopilot, FrameLoop, Viewport};
    use pixel_breaker::sim::{LEVEL_COUNT, TickOutcome, levels};
    use pixel_breaker::{Game, Intent, Screen};

    /// Default frame budget, about five minutes at 60 Hz
    const DEFAULT_FRAMES: u64 = 18_000;

    /// Logs cues instead of playing them
    struct LogSink;

    impl AudioSink for LogSink {
        fn play(&mut self, cue: SoundCue, _volume: f32) -> Result<(), AudioError> {
            log::trace!("cue: {}", cue.as_str());
            Ok(())
        }
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let level = args.next().and_then(|a| a.parse::<u32>().ok()).unwrap_or(1);
        let max_frames = args.next().and_then(|a| a.parse::<u64>().ok()).unwrap_or(DEFAULT_FRAMES);

        let def = match levels::level(level) {
            Ok(def) => def,
            Err(err) => {
                log::error!("{} (choose 1-{})", err, LEVEL_COUNT);
                return;
            }
        };

        // Unlock the requested level so the demo can start anywhere
        let mut store = MemoryStore::new();
        let unlocked = Progress {
            max_level_completed: level - 1,
            best_score: 0,
        };
        if let Err(err) = unlocked.save(&mut store) {
            log::warn!("Failed to seed progress: {}", err);
        }

        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let audio = AudioManager::new(Box::new(LogSink));
        let mut game = Game::new(Viewport::new(1280.0, 800.0), Box::new(store), audio, seed);
        if !game.apply(Intent::StartLevel(level)) {
            log::error!("Level {} could not be started", level);
            return;
        }
        log::info!("Autopilot playing level {} ({}) with seed {}", level, def.name, seed);

        let pilot = Autopilot::default();
        let mut frame_loop = FrameLoop::new();
        let frames = frame_loop.run_blocking(Some(max_frames), |frame| {
            let input = match game.world() {
                Some(world) => pilot.input(world),
                None => return false,
            };
            match game.update(&input) {
                Some(TickOutcome::Continue) => {
                    if frame % 600 == 0 {
                        if let Some(world) = game.world() {
                            log::info!(
                                "frame {}: score {}, {} balls, {} cells left",
                                frame,
                                world.score,
                                world.balls.len(),
                                world.grid.remaining_destructible()
                            );
                        }
                    }
                    true
                }
                Some(_) | None => false,
            }
        });

        let outcome = match game.screen() {
            Screen::LevelCleared | Screen::Win => "cleared",
            Screen::GameOver => "lost",
            _ => "unfinished",
        };
        log::info!(
            "Level {} {} after {} frames with score {} (best {})",
            level,
            outcome,
            frames,
            game.score(),
            game.progress().best_score
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Pixel Breaker (native, headless) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start in the library, this is just to satisfy the compiler
}
