//! Browser bindings
//!
//! The page owns the canvas, DOM overlays and Web Audio. It drives the game
//! through [`WebGame`]: input events in, one JSON snapshot per frame out.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::audio::{AudioError, AudioManager, AudioSink, SoundCue};
use crate::flow::{Game, Intent};
use crate::persistence::{KeyValueStore, LocalStorage, MemoryStore};
use crate::platform::{CancelToken, FrameLoop, InputState, Viewport};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("Pixel Breaker starting...");
}

/// Forwards cues to a JS synthesizer callback `(cue: string, volume: number)`
struct JsAudioSink {
    callback: js_sys::Function,
}

impl AudioSink for JsAudioSink {
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError> {
        self.callback
            .call2(&JsValue::NULL, &JsValue::from_str(cue.as_str()), &JsValue::from_f64(volume as f64))
            .map(|_| ())
            .map_err(|err| AudioError::Backend(format!("{:?}", err)))
    }
}

struct Inner {
    game: Game,
    input: InputState,
}

impl Inner {
    fn frame(&mut self) {
        let input = self.input.take_tick_input();
        self.game.update(&input);
    }

    fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.snapshot()).map_err(|err| JsValue::from_str(&err.to_string()))
    }
}

#[wasm_bindgen]
pub struct WebGame {
    inner: Rc<RefCell<Inner>>,
    running: Option<CancelToken>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(client_width: f32, client_height: f32) -> WebGame {
        let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(err) => {
                log::warn!("{}; progress will not persist", err);
                Box::new(MemoryStore::new())
            }
        };
        let seed = js_sys::Date::now() as u64;
        let game = Game::new(Viewport::new(client_width, client_height), store, AudioManager::default(), seed);
        log::info!("Game initialized with seed: {}", seed);
        WebGame {
            inner: Rc::new(RefCell::new(Inner {
                game,
                input: InputState::new(),
            })),
            running: None,
        }
    }

    /// Route sound cues to `callback(cue, volume)`
    pub fn set_audio_callback(&mut self, callback: js_sys::Function) {
        self.inner
            .borrow_mut()
            .game
            .audio_mut()
            .set_sink(Box::new(JsAudioSink { callback }));
    }

    /// Returns true when the key triggered an accepted intent
    pub fn key_down(&mut self, key: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.input.key_down(key) {
            Some(intent) => inner.game.apply(intent),
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.inner.borrow_mut().input.key_up(key);
    }

    pub fn pointer_moved(&mut self, x: f32) {
        self.inner.borrow_mut().input.pointer_moved(x);
    }

    /// Page hidden or focus lost: drop held keys and pause
    pub fn blur(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.input.release_all();
        if inner.game.screen() == crate::flow::Screen::Playing {
            inner.game.apply(Intent::TogglePause);
        }
    }

    pub fn open_level_select(&mut self) -> bool {
        self.apply(Intent::OpenLevelSelect)
    }

    pub fn start_level(&mut self, level: u32) -> bool {
        self.apply(Intent::StartLevel(level))
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.apply(Intent::TogglePause)
    }

    pub fn retry(&mut self) -> bool {
        self.apply(Intent::Retry)
    }

    pub fn next_level(&mut self) -> bool {
        self.apply(Intent::NextLevel)
    }

    pub fn return_to_menu(&mut self) -> bool {
        self.apply(Intent::ReturnToMenu)
    }

    pub fn set_speed(&mut self, multiplier: f32) -> bool {
        self.apply(Intent::SetSpeed(multiplier))
    }

    pub fn resize(&mut self, client_width: f32, client_height: f32) {
        self.inner
            .borrow_mut()
            .game
            .resize(Viewport::new(client_width, client_height));
    }

    /// Advance one frame by hand (when the page runs its own loop)
    pub fn frame(&mut self) {
        self.inner.borrow_mut().frame();
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.inner.borrow().snapshot_json()
    }

    /// Run on requestAnimationFrame, handing `render(snapshot_json)` each
    /// frame. Replaces any loop already running.
    pub fn start(&mut self, render: js_sys::Function) {
        self.stop();
        let frame_loop = FrameLoop::new();
        self.running = Some(frame_loop.token());
        let inner = self.inner.clone();
        frame_loop.start_animation(move |_time: f64| {
            // Release the borrow before calling back into JS
            let snapshot = {
                let mut inner = inner.borrow_mut();
                inner.frame();
                inner.snapshot_json()
            };
            let json = match snapshot {
                Ok(json) => json,
                Err(err) => {
                    log::warn!("snapshot failed: {:?}", err);
                    return;
                }
            };
            if let Err(err) = render.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("render callback failed: {:?}", err);
            }
        });
        log::info!("Pixel Breaker running!");
    }

    /// Stop the animation loop
    pub fn stop(&mut self) {
        if let Some(token) = self.running.take() {
            token.cancel();
        }
    }
}

impl WebGame {
    fn apply(&mut self, intent: Intent) -> bool {
        self.inner.borrow_mut().game.apply(intent)
    }
}
