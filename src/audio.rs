//! Sound cue dispatch
//!
//! The simulation raises tag-only cues; an [`AudioSink`] turns them into
//! sound. Synthesis lives outside the crate (Web Audio on the page, or a
//! recording sink in tests). Playback is fire-and-forget: failures are
//! logged and never reach the game loop.

use serde::Serialize;
use thiserror::Error;

/// Sound cue tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SoundCue {
    /// Ball hits a wall or an indestructible cell
    Wall,
    /// Ball hits paddle
    Paddle,
    /// Cell destroyed, enemy killed, or projectile impact
    Hit,
    /// Ball touches an enemy
    Ghost,
    /// Spawner enemy released an extra ball
    Spawn,
    /// Level or game completed
    Win,
    /// Last ball lost
    Lose,
    /// Menu selection
    Select,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Wall => "wall",
            SoundCue::Paddle => "paddle",
            SoundCue::Hit => "hit",
            SoundCue::Ghost => "ghost",
            SoundCue::Spawn => "spawn",
            SoundCue::Win => "win",
            SoundCue::Lose => "lose",
            SoundCue::Select => "select",
        }
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output unavailable")]
    Unavailable,
    #[error("audio backend failed: {0}")]
    Backend(String),
}

/// Something that can play a cue at a volume in `0.0..=1.0`
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError>;
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, _cue: SoundCue, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(SilentSink))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Swap the output, e.g. once the page has an audio context
    pub fn set_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.sink = sink;
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Play a cue; errors are logged and dropped
    pub fn play(&mut self, cue: SoundCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        if let Err(err) = self.sink.play(cue, vol) {
            log::warn!("failed to play {} cue: {}", cue.as_str(), err);
        }
    }

    pub fn play_all(&mut self, cues: impl IntoIterator<Item = SoundCue>) {
        for cue in cues {
            self.play(cue);
        }
    }
}
