//! Game settings and preferences
//!
//! Persisted separately from progress, as JSON in the key-value store.

use serde::{Deserialize, Serialize};

use crate::consts::{SPEED_MAX, SPEED_MIN};
use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 1024,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Ball speed scale, 0.5 - 1.5
    pub speed_multiplier: f32,

    // === Visual Effects ===
    /// Debris and explosion particles
    pub particles: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no particles, no neon flashes in the renderer)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            speed_multiplier: 1.0,
            particles: true,
            master_volume: 0.8,
            muted: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "pixel_breaker_settings";

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Set the speed multiplier, clamped to the supported range
    pub fn set_speed(&mut self, multiplier: f32) {
        self.speed_multiplier = if multiplier.is_finite() {
            multiplier.clamp(SPEED_MIN, SPEED_MAX)
        } else {
            1.0
        };
    }

    /// Effective particle cap (respects reduced_motion)
    pub fn max_particles(&self) -> usize {
        if !self.particles || self.reduced_motion {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Settings>(store, Self::STORAGE_KEY) {
            Some(mut settings) => {
                log::info!("Loaded settings");
                let speed = settings.speed_multiplier;
                settings.set_speed(speed);
                settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_speed_clamped() {
        let mut settings = Settings::default();
        settings.set_speed(3.0);
        assert_eq!(settings.speed_multiplier, SPEED_MAX);
        settings.set_speed(0.1);
        assert_eq!(settings.speed_multiplier, SPEED_MIN);
        settings.set_speed(f32::NAN);
        assert_eq!(settings.speed_multiplier, 1.0);
    }

    #[test]
    fn test_particle_cap() {
        let mut settings = Settings::from_preset(QualityPreset::Low);
        assert_eq!(settings.max_particles(), 64);
        settings.reduced_motion = true;
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_load_sanitizes_stored_values() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"speed_multiplier":9.0,"muted":true}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.speed_multiplier, SPEED_MAX);
        assert!(settings.muted);
        assert_eq!(settings.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::from_preset(QualityPreset::High);
        settings.set_speed(1.25);
        settings.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!(QualityPreset::parse("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
    }
}
