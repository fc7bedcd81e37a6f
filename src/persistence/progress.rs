//! Saved progress: furthest level completed and best score

use serde::{Deserialize, Serialize};

use super::{KeyValueStore, StorageError, load_json, save_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Progress {
    /// Highest level number cleared (0 = none)
    pub max_level_completed: u32,
    pub best_score: u64,
}

impl Progress {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "pixel_breaker_progress";

    /// Load progress, defaulting when absent or corrupt
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json(store, Self::STORAGE_KEY) {
            Some(progress) => {
                log::info!("Loaded progress: {:?}", progress);
                progress
            }
            None => Self::default(),
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)
    }

    /// Whether `level` may be started
    pub fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.max_level_completed + 1
    }

    /// Note a cleared level. Returns true if anything changed.
    pub fn record_completion(&mut self, level: u32, score: u64) -> bool {
        let before = *self;
        self.max_level_completed = self.max_level_completed.max(level);
        self.record_score(score);
        *self != before
    }

    /// Keep the best score seen. Returns true on a new best.
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_unlocking() {
        let mut progress = Progress::default();
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));
        assert!(!progress.is_unlocked(0));
        progress.record_completion(1, 300);
        assert!(progress.is_unlocked(2));
        assert!(!progress.is_unlocked(3));
    }

    #[test]
    fn test_completion_never_regresses() {
        let mut progress = Progress {
            max_level_completed: 4,
            best_score: 900,
        };
        assert!(!progress.record_completion(2, 100));
        assert_eq!(progress.max_level_completed, 4);
        assert_eq!(progress.best_score, 900);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        assert_eq!(Progress::load(&store), Progress::default());
        let progress = Progress {
            max_level_completed: 3,
            best_score: 4200,
        };
        progress.save(&mut store).unwrap();
        assert_eq!(Progress::load(&store), progress);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let mut store = MemoryStore::new();
        store.set(Progress::STORAGE_KEY, r#"{"max_level_completed":2}"#).unwrap();
        let progress = Progress::load(&store);
        assert_eq!(progress.max_level_completed, 2);
        assert_eq!(progress.best_score, 0);
    }
}
