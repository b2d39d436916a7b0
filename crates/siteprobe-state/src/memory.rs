//! In-memory target store (for testing).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use siteprobe_core::Target;

use crate::error::{StoreError, StoreResult};
use crate::TargetStore;

/// Ephemeral store that keeps the last saved snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    targets: Mutex<Vec<Target>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a target list.
    pub fn with_targets(targets: Vec<Target>) -> Self {
        Self {
            targets: Mutex::new(targets),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl TargetStore for MemoryStore {
    fn load(&self) -> StoreResult<Vec<Target>> {
        let targets = self
            .targets
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(targets.clone())
    }

    fn save(&self, targets: &[Target]) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("saves disabled".to_string()));
        }
        let mut stored = self
            .targets
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        *stored = targets.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());

        store.save(&[Target::new("a", "http://x")]).unwrap();
        assert_eq!(store.load().unwrap(), vec![Target::new("a", "http://x")]);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn failing_saves_keep_previous_snapshot() {
        let store = MemoryStore::with_targets(vec![Target::new("a", "http://x")]);
        store.set_fail_saves(true);

        assert!(store.save(&[]).is_err());
        assert_eq!(store.load().unwrap().len(), 1);
        assert_eq!(store.save_count(), 0);

        store.set_fail_saves(false);
        store.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
