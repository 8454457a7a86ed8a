use std::collections::HashMap;

use parking_lot::Mutex;
use storefront_core::AuxiliaryStorage;
use tracing::debug;

/// Per-session key/value scratch space, wiped on logout.
#[derive(Default)]
pub struct SessionScratchStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionScratchStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.lock().insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl AuxiliaryStorage for SessionScratchStorage {
    fn clear(&self) {
        let mut entries = self.entries.lock();
        debug!(entries = entries.len(), "clearing scratch storage");
        entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_removes_everything() {
        let storage = SessionScratchStorage::new();
        storage.set("checkout_step", "2");
        storage.set("coupon", "SPRING");
        assert_eq!(storage.remove("coupon").as_deref(), Some("SPRING"));
        assert_eq!(storage.len(), 1);

        AuxiliaryStorage::clear(&storage);

        assert!(storage.is_empty());
        assert_eq!(storage.get("checkout_step"), None);
    }
}
