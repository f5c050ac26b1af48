//! Single-writer capability cache: a background task (see [`crate::discovery`])
//! is the only writer; readers go through [`CapabilityCache::snapshot`] or the
//! dispatched [`genesis_types::CapabilityEvent`] stream, never the map directly.
//!
//! An `Arc<Mutex<HashMap<..>>>` wrapper with a content hash added so a
//! republish of an unchanged record is a no-op instead of a spurious
//! `Updated` event.

use std::collections::HashMap;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

pub(crate) fn content_hash<T: serde::Serialize>(value: &T) -> u64 {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let digest = Sha256::digest(bytes);
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(buf)
}

pub(crate) enum Upsert<T> {
    Added(T),
    Updated(T),
    Unchanged,
}

pub(crate) struct CapabilityCache<T> {
    entries: Mutex<HashMap<String, (T, u64)>>,
}

impl<T: Clone> CapabilityCache<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn upsert(&self, key: String, value: T, hash: u64) -> Upsert<T> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(&key) {
            Some((_, existing)) if *existing == hash => Upsert::Unchanged,
            Some(_) => {
                entries.insert(key, (value.clone(), hash));
                Upsert::Updated(value)
            }
            None => {
                entries.insert(key, (value.clone(), hash));
                Upsert::Added(value)
            }
        }
    }

    pub(crate) fn remove(&self, key: &str) -> Option<T> {
        self.entries.lock().unwrap().remove(key).map(|(v, _)| v)
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.entries
            .lock()
            .unwrap()
            .values()
            .map(|(v, _)| v.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_content_is_a_no_op() {
        let cache: CapabilityCache<String> = CapabilityCache::new();
        let hash = content_hash(&"v1");
        assert!(matches!(
            cache.upsert("k".to_string(), "v1".to_string(), hash),
            Upsert::Added(_)
        ));
        assert!(matches!(
            cache.upsert("k".to_string(), "v1".to_string(), hash),
            Upsert::Unchanged
        ));
        let hash2 = content_hash(&"v2");
        assert!(matches!(
            cache.upsert("k".to_string(), "v2".to_string(), hash2),
            Upsert::Updated(_)
        ));
    }
}
