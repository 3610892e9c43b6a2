//! In-memory cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::expire::unix_now;
use crate::{Cache, CacheBucket, Expire};

type Entries = HashMap<(String, String), (Expire, Vec<u8>)>;

/// Process-local [`Cache`].
///
/// Bucket handles returned by the same `MemoryCache` (or its clones) share
/// one map, so a value written through one handle is visible to the others.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<Entries>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            name: name.to_owned(),
            entries: Arc::clone(&self.entries),
        })
    }
}

struct MemoryCacheBucket {
    name: String,
    entries: Arc<RwLock<Entries>>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().ok()?;
        let (expire, data) = entries.get(&(self.name.clone(), key.to_owned()))?;
        if expire.is_expired_at(unix_now()) {
            return None;
        }
        Some(data.clone())
    }

    fn set(&self, key: &str, value: &[u8], expire: Expire) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert((self.name.clone(), key.to_owned()), (expire, value.to_vec()));
        }
    }
}
