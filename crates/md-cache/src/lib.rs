//! Cache store abstraction for the Markdown service.
//!
//! This crate decouples cache consumers from the underlying storage. Two
//! traits form the core API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store where every entry carries an [`Expire`]
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: Process-local map, shared between bucket handles
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Example
//!
//! ```
//! use md_cache::{Cache, Expire, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("markdown");
//! bucket.set("readme", b"<h1>hello</h1>", Expire::Permanent);
//! assert_eq!(bucket.get("readme"), Some(b"<h1>hello</h1>".to_vec()));
//! ```

mod expire;
mod ext;
mod file;
mod memory;

pub use expire::Expire;
pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Each entry is stored with an [`Expire`]. Reads of an entry whose
/// expiration has passed behave exactly like a miss.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `None` on a miss or when the stored entry has expired.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value in the cache.
    ///
    /// Overwrites any existing entry for the same key.
    ///
    /// # Arguments
    ///
    /// * `key` - Opaque cache identity
    /// * `value` - Raw bytes to cache
    /// * `expire` - When the entry stops being served
    fn set(&self, key: &str, value: &[u8], expire: Expire);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets produced by one `Cache` are logically isolated from each other.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// Calling `bucket` multiple times with the same name returns handles that
    /// share the same underlying storage.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8], _expire: Expire) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
