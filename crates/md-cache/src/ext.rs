//! Extension trait for [`CacheBucket`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{CacheBucket, Expire};

/// Typed convenience methods for [`CacheBucket`].
///
/// Implemented as default methods on an extension trait so that
/// [`CacheBucket`] stays object-safe and implementors only handle raw bytes.
///
/// A stored value only counts as a hit if it deserializes into the requested
/// type. Entries holding anything else are reported as misses.
///
/// # Example
///
/// ```
/// use md_cache::{Cache, CacheBucketExt, Expire, MemoryCache};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Page { html: String }
///
/// let cache = MemoryCache::new();
/// let bucket = cache.bucket("markdown");
///
/// bucket.set_json("page", &Page { html: "<p>hi</p>".into() }, Expire::Permanent);
/// let page: Option<Page> = bucket.get_json("page");
/// assert!(page.is_some());
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a JSON-deserialized value from the cache.
    ///
    /// Returns `None` on cache miss, expiration, or deserialization failure.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, "discarding cache entry of unexpected type: {e}");
                None
            }
        }
    }

    /// Store a value as JSON in the cache.
    ///
    /// Silently does nothing if serialization fails.
    fn set_json<T: Serialize>(&self, key: &str, value: &T, expire: Expire) {
        if let Ok(bytes) = serde_json::to_vec(value) {
            self.set(key, &bytes, expire);
        }
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}
