//! File-based cache implementation.
//!
//! [`FileCache`] stores cache entries as files on disk, organized into buckets
//! (subdirectories). Keys are opaque strings that may contain `/`, `:` or URL
//! syntax, so each entry is stored under the hex SHA-256 of its key. An entry
//! is a single file with a fixed header followed by the data:
//!
//! ```text
//! [expire: i64 LE][data bytes]
//! ```
//!
//! `expire` is a Unix timestamp, `-1` for permanent entries. On read, only
//! the header is read first; the data is read only when the entry is still
//! fresh.
//!
//! On construction, [`FileCache`] validates a `VERSION` file in the cache root.
//! If the version mismatches or is missing, the entire cache directory is wiped
//! and recreated.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::expire::unix_now;
use crate::{Cache, CacheBucket, Expire};

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # contains the cache version string
/// +-- markdown/          # bucket "markdown"
///     +-- 3a7bd3e2...    # entry, named by sha256(key)
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// If the `VERSION` file inside `root` does not match `version`, the entire
    /// cache directory is removed and recreated with the new version. Errors
    /// during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(hex::encode(digest))
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut file = File::open(self.entry_path(key)).ok()?;

        let mut header = [0u8; 8];
        file.read_exact(&mut header).ok()?;
        let expire = Expire::from(i64::from_le_bytes(header));
        if expire.is_expired_at(unix_now()) {
            tracing::debug!(key, "file cache entry expired");
            return None;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data).ok()?;
        Some(data)
    }

    fn set(&self, key: &str, value: &[u8], expire: Expire) {
        // Cache is optional, write failures are only logged
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!("failed to create cache bucket directory: {e}");
            return;
        }

        let mut buf = Vec::with_capacity(8 + value.len());
        buf.extend_from_slice(&i64::from(expire).to_le_bytes());
        buf.extend_from_slice(value);

        if let Err(e) = fs::write(self.entry_path(key), &buf) {
            tracing::warn!(key, "failed to write cache entry: {e}");
        }
    }
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}
