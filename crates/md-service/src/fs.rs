//! File system access used by [`Markdown::load_path`](crate::Markdown::load_path).

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

/// File system operations the facade depends on.
pub trait FileSystem: Send + Sync {
    /// Canonical absolute path, or `None` if it cannot be resolved.
    fn realpath(&self, path: &Path) -> Option<PathBuf>;

    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read the whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Last modification time as Unix seconds.
    fn modified(&self, path: &Path) -> io::Result<u64>;

    /// Final path component.
    fn basename(&self, path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn realpath(&self, path: &Path) -> Option<PathBuf> {
        (**self).realpath(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }

    fn modified(&self, path: &Path) -> io::Result<u64> {
        (**self).modified(path)
    }

    fn basename(&self, path: &Path) -> String {
        (**self).basename(path)
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn realpath(&self, path: &Path) -> Option<PathBuf> {
        std::fs::canonicalize(path).ok()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn modified(&self, path: &Path) -> io::Result<u64> {
        let modified = std::fs::metadata(path)?.modified()?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs()))
    }
}
