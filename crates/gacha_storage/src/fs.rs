//! Filesystem capability trait.

use gacha_error::GachaResult;
use std::path::Path;

/// Filesystem operations scoped to an application-private data root.
///
/// Every path is relative to the root. Implementations must reject paths that
/// would escape it.
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync {
    /// Check whether a file or directory exists.
    async fn exists(&self, path: &Path) -> GachaResult<bool>;

    /// Create a directory and any missing parents.
    async fn create_dir_all(&self, path: &Path) -> GachaResult<()>;

    /// Read a whole file.
    ///
    /// # Errors
    ///
    /// Fails with a `NotFound` storage error when the file is absent.
    async fn read(&self, path: &Path) -> GachaResult<Vec<u8>>;

    /// Replace a whole file.
    ///
    /// Readers observe either the previous content or the new content, never a
    /// partial write. Missing parent directories are created.
    async fn write(&self, path: &Path, data: &[u8]) -> GachaResult<()>;

    /// Remove a file.
    ///
    /// # Errors
    ///
    /// Fails with a `NotFound` storage error when the file is absent, so callers
    /// can treat absence as a no-op.
    async fn remove(&self, path: &Path) -> GachaResult<()>;
}
