//! Local disk implementation of the filesystem capability.

use crate::FileSystem;
use gacha_error::{GachaResult, StorageError, StorageErrorKind};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Filesystem capability backed by a directory on local disk.
///
/// # Example Structure
///
/// ```text
/// <data_root>/
/// ├── image_library/
/// │   ├── image_library_index.json
/// │   └── img_1700000000000_k3x9qa.png
/// └── film_images/                 (legacy, emptied by migration)
///     ├── film_images_index.json
///     └── film_1690000000000_a1b2c3.jpg
/// ```
///
/// # Features
///
/// - **Atomic writes**: temp file + rename, so a crash never leaves a torn file
/// - **Scoped**: relative paths only; `..`, root and prefix components are rejected
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    root: PathBuf,
}

impl LocalFileSystem {
    /// Create a filesystem rooted at `root`.
    ///
    /// Creates the root directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> GachaResult<Self> {
        let root = root.into();

        std::fs::create_dir_all(&root).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                root.display(),
                e
            )))
        })?;

        tracing::info!(path = %root.display(), "Opened local data root");
        Ok(Self { root })
    }

    /// The data root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path against the root.
    fn resolve(&self, path: &Path) -> GachaResult<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidPath("empty path".into())).into());
        }
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(StorageError::new(StorageErrorKind::InvalidPath(
                        path.display().to_string(),
                    ))
                    .into());
                }
            }
        }
        Ok(self.root.join(path))
    }
}

/// Sibling temp path used while writing `path`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait::async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &Path) -> GachaResult<bool> {
        let full = self.resolve(path)?;
        tokio::fs::try_exists(&full).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", full.display(), e)))
                .into()
        })
    }

    async fn create_dir_all(&self, path: &Path) -> GachaResult<()> {
        let full = self.resolve(path)?;
        tokio::fs::create_dir_all(&full).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                full.display(),
                e
            )))
            .into()
        })
    }

    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    async fn read(&self, path: &Path) -> GachaResult<Vec<u8>> {
        let full = self.resolve(path)?;

        let data = tokio::fs::read(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    full.display(),
                    e
                )))
            }
        })?;

        tracing::debug!(size = data.len(), "Read file");
        Ok(data)
    }

    #[tracing::instrument(skip(self, data), fields(path = %path.display(), size = data.len()))]
    async fn write(&self, path: &Path, data: &[u8]) -> GachaResult<()> {
        let full = self.resolve(path)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = temp_path_for(&full);
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &full).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                full.display(),
                e
            )))
            .into());
        }

        tracing::debug!("Wrote file");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    async fn remove(&self, path: &Path) -> GachaResult<()> {
        let full = self.resolve(path)?;

        tokio::fs::remove_file(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(path.display().to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRemove(format!(
                    "{}: {}",
                    full.display(),
                    e
                )))
            }
        })?;

        tracing::debug!("Removed file");
        Ok(())
    }
}
