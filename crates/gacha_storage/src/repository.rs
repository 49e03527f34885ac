//! Public save/load/list/delete API over the image library.

use crate::codec::{DataUrl, mime_for_file_name};
use crate::config::{StorageConfig, is_plain_name};
use crate::{
    FileNameAllocator, FileSystem, IndexStore, LocalFileSystem, MigrationReport, MigrationRunner,
    WriteSerializer,
};
use gacha_core::{AssetRecord, AssetTag, Outcome, StorageWarning, WarningKind};
use gacha_error::{GachaError, GachaResult, StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The image library.
///
/// Every public operation first makes sure the legacy film store has been
/// absorbed. Reads go straight to the index and files; saves and deletes
/// route their index update through the write serializer.
///
/// The repository is `Send + Sync` and can be shared behind an `Arc`.
pub struct AssetRepository {
    fs: Arc<dyn FileSystem>,
    index: Arc<IndexStore>,
    serializer: WriteSerializer,
    migration: MigrationRunner,
    allocator: FileNameAllocator,
    library_dir: PathBuf,
}

impl AssetRepository {
    /// Open the library on local disk at the configured data root.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if the data root cannot be resolved or created.
    #[tracing::instrument(skip(config))]
    pub fn open(config: &StorageConfig) -> GachaResult<Self> {
        let root = config.resolved_data_root()?;
        let fs = LocalFileSystem::new(root)?;
        Ok(Self::with_file_system(Arc::new(fs), config))
    }

    /// Build the library over any filesystem capability.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_file_system(fs: Arc<dyn FileSystem>, config: &StorageConfig) -> Self {
        let index = Arc::new(IndexStore::new(Arc::clone(&fs), config.index_path()));
        let serializer = WriteSerializer::new();
        let migration = MigrationRunner::new(
            Arc::clone(&fs),
            config.legacy_path(),
            config.legacy_index_path(),
            config.library_path(),
            Arc::clone(&index),
            serializer.clone(),
        );

        Self {
            fs,
            index,
            serializer,
            migration,
            allocator: FileNameAllocator::new(config.file_prefix(), *config.name_attempts()),
            library_dir: config.library_path(),
        }
    }

    /// Library directory relative to the data root.
    pub fn library_dir(&self) -> &Path {
        &self.library_dir
    }

    /// Whether the legacy store is known to be fully absorbed.
    pub fn is_migration_verified(&self) -> bool {
        self.migration.is_verified()
    }

    /// Store a new image.
    ///
    /// The file is written first, then the record is prepended to the index
    /// unless an entry with the same id already exists.
    ///
    /// # Errors
    ///
    /// Fails with a decode error if `data_url` is not a base64 image data URL,
    /// or with a storage error if the file or index cannot be written. When the
    /// index update fails the new file is removed again.
    #[tracing::instrument(skip(self, data_url, tags), fields(original_name = ?original_name))]
    pub async fn save(
        &self,
        data_url: &str,
        original_name: Option<&str>,
        tags: &[AssetTag],
    ) -> GachaResult<Outcome<AssetRecord>> {
        let mut warnings = self.ensure_migrated().await?;

        let blob = DataUrl::parse(data_url)?;
        let file_name = self
            .allocator
            .allocate(
                self.fs.as_ref(),
                &self.library_dir,
                original_name,
                Some(blob.mime()),
            )
            .await?;
        let path = self.library_dir.join(&file_name);
        self.fs.write(&path, blob.bytes()).await?;

        let record = AssetRecord::new(
            file_name,
            original_name.map(str::to_string),
            chrono::Utc::now().timestamp_millis(),
            tags.iter().copied(),
        );

        let index = Arc::clone(&self.index);
        let entry = record.clone();
        let indexed = self
            .serializer
            .enqueue(move || async move {
                let (mut records, warnings) = index.read().await?.into_parts();
                if !records.iter().any(|r| r.id() == entry.id()) {
                    records.insert(0, entry);
                    index.write(&records).await?;
                }
                Ok::<_, GachaError>(warnings)
            })
            .await;

        match indexed {
            Ok(mut index_warnings) => warnings.append(&mut index_warnings),
            Err(e) => {
                if let Err(cleanup) = self.fs.remove(&path).await {
                    tracing::warn!(file_name = %record.file_name(), error = %cleanup, "Could not remove unindexed file");
                }
                return Err(e);
            }
        }

        tracing::info!(id = %record.id(), size = blob.bytes().len(), "Saved asset");
        Ok(Outcome::with_warnings(record, warnings))
    }

    /// Raw bytes of the file behind `id`.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` if the file is absent and `InvalidPath` if `id`
    /// is not a plain file name.
    #[tracing::instrument(skip(self))]
    pub async fn load_bytes(&self, id: &str) -> GachaResult<Vec<u8>> {
        check_id(id)?;
        self.ensure_migrated().await?;
        self.fs.read(&self.library_dir.join(id)).await
    }

    /// The file behind `id` as a data URL, with the MIME type taken from its extension.
    ///
    /// # Errors
    ///
    /// Same as [`load_bytes`](Self::load_bytes).
    pub async fn load(&self, id: &str) -> GachaResult<String> {
        let bytes = self.load_bytes(id).await?;
        Ok(DataUrl::new(mime_for_file_name(id), bytes).encode())
    }

    /// Every record, most recent first.
    ///
    /// # Errors
    ///
    /// Fails only if the index exists but cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> GachaResult<Outcome<Vec<AssetRecord>>> {
        let mut warnings = self.ensure_migrated().await?;
        let (records, mut read_warnings) = self.index.read().await?.into_parts();
        warnings.append(&mut read_warnings);
        tracing::debug!(count = records.len(), "Listed assets");
        Ok(Outcome::with_warnings(records, warnings))
    }

    /// Records carrying `tag`, in index order.
    pub async fn list_by_tag(&self, tag: AssetTag) -> GachaResult<Outcome<Vec<AssetRecord>>> {
        Ok(self
            .list()
            .await?
            .map(|records| records.into_iter().filter(|r| r.has_tag(tag)).collect()))
    }

    /// The record for `id`, if indexed.
    pub async fn get(&self, id: &str) -> GachaResult<Option<AssetRecord>> {
        check_id(id)?;
        Ok(self
            .list()
            .await?
            .into_value()
            .into_iter()
            .find(|r| r.id() == id))
    }

    /// Remove `id` from the index, then remove its file.
    ///
    /// The outcome value is `true` if an index entry was removed. A file that
    /// is already gone is not an error; any other failure to remove it is a
    /// `FileRemoveFailed` warning.
    ///
    /// # Errors
    ///
    /// Fails if the index cannot be read or written, or `id` is not a plain
    /// file name.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> GachaResult<Outcome<bool>> {
        check_id(id)?;
        let mut warnings = self.ensure_migrated().await?;

        let index = Arc::clone(&self.index);
        let target = id.to_string();
        let (removed, mut index_warnings) = self
            .serializer
            .enqueue(move || async move {
                let (mut records, warnings) = index.read().await?.into_parts();
                let before = records.len();
                records.retain(|r| r.id() != &target);
                let removed = records.len() != before;
                if removed {
                    index.write(&records).await?;
                }
                Ok::<_, GachaError>((removed, warnings))
            })
            .await?;
        warnings.append(&mut index_warnings);

        match self.fs.remove(&self.library_dir.join(id)).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!("Backing file already absent");
            }
            Err(e) => warnings.push(StorageWarning::new(
                WarningKind::FileRemoveFailed,
                id,
                e.to_string(),
            )),
        }

        tracing::info!(removed, "Deleted asset");
        Ok(Outcome::with_warnings(removed, warnings))
    }

    /// Run a migration pass now, even if one was already verified.
    pub async fn migrate(&self) -> GachaResult<Outcome<MigrationReport>> {
        self.migration.run().await
    }

    async fn ensure_migrated(&self) -> GachaResult<Vec<StorageWarning>> {
        Ok(self.migration.run_if_needed().await?.into_parts().1)
    }
}

fn check_id(id: &str) -> GachaResult<()> {
    if is_plain_name(id) {
        Ok(())
    } else {
        Err(StorageError::new(StorageErrorKind::InvalidPath(id.to_string())).into())
    }
}
