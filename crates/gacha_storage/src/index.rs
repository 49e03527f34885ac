//! The JSON index document listing every live asset.

use crate::FileSystem;
use gacha_core::{AssetRecord, Outcome, StorageWarning, WarningKind};
use gacha_error::{GachaResult, JsonError};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Whole-document reader/writer for the asset index.
///
/// The index is the sole source of truth for which assets exist. Callers that
/// mutate it must do so through the write serializer.
pub struct IndexStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl IndexStore {
    /// Create a store for the index document at `path` (relative to the data root).
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    /// Location of the index document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in index order.
    ///
    /// A missing document (or missing directory) is an empty index. A document
    /// that is not a JSON array is read as empty with a `CorruptIndex` warning,
    /// and its raw bytes are preserved next to it once. Entries that fail to
    /// parse or repeat an earlier id are skipped with a warning.
    ///
    /// # Errors
    ///
    /// I/O failures on an existing document are propagated.
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn read(&self) -> GachaResult<Outcome<Vec<AssetRecord>>> {
        if !self.fs.exists(&self.path).await? {
            tracing::debug!("Index absent, treating as empty");
            return Ok(Outcome::clean(Vec::new()));
        }

        let raw = self.fs.read(&self.path).await?;
        let subject = self.path.display().to_string();

        let entries = match serde_json::from_slice::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(other) => {
                let warning = StorageWarning::new(
                    WarningKind::CorruptIndex,
                    &subject,
                    format!("expected a JSON array, found {}", json_kind(&other)),
                );
                return Ok(self.corrupt(raw, warning).await);
            }
            Err(e) => {
                let warning = StorageWarning::new(WarningKind::CorruptIndex, &subject, e.to_string());
                return Ok(self.corrupt(raw, warning).await);
            }
        };

        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(entries.len());

        for (position, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<AssetRecord>(entry) {
                Ok(record) => {
                    if seen.insert(record.id().clone()) {
                        records.push(record);
                    } else {
                        warnings.push(StorageWarning::new(
                            WarningKind::DuplicateIndexEntry,
                            record.id(),
                            format!("entry {} repeats an earlier id", position),
                        ));
                    }
                }
                Err(e) => warnings.push(StorageWarning::new(
                    WarningKind::InvalidIndexEntry,
                    &subject,
                    format!("entry {}: {}", position, e),
                )),
            }
        }

        tracing::debug!(count = records.len(), "Read index");
        Ok(Outcome::with_warnings(records, warnings))
    }

    /// Replace the whole index document.
    ///
    /// # Errors
    ///
    /// Serialization or write failures are propagated.
    #[tracing::instrument(skip(self, records), fields(path = %self.path.display(), count = records.len()))]
    pub async fn write(&self, records: &[AssetRecord]) -> GachaResult<()> {
        let data = serde_json::to_vec(records)
            .map_err(|e| JsonError::new(format!("Failed to serialize index: {}", e)))?;
        self.fs.write(&self.path, &data).await?;
        tracing::debug!("Wrote index");
        Ok(())
    }

    /// Path where the raw bytes of a corrupt document are preserved.
    pub fn corrupt_backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    /// Empty outcome for a corrupt document, keeping a copy of its bytes.
    ///
    /// An existing backup is never overwritten.
    async fn corrupt(&self, raw: Vec<u8>, warning: StorageWarning) -> Outcome<Vec<AssetRecord>> {
        let mut outcome = Outcome::with_warnings(Vec::new(), vec![warning]);
        let backup = self.corrupt_backup_path();

        let result = match self.fs.exists(&backup).await {
            Ok(true) => Ok(()),
            Ok(false) => self.fs.write(&backup, &raw).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::info!(backup = %backup.display(), "Preserved corrupt index");
            }
            Err(e) => outcome.push_warning(StorageWarning::new(
                WarningKind::CorruptBackupFailed,
                backup.display().to_string(),
                e.to_string(),
            )),
        }

        outcome
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
