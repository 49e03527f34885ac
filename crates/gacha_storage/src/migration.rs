//! One-shot absorption of the legacy film image store.
//!
//! The legacy store keeps a JSON array of bare file names in
//! `film_images/film_images_index.json`. Each listed file that still exists is
//! copied into the library directory under the same name and indexed as a
//! `film` record. Presence is checked by file name before each copy, so running
//! the migration again (after a crash, or from a second entry point) never
//! duplicates entries.

use crate::config::is_plain_name;
use crate::{FileSystem, IndexStore, WriteSerializer};
use gacha_core::{AssetRecord, Outcome, StorageWarning, WarningKind};
use gacha_error::{GachaError, GachaResult};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// What a migration pass did with each legacy file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_getters::Getters)]
pub struct MigrationReport {
    /// Copied into the library and indexed by this pass
    migrated: Vec<String>,
    /// Already indexed, left alone
    already_present: Vec<String>,
    /// Listed in the legacy index but absent on disk
    missing: Vec<String>,
    /// Could not be copied; left untouched in the legacy directory
    failed: Vec<String>,
    /// Whether the legacy index was removed by this pass
    retired: bool,
}

impl MigrationReport {
    /// True when the pass changed nothing.
    pub fn is_noop(&self) -> bool {
        self.migrated.is_empty()
    }
}

/// Reader and janitor for the legacy film store.
#[derive(Clone)]
struct LegacyStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    index_path: PathBuf,
}

impl LegacyStore {
    /// Legacy file names in index order, empties dropped.
    ///
    /// An absent, unreadable or corrupt legacy index reads as empty.
    async fn read_names(&self) -> Outcome<Vec<String>> {
        let subject = self.index_path.display().to_string();

        match self.fs.exists(&self.index_path).await {
            Ok(false) => return Outcome::clean(Vec::new()),
            Ok(true) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Could not check legacy index, skipping migration");
                return Outcome::clean(Vec::new());
            }
        }

        let raw = match self.fs.read(&self.index_path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read legacy index, skipping migration");
                return Outcome::clean(Vec::new());
            }
        };

        match serde_json::from_slice::<Vec<serde_json::Value>>(&raw) {
            Ok(values) => Outcome::clean(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        serde_json::Value::String(name) if !name.is_empty() => Some(name),
                        _ => None,
                    })
                    .collect(),
            ),
            Err(e) => Outcome::with_warnings(
                Vec::new(),
                vec![StorageWarning::new(
                    WarningKind::CorruptIndex,
                    subject,
                    e.to_string(),
                )],
            ),
        }
    }

    /// Remove the legacy index document; absence counts as success.
    async fn retire_index(&self) -> Option<StorageWarning> {
        match self.fs.remove(&self.index_path).await {
            Ok(()) => {
                tracing::info!(path = %self.index_path.display(), "Retired legacy index");
                None
            }
            Err(e) if e.is_not_found() => None,
            Err(e) => Some(StorageWarning::new(
                WarningKind::LegacyIndexRemoveFailed,
                self.index_path.display().to_string(),
                e.to_string(),
            )),
        }
    }

    /// Remove one legacy file; absence counts as success.
    async fn remove_file(&self, name: &str) -> Option<StorageWarning> {
        match self.fs.remove(&self.dir.join(name)).await {
            Ok(()) => None,
            Err(e) if e.is_not_found() => None,
            Err(e) => Some(StorageWarning::new(
                WarningKind::FileRemoveFailed,
                name,
                e.to_string(),
            )),
        }
    }
}

/// Runs the legacy migration under the write serializer.
pub struct MigrationRunner {
    legacy: LegacyStore,
    library_dir: PathBuf,
    index: Arc<IndexStore>,
    serializer: WriteSerializer,
    verified: AtomicBool,
}

impl MigrationRunner {
    /// Create a runner.
    ///
    /// `legacy_dir`, `legacy_index` and `library_dir` are relative to the data root.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        legacy_dir: impl Into<PathBuf>,
        legacy_index: impl Into<PathBuf>,
        library_dir: impl Into<PathBuf>,
        index: Arc<IndexStore>,
        serializer: WriteSerializer,
    ) -> Self {
        Self {
            legacy: LegacyStore {
                fs,
                dir: legacy_dir.into(),
                index_path: legacy_index.into(),
            },
            library_dir: library_dir.into(),
            index,
            serializer,
            verified: AtomicBool::new(false),
        }
    }

    /// Whether this runner has confirmed there is nothing left to migrate.
    pub fn is_verified(&self) -> bool {
        self.verified.load(Ordering::Acquire)
    }

    /// Run the migration unless an earlier pass confirmed the legacy store is gone.
    pub async fn run_if_needed(&self) -> GachaResult<Outcome<MigrationReport>> {
        if self.is_verified() {
            return Ok(Outcome::clean(MigrationReport::default()));
        }
        self.run().await
    }

    /// Run a migration pass.
    ///
    /// Cheap when the legacy index is absent or empty. Otherwise the copy and
    /// index update run as one serialized task.
    ///
    /// # Errors
    ///
    /// Fails if the current index cannot be read or written. Per-file problems
    /// are reported as warnings and leave the legacy file in place.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> GachaResult<Outcome<MigrationReport>> {
        let (names, mut warnings) = self.legacy.read_names().await.into_parts();

        if names.is_empty() {
            self.verified.store(true, Ordering::Release);
            return Ok(Outcome::with_warnings(MigrationReport::default(), warnings));
        }

        tracing::info!(count = names.len(), "Legacy film images found, migrating");

        let legacy = self.legacy.clone();
        let index = Arc::clone(&self.index);
        let library_dir = self.library_dir.clone();

        let (report, mut pass_warnings) = self
            .serializer
            .enqueue(move || absorb(legacy, index, library_dir, names))
            .await?
            .into_parts();

        if report.retired {
            self.verified.store(true, Ordering::Release);
        }
        warnings.append(&mut pass_warnings);

        tracing::info!(
            migrated = report.migrated.len(),
            already_present = report.already_present.len(),
            missing = report.missing.len(),
            failed = report.failed.len(),
            retired = report.retired,
            "Legacy migration pass complete"
        );

        Ok(Outcome::with_warnings(report, warnings))
    }
}

/// Serialized body of a migration pass.
///
/// Files are copied and indexed before any legacy file is removed, so a
/// failure before the index write leaves the legacy store intact for the
/// next pass. The legacy index is kept while any listed file could not be
/// read or copied, so a later pass retries it.
async fn absorb(
    legacy: LegacyStore,
    index: Arc<IndexStore>,
    library_dir: PathBuf,
    names: Vec<String>,
) -> GachaResult<Outcome<MigrationReport>> {
    let fs = &legacy.fs;
    let (mut records, mut warnings) = index.read().await?.into_parts();
    let mut present: HashSet<String> = records.iter().map(|r| r.file_name().clone()).collect();

    let migrated_at = chrono::Utc::now().timestamp_millis();
    let mut report = MigrationReport::default();
    let mut retry_needed = false;

    for name in names {
        if !is_plain_name(&name) {
            warnings.push(StorageWarning::new(
                WarningKind::LegacyEntryFailed,
                &name,
                "legacy index entry is not a plain file name",
            ));
            report.failed.push(name);
            continue;
        }

        if present.contains(&name) {
            // A pass interrupted after its index write leaves the legacy copy behind
            if let Ok(true) = fs.exists(&library_dir.join(&name)).await {
                warnings.extend(legacy.remove_file(&name).await);
            }
            report.already_present.push(name);
            continue;
        }

        let source = legacy.dir.join(&name);
        match fs.exists(&source).await {
            Ok(true) => {}
            Ok(false) => {
                warnings.push(StorageWarning::new(
                    WarningKind::LegacyFileMissing,
                    &name,
                    "listed in legacy index but not on disk",
                ));
                report.missing.push(name);
                continue;
            }
            Err(e) => {
                warnings.push(entry_failed(&name, &e));
                report.failed.push(name);
                retry_needed = true;
                continue;
            }
        }

        let copied = match fs.read(&source).await {
            Ok(bytes) => fs.write(&library_dir.join(&name), &bytes).await,
            Err(e) => Err(e),
        };
        if let Err(e) = copied {
            warnings.push(entry_failed(&name, &e));
            report.failed.push(name);
            retry_needed = true;
            continue;
        }

        tracing::debug!(file_name = %name, "Copied legacy file");
        records.push(AssetRecord::from_legacy(name.clone(), migrated_at));
        present.insert(name.clone());
        report.migrated.push(name);
    }

    if !report.migrated.is_empty() {
        index.write(&records).await?;
    }

    for name in &report.migrated {
        warnings.extend(legacy.remove_file(name).await);
    }

    if retry_needed {
        tracing::warn!(
            failed = report.failed.len(),
            "Keeping legacy index for files that could not be copied"
        );
    } else {
        match legacy.retire_index().await {
            Some(warning) => warnings.push(warning),
            None => report.retired = true,
        }
    }

    Ok(Outcome::with_warnings(report, warnings))
}

fn entry_failed(name: &str, error: &GachaError) -> StorageWarning {
    StorageWarning::new(WarningKind::LegacyEntryFailed, name, error.to_string())
}
