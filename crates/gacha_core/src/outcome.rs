//! Result-with-warnings type for operations with best-effort steps.

use serde::{Deserialize, Serialize};

/// Category of a non-fatal problem absorbed during an operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Index document was not valid JSON or not an array; read as empty
    #[display("corrupt index")]
    CorruptIndex,
    /// Single index entry could not be read and was skipped
    #[display("invalid index entry")]
    InvalidIndexEntry,
    /// Index entry repeated an earlier id and was skipped
    #[display("duplicate index entry")]
    DuplicateIndexEntry,
    /// Backing file could not be removed after its entry was dropped
    #[display("file remove failed")]
    FileRemoveFailed,
    /// Legacy index named a file that no longer exists
    #[display("legacy file missing")]
    LegacyFileMissing,
    /// Legacy file could not be copied into the library
    #[display("legacy entry failed")]
    LegacyEntryFailed,
    /// Legacy index could not be retired after migration
    #[display("legacy index remove failed")]
    LegacyIndexRemoveFailed,
    /// Raw bytes of a corrupt index could not be preserved
    #[display("corrupt index backup failed")]
    CorruptBackupFailed,
    /// Indexed asset has no backing file
    #[display("asset file missing")]
    AssetFileMissing,
}

/// A non-fatal problem absorbed by a store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct StorageWarning {
    kind: WarningKind,
    /// File name or path the warning is about.
    subject: String,
    message: String,
}

impl StorageWarning {
    /// Create a warning and log it.
    pub fn new(kind: WarningKind, subject: impl Into<String>, message: impl Into<String>) -> Self {
        let warning = Self {
            kind,
            subject: subject.into(),
            message: message.into(),
        };
        tracing::warn!(
            kind = %warning.kind,
            subject = %warning.subject,
            "{}",
            warning.message
        );
        warning
    }
}

impl std::fmt::Display for StorageWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.subject, self.message)
    }
}

/// Value of a successful operation plus any warnings absorbed on the way.
///
/// A `GachaResult<Outcome<T>>` distinguishes three states: fully succeeded
/// (`Ok` with no warnings), succeeded with non-fatal cleanup warnings, and
/// failed (`Err`).
///
/// # Examples
///
/// ```
/// use gacha_core::{Outcome, StorageWarning, WarningKind};
///
/// let mut outcome = Outcome::clean(3);
/// assert!(outcome.is_clean());
///
/// outcome.push_warning(StorageWarning::new(
///     WarningKind::FileRemoveFailed,
///     "img_1.png",
///     "permission denied",
/// ));
/// assert!(outcome.has_warning(WarningKind::FileRemoveFailed));
/// assert_eq!(outcome.into_value(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Outcome<T> {
    value: T,
    warnings: Vec<StorageWarning>,
}

impl<T> Outcome<T> {
    /// Outcome with no warnings.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Outcome carrying the given warnings.
    pub fn with_warnings(value: T, warnings: Vec<StorageWarning>) -> Self {
        Self { value, warnings }
    }

    /// Record another warning.
    pub fn push_warning(&mut self, warning: StorageWarning) {
        self.warnings.push(warning);
    }

    /// True when no warnings were recorded.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// True when a warning of the given kind was recorded.
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    /// Borrow the value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Borrow the warnings.
    pub fn warnings(&self) -> &[StorageWarning] {
        &self.warnings
    }

    /// Discard the warnings and return the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Split into value and warnings.
    pub fn into_parts(self) -> (T, Vec<StorageWarning>) {
        (self.value, self.warnings)
    }

    /// Transform the value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}
