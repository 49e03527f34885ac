//! Asset index records.

use crate::AssetTag;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the asset index.
///
/// The `id` is currently the on-disk file name. Callers should treat it as an
/// opaque lookup key for both metadata and file content.
///
/// # Examples
///
/// ```
/// use gacha_core::{AssetRecord, AssetTag};
///
/// let record = AssetRecord::new(
///     "img_1700000000000_abc123.png",
///     Some("a.png".to_string()),
///     1_700_000_000_000,
///     vec![AssetTag::Prize, AssetTag::Prize],
/// );
/// assert_eq!(record.id(), record.file_name());
/// assert_eq!(record.tags().as_deref(), Some(&[AssetTag::Prize][..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Lookup key, equal to `file_name`.
    id: String,
    /// Name of the backing file inside the library directory.
    file_name: String,
    /// Name supplied at import time, display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_name: Option<String>,
    /// Creation time in milliseconds since the Unix epoch.
    created_at: i64,
    /// Labels used by callers for filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<AssetTag>>,
}

impl AssetRecord {
    /// Create a record whose id is its file name.
    ///
    /// Tags are de-duplicated keeping first-seen order; an empty list is stored
    /// as absent.
    pub fn new(
        file_name: impl Into<String>,
        original_name: Option<String>,
        created_at: i64,
        tags: impl IntoIterator<Item = AssetTag>,
    ) -> Self {
        let file_name = file_name.into();
        let mut unique: Vec<AssetTag> = Vec::new();
        for tag in tags {
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }

        Self {
            id: file_name.clone(),
            file_name,
            original_name,
            created_at,
            tags: if unique.is_empty() { None } else { Some(unique) },
        }
    }

    /// Record synthesized for a file absorbed from the legacy film store.
    ///
    /// The true creation time is not recoverable, so `created_at` is the
    /// migration time.
    pub fn from_legacy(file_name: impl Into<String>, migrated_at: i64) -> Self {
        let file_name = file_name.into();
        Self::new(
            file_name.clone(),
            Some(file_name),
            migrated_at,
            [AssetTag::Film],
        )
    }

    /// Whether the record carries the given tag.
    pub fn has_tag(&self, tag: AssetTag) -> bool {
        self.tags.as_ref().is_some_and(|tags| tags.contains(&tag))
    }

    /// Creation time as a UTC timestamp, if it is representable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }
}
