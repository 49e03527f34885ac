//! In-memory view of the image library for display layers.

use gacha_core::{AssetRecord, AssetTag, Outcome, StorageWarning, WarningKind};
use gacha_error::GachaResult;
use gacha_storage::{AssetRepository, is_data_url};
use std::sync::Arc;

/// An indexed image together with its loaded data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryImage {
    record: AssetRecord,
    data_url: String,
}

impl LibraryImage {
    /// Index metadata.
    pub fn record(&self) -> &AssetRecord {
        &self.record
    }

    /// Image content as a `data:` URL.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// Hydrated library contents, kept in index order.
///
/// Display code refers to images either by asset id or, for images that were
/// never imported, by an inline data URL. [`resolve`](Self::resolve) accepts
/// both. Callers that keep their own references to asset ids must drop them
/// when [`remove`](Self::remove) succeeds; the library does not track them.
///
/// # Example
///
/// ```rust
/// use gacha::{AssetRepository, AssetTag, ImageLibrary, StorageConfig};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::TempDir::new()?;
/// let config = StorageConfig::default().with_data_root(dir.path());
/// let mut library = ImageLibrary::new(Arc::new(AssetRepository::open(&config)?));
///
/// let record = library
///     .import("data:image/png;base64,iVBORw0KGgo=", Some("prize.png"), &[AssetTag::Prize])
///     .await?
///     .into_value();
///
/// assert_eq!(
///     library.resolve(record.id()),
///     Some("data:image/png;base64,iVBORw0KGgo=")
/// );
/// # Ok(())
/// # }
/// ```
pub struct ImageLibrary {
    repo: Arc<AssetRepository>,
    items: Vec<LibraryImage>,
}

impl ImageLibrary {
    /// Create an empty view. Call [`hydrate`](Self::hydrate) to fill it.
    pub fn new(repo: Arc<AssetRepository>) -> Self {
        Self {
            repo,
            items: Vec::new(),
        }
    }

    /// The underlying repository.
    pub fn repository(&self) -> &Arc<AssetRepository> {
        &self.repo
    }

    /// Images currently held, most recent first.
    pub fn items(&self) -> &[LibraryImage] {
        &self.items
    }

    /// Images carrying `tag`.
    pub fn by_tag(&self, tag: AssetTag) -> impl Iterator<Item = &LibraryImage> {
        self.items.iter().filter(move |item| item.record.has_tag(tag))
    }

    /// Reload every indexed image.
    ///
    /// Records whose file is missing are left out with an `AssetFileMissing`
    /// warning. The outcome value is the number of images loaded.
    #[tracing::instrument(skip(self))]
    pub async fn hydrate(&mut self) -> GachaResult<Outcome<usize>> {
        let (records, mut warnings) = self.repo.list().await?.into_parts();
        let mut items = Vec::with_capacity(records.len());

        for record in records {
            match self.repo.load(record.id()).await {
                Ok(data_url) => items.push(LibraryImage { record, data_url }),
                Err(e) if e.is_not_found() => warnings.push(StorageWarning::new(
                    WarningKind::AssetFileMissing,
                    record.id(),
                    "indexed but not on disk",
                )),
                Err(e) => return Err(e),
            }
        }

        self.items = items;
        tracing::debug!(count = self.items.len(), "Hydrated image library");
        Ok(Outcome::with_warnings(self.items.len(), warnings))
    }

    /// Turn an image reference into displayable data.
    ///
    /// Data URLs pass through unchanged; asset ids map to their loaded data
    /// URL. Unknown ids resolve to `None`.
    pub fn resolve<'a>(&'a self, image_ref: &'a str) -> Option<&'a str> {
        if is_data_url(image_ref) {
            return Some(image_ref);
        }
        self.items
            .iter()
            .find(|item| item.record.id() == image_ref)
            .map(|item| item.data_url.as_str())
    }

    /// Save a new image and add it to the front of the view.
    #[tracing::instrument(skip(self, data_url, tags))]
    pub async fn import(
        &mut self,
        data_url: &str,
        original_name: Option<&str>,
        tags: &[AssetTag],
    ) -> GachaResult<Outcome<AssetRecord>> {
        let saved = self.repo.save(data_url, original_name, tags).await?;
        let data_url = self.repo.load(saved.value().id()).await?;

        self.items.insert(
            0,
            LibraryImage {
                record: saved.value().clone(),
                data_url,
            },
        );
        Ok(saved)
    }

    /// Delete an image from the store and the view.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&mut self, id: &str) -> GachaResult<Outcome<bool>> {
        let outcome = self.repo.delete(id).await?;
        self.items.retain(|item| item.record.id() != id);
        Ok(outcome)
    }
}
