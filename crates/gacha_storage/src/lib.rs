//! Index-tracked image library storage for the Gacha kiosk.
//!
//! Images are stored as plain files in an application-private data root, with
//! a single JSON index document listing every live asset. Index mutations run
//! one at a time through a per-instance write serializer, and files from the
//! older film image store are absorbed lazily on first use.
//!
//! # Features
//!
//! - **Atomic writes**: files and the index are written via temp file + rename
//! - **Ordered mutations**: concurrent saves and deletes never lose index updates
//! - **Idempotent migration**: the legacy film store can be absorbed any number of times
//! - **Explicit warnings**: best-effort cleanup failures come back as [`Outcome`] warnings
//!
//! # Example
//!
//! ```rust
//! use gacha_storage::{AssetRepository, AssetTag, StorageConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::TempDir::new()?;
//! let config = StorageConfig::default().with_data_root(dir.path());
//! let repo = AssetRepository::open(&config)?;
//!
//! // Store a prize photo
//! let record = repo
//!     .save("data:image/png;base64,iVBORw0K", Some("a.png"), &[AssetTag::Prize])
//!     .await?
//!     .into_value();
//!
//! // Read it back as a data URL
//! let data_url = repo.load(record.id()).await?;
//! assert_eq!(data_url, "data:image/png;base64,iVBORw0K");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod config;
mod filesystem;
mod fs;
mod index;
mod migration;
mod naming;
mod repository;
mod serializer;

pub use codec::{DataUrl, extension_for_mime, is_data_url, mime_for_file_name};
pub use config::{StorageConfig, is_plain_name};
pub use filesystem::LocalFileSystem;
pub use fs::FileSystem;
pub use index::IndexStore;
pub use migration::{MigrationReport, MigrationRunner};
pub use naming::{FileNameAllocator, extension_for};
pub use repository::AssetRepository;
pub use serializer::WriteSerializer;

pub use gacha_core::{AssetRecord, AssetTag, Outcome, StorageWarning, WarningKind};
pub use gacha_error::{GachaError, GachaResult, StorageError, StorageErrorKind};
