//! Gacha - image library for a prize-drawing kiosk
//!
//! Gacha stores the kiosk's prize photos, screensaver images and film reel
//! frames as plain files indexed by a single JSON document. Uploads and
//! deletes are serialized per store so concurrent writers never lose index
//! updates, and images from the older film image store are absorbed on first
//! use.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gacha::{AssetRepository, AssetTag, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StorageConfig::load()?;
//!     let repo = AssetRepository::open(&config)?;
//!
//!     let saved = repo
//!         .save("data:image/png;base64,iVBORw0KGgo=", Some("prize.png"), &[AssetTag::Prize])
//!         .await?;
//!     for warning in saved.warnings() {
//!         eprintln!("warning: {}", warning);
//!     }
//!
//!     for record in repo.list().await?.into_value() {
//!         println!("{}", record.id());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `gacha_error` - Error types
//! - `gacha_core` - Asset records, tags and the result-with-warnings type
//! - `gacha_storage` - Codec, index, write serializer, migration and repository
//!
//! This crate re-exports everything for convenience and adds the in-memory
//! [`ImageLibrary`] view and tracing setup used by the `gacha` binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod library;
mod logging;

pub use library::{ImageLibrary, LibraryImage};
pub use logging::{LoggingConfig, init_tracing};

pub use gacha_core::*;
pub use gacha_error::*;
pub use gacha_storage::{
    AssetRepository, DataUrl, FileNameAllocator, FileSystem, IndexStore, LocalFileSystem,
    MigrationReport, MigrationRunner, StorageConfig, WriteSerializer, extension_for,
    extension_for_mime, is_data_url, is_plain_name, mime_for_file_name,
};
