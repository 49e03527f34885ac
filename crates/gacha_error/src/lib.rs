//! Error types for the Gacha kiosk media store.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use gacha_error::{GachaResult, StorageError, StorageErrorKind};
//!
//! fn load_asset() -> GachaResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::NotFound("img_1.png".to_string())))?
//! }
//!
//! let err = load_asset().unwrap_err();
//! assert!(err.is_not_found());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod config;
mod error;
mod json;
mod storage;

pub use codec::{CodecError, CodecErrorKind};
pub use config::ConfigError;
pub use error::{GachaError, GachaErrorKind, GachaResult};
pub use json::JsonError;
pub use storage::{StorageError, StorageErrorKind};
