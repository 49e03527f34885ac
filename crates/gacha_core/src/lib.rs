//! Core data types for the Gacha kiosk media store.
//!
//! This crate provides the records kept in the asset index and the
//! result-with-warnings type returned by store operations that have
//! best-effort cleanup steps.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod asset;
mod outcome;
mod tag;

pub use asset::AssetRecord;
pub use outcome::{Outcome, StorageWarning, WarningKind};
pub use tag::AssetTag;
