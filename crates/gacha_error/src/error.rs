//! Top-level error wrapper types.

use crate::{CodecError, ConfigError, JsonError, StorageError};

/// Every error the media store can surface.
///
/// # Examples
///
/// ```
/// use gacha_error::{GachaError, JsonError};
///
/// let json_err = JsonError::new("trailing characters");
/// let err: GachaError = json_err.into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum GachaErrorKind {
    /// Filesystem or index error
    #[from(StorageError)]
    Storage(StorageError),
    /// Transportable blob could not be decoded
    #[from(CodecError)]
    Codec(CodecError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Gacha error with kind discrimination.
///
/// # Examples
///
/// ```
/// use gacha_error::{ConfigError, GachaResult};
///
/// fn might_fail() -> GachaResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Gacha Error: {}", _0)]
pub struct GachaError(Box<GachaErrorKind>);

impl GachaError {
    /// Create a new error from a kind.
    pub fn new(kind: GachaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GachaErrorKind {
        &self.0
    }

    /// Whether this error reports a missing asset.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), GachaErrorKind::Storage(e) if e.is_not_found())
    }

    /// Whether this error reports an undecodable blob.
    pub fn is_decode_error(&self) -> bool {
        matches!(self.kind(), GachaErrorKind::Codec(_))
    }
}

// Generic From implementation for any type that converts to GachaErrorKind
impl<T> From<T> for GachaError
where
    T: Into<GachaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Gacha operations.
pub type GachaResult<T> = std::result::Result<T, GachaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodecErrorKind, StorageErrorKind};

    #[test]
    fn not_found_is_detected_through_wrapper() {
        let err: GachaError =
            StorageError::new(StorageErrorKind::NotFound("img_1.png".into())).into();
        assert!(err.is_not_found());
        assert!(!err.is_decode_error());
    }

    #[test]
    fn other_storage_kinds_are_not_not_found() {
        let err: GachaError =
            StorageError::new(StorageErrorKind::FileRead("denied".into())).into();
        assert!(!err.is_not_found());
    }

    #[test]
    fn codec_errors_are_decode_errors() {
        let err: GachaError = CodecError::new(CodecErrorKind::MissingPrefix).into();
        assert!(err.is_decode_error());
        assert!(format!("{}", err).contains("Missing data URL prefix"));
    }

    #[test]
    fn location_is_captured() {
        let err = StorageError::new(StorageErrorKind::InvalidPath("../x".into()));
        assert!(err.file.ends_with("error.rs"));
        assert!(err.line > 0);
    }
}
