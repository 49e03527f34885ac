//! Blob codec error types.

/// Ways a transportable image blob can fail to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CodecErrorKind {
    /// Input does not start with `data:<mime>;base64,`
    #[display("Missing data URL prefix")]
    MissingPrefix,
    /// Declared MIME type is not an `image/*` type
    #[display("Unsupported MIME type: {}", _0)]
    UnsupportedMime(String),
    /// Payload is not valid base64
    #[display("Invalid base64 payload: {}", _0)]
    InvalidBase64(String),
}

/// Codec error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Codec Error: {} at line {} in {}", kind, line, file)]
pub struct CodecError {
    kind: CodecErrorKind,
    line: u32,
    file: &'static str,
}

impl CodecError {
    /// Create a new codec error with caller location tracking.
    #[track_caller]
    pub fn new(kind: CodecErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CodecErrorKind {
        &self.kind
    }
}
