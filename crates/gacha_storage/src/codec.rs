//! Conversion between data URLs and raw image bytes.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use gacha_error::{CodecError, CodecErrorKind};

/// Standard alphabet, padding optional on decode, always emitted on encode.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const BASE64_MARKER: &str = ";base64";

/// A decoded `data:<mime>;base64,<payload>` image.
///
/// # Examples
///
/// ```
/// use gacha_storage::DataUrl;
///
/// let url: DataUrl = "data:image/png;base64,iVBORw0K".parse().unwrap();
/// assert_eq!(url.mime(), "image/png");
/// assert_eq!(url.bytes(), &[0x89, b'P', b'N', b'G', 0x0d, 0x0a][..]);
/// assert_eq!(url.encode(), "data:image/png;base64,iVBORw0K");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime: String,
    bytes: Vec<u8>,
}

impl DataUrl {
    /// Wrap raw bytes with a MIME type.
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Wrap raw bytes read from `file_name`, inferring the MIME type from its extension.
    pub fn for_file_name(file_name: &str, bytes: Vec<u8>) -> Self {
        Self::new(mime_for_file_name(file_name), bytes)
    }

    /// Decode a data URL.
    ///
    /// The `data:` scheme and `;base64` marker match case-insensitively, the
    /// MIME type must be `image/<subtype>`, and ASCII whitespace inside the
    /// payload is ignored.
    ///
    /// # Errors
    ///
    /// Returns a `CodecError` when the input is not a base64 image data URL.
    pub fn parse(input: &str) -> Result<Self, CodecError> {
        let input = input.trim();
        let rest = match input.get(..5) {
            Some(scheme) if scheme.eq_ignore_ascii_case("data:") => &input[5..],
            _ => return Err(CodecError::new(CodecErrorKind::MissingPrefix)),
        };

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CodecError::new(CodecErrorKind::MissingPrefix))?;

        let marker_start = header
            .len()
            .checked_sub(BASE64_MARKER.len())
            .filter(|&i| header.is_char_boundary(i))
            .filter(|&i| header[i..].eq_ignore_ascii_case(BASE64_MARKER))
            .ok_or_else(|| CodecError::new(CodecErrorKind::MissingPrefix))?;

        let mime = header[..marker_start].to_ascii_lowercase();
        if !is_image_mime(&mime) {
            return Err(CodecError::new(CodecErrorKind::UnsupportedMime(mime)));
        }

        let compact: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = PAYLOAD_ENGINE
            .decode(compact.as_bytes())
            .map_err(|e| CodecError::new(CodecErrorKind::InvalidBase64(e.to_string())))?;

        Ok(Self { mime, bytes })
    }

    /// Encode as a data URL string.
    pub fn encode(&self) -> String {
        format!(
            "data:{}{},{}",
            self.mime,
            BASE64_MARKER,
            PAYLOAD_ENGINE.encode(&self.bytes)
        )
    }

    /// Declared MIME type.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Decoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::str::FromStr for DataUrl {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for DataUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// `image/<subtype>` with subtype drawn from `[a-z0-9.+-]`.
fn is_image_mime(mime: &str) -> bool {
    mime.strip_prefix("image/").is_some_and(|subtype| {
        !subtype.is_empty()
            && subtype
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
    })
}

/// True when `value` looks like an image data URL, without decoding the payload.
pub fn is_data_url(value: &str) -> bool {
    let Some(scheme) = value.get(..11) else {
        return false;
    };
    scheme.eq_ignore_ascii_case("data:image/")
        && value
            .split_once(',')
            .is_some_and(|(header, _)| header.to_ascii_lowercase().ends_with(BASE64_MARKER))
}

/// MIME type served for a stored file, from its extension.
///
/// Unknown extensions default to `image/png`.
pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/png",
    }
}

/// File extension for one of the supported image MIME types.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}
