//! Collision-resistant asset file names.

use crate::FileSystem;
use crate::codec::extension_for_mime;
use gacha_error::{GachaResult, StorageError, StorageErrorKind};
use rand::Rng;
use std::path::Path;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

/// Produces names of the form `<prefix>_<epochMillis>_<6 base36 chars>.<ext>`.
#[derive(Debug, Clone)]
pub struct FileNameAllocator {
    prefix: String,
    attempts: u32,
}

impl FileNameAllocator {
    /// Create an allocator.
    ///
    /// `attempts` bounds how many candidates [`allocate`](Self::allocate) tries.
    pub fn new(prefix: impl Into<String>, attempts: u32) -> Self {
        Self {
            prefix: prefix.into(),
            attempts: attempts.max(1),
        }
    }

    /// Build one candidate name without touching the filesystem.
    pub fn candidate(&self, original_name: Option<&str>, mime: Option<&str>) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = random_suffix(&mut rand::thread_rng());
        format!(
            "{}_{}_{}.{}",
            self.prefix,
            millis,
            suffix,
            extension_for(original_name, mime)
        )
    }

    /// Pick a name not yet present in `dir`.
    ///
    /// # Errors
    ///
    /// Fails if every attempt collides or the existence check fails.
    #[tracing::instrument(skip(self, fs, dir))]
    pub async fn allocate(
        &self,
        fs: &dyn FileSystem,
        dir: &Path,
        original_name: Option<&str>,
        mime: Option<&str>,
    ) -> GachaResult<String> {
        for attempt in 1..=self.attempts {
            let name = self.candidate(original_name, mime);
            if !fs.exists(&dir.join(&name)).await? {
                return Ok(name);
            }
            tracing::debug!(attempt, file_name = %name, "File name collision, retrying");
        }

        Err(StorageError::new(StorageErrorKind::FileWrite(format!(
            "no free file name in {} after {} attempts",
            dir.display(),
            self.attempts
        )))
        .into())
    }
}

/// Extension for a new file: from the original name, else the declared MIME, else `png`.
pub fn extension_for(original_name: Option<&str>, mime: Option<&str>) -> &'static str {
    original_name
        .and_then(|name| name.rsplit_once('.'))
        .and_then(|(_, ext)| match ext.to_ascii_lowercase().as_str() {
            "jpg" => Some("jpg"),
            "jpeg" => Some("jpeg"),
            "png" => Some("png"),
            "gif" => Some("gif"),
            "webp" => Some("webp"),
            "bmp" => Some("bmp"),
            _ => None,
        })
        .or_else(|| mime.and_then(extension_for_mime))
        .unwrap_or("png")
}

fn random_suffix(rng: &mut impl Rng) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_has_expected_shape() {
        let allocator = FileNameAllocator::new("img", 4);
        let name = allocator.candidate(Some("Cat.JPEG"), None);

        let (stem, ext) = name.rsplit_once('.').unwrap();
        assert_eq!(ext, "jpeg");

        let parts: Vec<&str> = stem.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "img");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn extension_prefers_original_name() {
        assert_eq!(extension_for(Some("a.GIF"), Some("image/png")), "gif");
        assert_eq!(extension_for(Some("a.tiff"), Some("image/webp")), "webp");
        assert_eq!(extension_for(Some("noext"), None), "png");
        assert_eq!(extension_for(None, Some("image/jpeg")), "jpg");
        assert_eq!(extension_for(None, Some("image/svg+xml")), "png");
        assert_eq!(extension_for(None, None), "png");
    }

    #[test]
    fn suffixes_vary() {
        let mut rng = rand::thread_rng();
        let a = random_suffix(&mut rng);
        let b = random_suffix(&mut rng);
        let c = random_suffix(&mut rng);
        assert!(a != b || b != c);
    }
}
