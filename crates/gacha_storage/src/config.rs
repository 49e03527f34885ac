//! Configuration for the image library layout.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from gacha.toml)
//! - User overrides (~/.config/gacha/gacha.toml or ./gacha.toml)
//! - `GACHA_*` environment variables, highest precedence

use config::{Config, Environment, File, FileFormat};
use gacha_error::{ConfigError, GachaError, GachaResult};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

/// Directory and file names used by the asset store.
///
/// All paths except `data_root` are relative to the data root.
///
/// # Example
///
/// ```toml
/// data_root = "/var/lib/gacha"
/// library_dir = "image_library"
/// index_file = "image_library_index.json"
/// legacy_dir = "film_images"
/// legacy_index_file = "film_images_index.json"
/// file_prefix = "img"
/// name_attempts = 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct StorageConfig {
    /// Application-private data root (platform data dir + "gacha" when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_root: Option<PathBuf>,

    /// Directory holding current asset files and the index
    #[serde(default = "default_library_dir")]
    library_dir: String,

    /// Index document name inside `library_dir`
    #[serde(default = "default_index_file")]
    index_file: String,

    /// Directory of the legacy film image store
    #[serde(default = "default_legacy_dir")]
    legacy_dir: String,

    /// Legacy index document name inside `legacy_dir`
    #[serde(default = "default_legacy_index_file")]
    legacy_index_file: String,

    /// Prefix of generated asset file names
    #[serde(default = "default_file_prefix")]
    file_prefix: String,

    /// How many candidate names to try before giving up on a save
    #[serde(default = "default_name_attempts")]
    name_attempts: u32,
}

fn default_library_dir() -> String {
    "image_library".to_string()
}

fn default_index_file() -> String {
    "image_library_index.json".to_string()
}

fn default_legacy_dir() -> String {
    "film_images".to_string()
}

fn default_legacy_index_file() -> String {
    "film_images_index.json".to_string()
}

fn default_file_prefix() -> String {
    "img".to_string()
}

fn default_name_attempts() -> u32 {
    8
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: None,
            library_dir: default_library_dir(),
            index_file: default_index_file(),
            legacy_dir: default_legacy_dir(),
            legacy_index_file: default_legacy_index_file(),
            file_prefix: default_file_prefix(),
            name_attempts: default_name_attempts(),
        }
    }
}

impl StorageConfig {
    /// Set the data root.
    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = Some(root.into());
        self
    }

    /// Set the file name prefix.
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> GachaResult<Self> {
        debug!("Loading storage configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                GachaError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                GachaError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: env > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> GachaResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../gacha.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/gacha/gacha.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("gacha").required(false))
            .add_source(Environment::with_prefix("GACHA").try_parsing(true));

        let config: Self = builder
            .build()
            .map_err(|e| {
                GachaError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                GachaError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check that every configured name is a single plain path component.
    pub fn validate(&self) -> GachaResult<()> {
        for (field, value) in [
            ("library_dir", &self.library_dir),
            ("index_file", &self.index_file),
            ("legacy_dir", &self.legacy_dir),
            ("legacy_index_file", &self.legacy_index_file),
        ] {
            if !is_plain_name(value) {
                return Err(ConfigError::new(format!(
                    "{} must be a single path component, got {:?}",
                    field, value
                ))
                .into());
            }
        }

        if self.library_dir == self.legacy_dir {
            return Err(ConfigError::new("library_dir and legacy_dir must differ").into());
        }

        if self.file_prefix.is_empty()
            || !self
                .file_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::new(format!(
                "file_prefix must be non-empty ASCII alphanumerics, got {:?}",
                self.file_prefix
            ))
            .into());
        }

        if self.name_attempts == 0 {
            return Err(ConfigError::new("name_attempts must be at least 1").into());
        }

        Ok(())
    }

    /// Data root, falling back to the platform data directory.
    pub fn resolved_data_root(&self) -> GachaResult<PathBuf> {
        match &self.data_root {
            Some(root) => Ok(root.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join("gacha"))
                .ok_or_else(|| {
                    ConfigError::new("No data_root configured and no platform data directory")
                        .into()
                }),
        }
    }

    /// Library directory relative to the data root.
    pub fn library_path(&self) -> PathBuf {
        PathBuf::from(&self.library_dir)
    }

    /// Index document relative to the data root.
    pub fn index_path(&self) -> PathBuf {
        self.library_path().join(&self.index_file)
    }

    /// Legacy directory relative to the data root.
    pub fn legacy_path(&self) -> PathBuf {
        PathBuf::from(&self.legacy_dir)
    }

    /// Legacy index document relative to the data root.
    pub fn legacy_index_path(&self) -> PathBuf {
        self.legacy_path().join(&self.legacy_index_file)
    }
}

/// True when `name` is exactly one normal path component.
///
/// Asset ids, legacy file names and configured directory names must all pass
/// this check before they are joined onto a storage path.
pub fn is_plain_name(name: &str) -> bool {
    if name.is_empty() || name.contains('/') || name.contains('\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_on_disk_layout() {
        let config = StorageConfig::default();
        assert_eq!(
            config.index_path(),
            Path::new("image_library").join("image_library_index.json")
        );
        assert_eq!(
            config.legacy_index_path(),
            Path::new("film_images").join("film_images_index.json")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn explicit_data_root_wins() {
        let config = StorageConfig::default().with_data_root("/srv/kiosk");
        assert_eq!(
            config.resolved_data_root().unwrap(),
            PathBuf::from("/srv/kiosk")
        );
    }

    #[test]
    fn plain_name_rejects_traversal() {
        assert!(is_plain_name("img_1_abcdef.png"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("."));
        assert!(!is_plain_name("../secrets"));
        assert!(!is_plain_name("a/b.png"));
        assert!(!is_plain_name("a\\b.png"));
        assert!(!is_plain_name("/etc/passwd"));
    }

    #[test]
    fn validate_rejects_bad_names() {
        let mut config = StorageConfig::default();
        config.library_dir = "../outside".to_string();
        assert!(config.validate().is_err());

        let config = StorageConfig::default().with_file_prefix("img/x");
        assert!(config.validate().is_err());

        let mut config = StorageConfig::default();
        config.legacy_dir = config.library_dir.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_reads_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("gacha.toml");
        std::fs::write(&path, "data_root = \"/tmp/kiosk\"\nfile_prefix = \"pic\"\n").unwrap();

        let config = StorageConfig::from_file(&path).unwrap();
        assert_eq!(config.data_root().as_deref(), Some(Path::new("/tmp/kiosk")));
        assert_eq!(config.file_prefix(), "pic");
        assert_eq!(config.library_dir(), "image_library");
    }
}
