//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use gacha::{AssetTag, GachaResult, StorageConfig};
use std::path::PathBuf;

/// Gacha - manage the kiosk image library
#[derive(Parser, Debug)]
#[command(name = "gacha")]
#[command(about = "Manage the Gacha kiosk image library", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Read configuration from this file instead of the usual locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data root directory
    #[arg(long, global = true)]
    pub data_root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

impl Cli {
    /// Storage configuration after applying command-line overrides.
    pub fn storage_config(&self) -> GachaResult<StorageConfig> {
        let config = match &self.config {
            Some(path) => StorageConfig::from_file(path)?,
            None => StorageConfig::load()?,
        };

        Ok(match &self.data_root {
            Some(root) => config.with_data_root(root),
            None => config,
        })
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stored images, most recent first
    List {
        /// Only show images with this tag
        #[arg(long)]
        tag: Option<AssetTag>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Import an image file into the library
    Import {
        /// Image file to import
        path: PathBuf,

        /// Display name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<AssetTag>,
    },

    /// Write a stored image to a file
    Export {
        /// Asset id
        id: String,

        /// Destination file
        out: PathBuf,
    },

    /// Delete a stored image
    Delete {
        /// Asset id
        id: String,
    },

    /// Absorb the legacy film image store now
    Migrate,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// One line per image
    Human,
    /// JSON array of index records
    Json,
}
