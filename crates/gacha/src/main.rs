//! Gacha CLI binary.
//!
//! This binary provides command-line access to the kiosk image library:
//! - List, import, export and delete stored images
//! - Run the legacy film image migration on demand

use clap::Parser;
use gacha::{AssetRepository, LoggingConfig, init_tracing};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, handle_command};

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut logging = LoggingConfig::new().with_json_logs(cli.json_logs);
    if cli.verbose {
        logging = logging.with_log_level("debug").with_target(true);
    }
    init_tracing(logging)?;

    let config = cli.storage_config()?;
    let repo = AssetRepository::open(&config)?;

    handle_command(cli.command, &repo).await?;

    Ok(())
}
