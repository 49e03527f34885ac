//! Asset command handlers.

use super::commands::{Commands, OutputFormat};
use gacha::{
    AssetRecord, AssetRepository, AssetTag, DataUrl, GachaResult, JsonError, StorageError,
    StorageErrorKind, StorageWarning,
};
use std::path::Path;

/// Handle one library command against an open repository.
pub async fn handle_command(cmd: Commands, repo: &AssetRepository) -> GachaResult<()> {
    match cmd {
        Commands::List { tag, format } => list_assets(repo, tag, format).await,
        Commands::Import { path, name, tags } => {
            import_asset(repo, &path, name.as_deref(), &tags).await
        }
        Commands::Export { id, out } => export_asset(repo, &id, &out).await,
        Commands::Delete { id } => delete_asset(repo, &id).await,
        Commands::Migrate => migrate(repo).await,
    }
}

fn print_warnings(warnings: &[StorageWarning]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}

async fn list_assets(
    repo: &AssetRepository,
    tag: Option<AssetTag>,
    format: OutputFormat,
) -> GachaResult<()> {
    let outcome = match tag {
        Some(tag) => repo.list_by_tag(tag).await?,
        None => repo.list().await?,
    };
    print_warnings(outcome.warnings());
    let records = outcome.into_value();

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| JsonError::new(e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Human => {
            for record in &records {
                println!("{}", describe(record));
            }
            println!("Total: {} images", records.len());
        }
    }

    Ok(())
}

fn describe(record: &AssetRecord) -> String {
    let created = record
        .created_at_utc()
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| record.created_at().to_string());
    let tags = record
        .tags()
        .as_ref()
        .map(|tags| {
            tags.iter()
                .map(AssetTag::as_str)
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default();

    format!(
        "{}\t{}\t{}\t{}",
        record.id(),
        created,
        tags,
        record.original_name().as_deref().unwrap_or("")
    )
}

async fn import_asset(
    repo: &AssetRepository,
    path: &Path,
    name: Option<&str>,
    tags: &[AssetTag],
) -> GachaResult<()> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let original_name = name.unwrap_or(&file_name);
    let data_url = DataUrl::for_file_name(&file_name, bytes).encode();

    let outcome = repo.save(&data_url, Some(original_name), tags).await?;
    print_warnings(outcome.warnings());
    println!("{}", outcome.value().id());
    Ok(())
}

async fn export_asset(repo: &AssetRepository, id: &str, out: &Path) -> GachaResult<()> {
    let bytes = repo.load_bytes(id).await?;
    tokio::fs::write(out, &bytes).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            out.display(),
            e
        )))
    })?;
    println!("Wrote {} bytes to {}", bytes.len(), out.display());
    Ok(())
}

async fn delete_asset(repo: &AssetRepository, id: &str) -> GachaResult<()> {
    let outcome = repo.delete(id).await?;
    print_warnings(outcome.warnings());
    if *outcome.value() {
        println!("Deleted {}", id);
    } else {
        println!("No indexed image {}", id);
    }
    Ok(())
}

async fn migrate(repo: &AssetRepository) -> GachaResult<()> {
    let outcome = repo.migrate().await?;
    print_warnings(outcome.warnings());
    let report = outcome.value();
    println!(
        "Migrated {}, already present {}, missing {}, failed {}",
        report.migrated().len(),
        report.already_present().len(),
        report.missing().len(),
        report.failed().len()
    );
    Ok(())
}
