use crate::formatter;
use anyhow::{Context, Result};
use stacload_config::StacLoadConfig;
use stacload_core::{ingest_sample_data, FixtureSet, IngestStatus};
use stacload_http::{HttpConfig, HttpManager};
use tracing::info;

/// Load the sample data into the configured API
pub async fn ingest_command(config: &StacLoadConfig) -> Result<()> {
    let fixtures =
        FixtureSet::from_config(&config.fixtures).context("Failed to load fixture documents")?;
    let http_config = HttpConfig::from(config);
    info!("Ingesting sample data into {}", http_config.base_url);
    let client = HttpManager::new(http_config).context("Failed to build HTTP client")?;

    let summary = ingest_sample_data(&client, &fixtures).await;

    let collection_line = format!(
        "Collection {}: {}",
        fixtures.collection_id(),
        summary.collection.unwrap_or(IngestStatus::Unreachable)
    );
    match summary.collection {
        Some(IngestStatus::Added) => formatter::print_success(&collection_line),
        Some(IngestStatus::AlreadyExists) => formatter::print_warning(&collection_line),
        _ => formatter::print_error(&collection_line),
    }

    let items_line = format!(
        "Items: {} added, {} already existed, {} failed",
        summary.items_added, summary.items_existing, summary.items_failed
    );
    if summary.items_failed > 0 {
        formatter::print_error(&items_line);
    } else if summary.items_existing > 0 {
        formatter::print_warning(&items_line);
    } else {
        formatter::print_success(&items_line);
    }

    Ok(())
}
