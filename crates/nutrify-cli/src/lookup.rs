//! `nutrify lookup <barcode>`: manual-entry product lookup.

use nutrify_core::{AppConfig, Barcode, CatalogStatus, ProductRecord};
use nutrify_scraper::{AggregatorConfig, ProductAggregator};
use serde::Serialize;

/// Validates `raw`, aggregates the product, and prints the record as JSON.
///
/// # Errors
///
/// Returns an error if the barcode is invalid, the aggregator cannot be
/// built, or the catalog has no such product (after printing the record).
pub(crate) async fn run_lookup(config: &AppConfig, raw: &str) -> anyhow::Result<()> {
    let barcode =
        Barcode::parse_manual(raw).map_err(|e| anyhow::anyhow!("invalid barcode '{raw}': {e}"))?;
    let record = aggregate(config, &barcode).await?;
    print_record(&record)
}

pub(crate) async fn aggregate(
    config: &AppConfig,
    barcode: &Barcode,
) -> anyhow::Result<ProductRecord> {
    let aggregator = ProductAggregator::new(&AggregatorConfig::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build product aggregator: {e}"))?;
    Ok(aggregator.aggregate(barcode).await)
}

/// Prints the record. A catalog miss is terminal: the record still goes to
/// stdout, but the command fails.
pub(crate) fn print_record(record: &ProductRecord) -> anyhow::Result<()> {
    print_json(record)?;

    for warning in &record.warnings {
        tracing::warn!(
            source = ?warning.source,
            kind = ?warning.kind,
            message = %warning.message,
            "source degraded"
        );
    }

    if let CatalogStatus::NotFound { error } = &record.catalog {
        anyhow::bail!("{}: {error}", record.barcode);
    }
    Ok(())
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
