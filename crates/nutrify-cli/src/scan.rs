//! `nutrify scan` and `nutrify preprocess`: the image side of the CLI.

use std::path::Path;

use anyhow::Context;
use nutrify_core::{AppConfig, Barcode};
use nutrify_vision::{preprocess, BarcodeResolver};
use serde::Serialize;

use crate::lookup::{aggregate, print_json, print_record};

#[derive(Debug, Serialize)]
struct ScanOutput {
    barcode: Barcode,
}

/// Decodes the barcode in `image_path` and prints it, or the full product
/// record when `then_lookup` is set.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded as an image, no
/// barcode is found, or the follow-up lookup reports the product missing.
pub(crate) async fn run_scan(
    config: &AppConfig,
    image_path: &Path,
    then_lookup: bool,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(image_path)
        .with_context(|| format!("failed to read {}", image_path.display()))?;

    let barcode = tokio::task::spawn_blocking(move || BarcodeResolver::default().resolve_bytes(&bytes))
        .await?
        .with_context(|| format!("no barcode resolved from {}", image_path.display()))?;
    tracing::info!(%barcode, path = %image_path.display(), "barcode resolved");

    if then_lookup {
        let record = aggregate(config, &barcode).await?;
        print_record(&record)
    } else {
        print_json(&ScanOutput { barcode })
    }
}

/// Runs the preprocessing step on `input` and saves the edge map to
/// `output`. The output format follows the file extension.
///
/// # Errors
///
/// Returns an error if `input` cannot be opened as an image or `output`
/// cannot be written.
pub(crate) fn run_preprocess(input: &Path, output: &Path) -> anyhow::Result<()> {
    let image =
        image::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let edges = preprocess(&image);
    edges
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        width = edges.width(),
        height = edges.height(),
        "edge map written"
    );
    Ok(())
}
