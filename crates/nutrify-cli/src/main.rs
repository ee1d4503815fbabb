mod lookup;
mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nutrify")]
#[command(about = "Look up food products by barcode")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Look up a product by a typed-in barcode.
    Lookup {
        /// EAN-8, UPC-A, EAN-13, or GTIN-14 digits.
        barcode: String,
    },
    /// Decode a barcode from an image file.
    Scan {
        image: PathBuf,
        /// Also look up the decoded barcode.
        #[arg(long)]
        lookup: bool,
    },
    /// Write the edge map the linear decoder reads.
    Preprocess { input: PathBuf, output: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = nutrify_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Lookup { barcode } => lookup::run_lookup(&config, &barcode).await,
        Commands::Scan { image, lookup } => scan::run_scan(&config, &image, lookup).await,
        Commands::Preprocess { input, output } => scan::run_preprocess(&input, &output),
    }
}
