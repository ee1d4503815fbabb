pub mod app_config;
pub mod barcode;
pub mod config;
pub mod product;

pub use app_config::{AppConfig, Environment};
pub use barcode::{Barcode, BarcodeError};
pub use config::{load_app_config, load_app_config_from_env};
pub use product::{
    CatalogStatus, Nutrient, NutrientValue, NutritionalInfo, ProductRecord, SourceKind,
    SourceWarning, SpeciesInfo, WarningKind, NOT_AVAILABLE,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
