//! Merges the catalog API and the product page into one [`ProductRecord`].
//!
//! The two lookups run concurrently and fail independently. Whatever a
//! source could not supply keeps its placeholder, so the caller always gets
//! a complete record.

use std::time::Duration;

use nutrify_core::config::{DEFAULT_OFF_HOST, DEFAULT_USER_AGENT};
use nutrify_core::{
    AppConfig, Barcode, CatalogStatus, ProductRecord, SourceKind, SourceWarning, WarningKind,
};

use crate::client::{OffClient, ProductPage};
use crate::error::ScraperError;
use crate::extract::extract_page;
use crate::normalize::apply_catalog_product;
use crate::types::OffProductResponse;

/// Where and how the aggregator talks to Open Food Facts.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub api_host: String,
    pub web_host: String,
    /// Applied to each remote call separately.
    pub request_timeout: Duration,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_OFF_HOST.to_owned(),
            web_host: DEFAULT_OFF_HOST.to_owned(),
            request_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_retries: 0,
            backoff_base_secs: 1,
        }
    }
}

impl AggregatorConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_host: config.api_host.clone(),
            web_host: config.web_host.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
        }
    }
}

pub struct ProductAggregator {
    client: OffClient,
}

impl ProductAggregator {
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the configured hosts are not valid URLs or
    /// the HTTP client cannot be built.
    pub fn new(config: &AggregatorConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            client: OffClient::new(config)?,
        })
    }

    /// Looks up `barcode` in both sources and merges the results. Never
    /// fails; source failures become placeholders plus a warning.
    pub async fn aggregate(&self, barcode: &Barcode) -> ProductRecord {
        let (catalog, page) = tokio::join!(
            self.client.fetch_product(barcode),
            self.client.fetch_product_page(barcode),
        );

        let mut record = ProductRecord::placeholder(barcode.clone(), CatalogStatus::Found);
        // Page first so an API carbon figure takes precedence over the scraped one.
        merge_page(&mut record, page);
        merge_catalog(&mut record, catalog);

        tracing::info!(
            %barcode,
            catalog = ?record.catalog,
            warnings = record.warnings.len(),
            "product aggregated"
        );
        record
    }
}

fn merge_catalog(record: &mut ProductRecord, result: Result<OffProductResponse, ScraperError>) {
    match result {
        Ok(response) => {
            if let Some(product) = response.product() {
                apply_catalog_product(record, product);
            } else {
                tracing::debug!(
                    barcode = %record.barcode,
                    status = ?response.status,
                    status_verbose = ?response.status_verbose,
                    "catalog response has no product"
                );
                record.catalog = CatalogStatus::not_found();
            }
        }
        Err(ScraperError::NotFound { url }) => {
            tracing::debug!(barcode = %record.barcode, %url, "catalog returned 404");
            record.catalog = CatalogStatus::not_found();
        }
        Err(e) => {
            tracing::warn!(
                barcode = %record.barcode,
                error = %e,
                timeout = e.is_timeout(),
                "catalog lookup failed"
            );
            record.catalog = CatalogStatus::unavailable();
            record.warnings.push(SourceWarning {
                source: SourceKind::StructuredApi,
                kind: WarningKind::SourceUnavailable,
                message: e.to_string(),
            });
        }
    }
}

fn merge_page(record: &mut ProductRecord, result: Result<ProductPage, ScraperError>) {
    let page = match result {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(
                barcode = %record.barcode,
                error = %e,
                timeout = e.is_timeout(),
                "product page fetch failed"
            );
            record.warnings.push(SourceWarning {
                source: SourceKind::ProductPage,
                kind: WarningKind::SourceUnavailable,
                message: e.to_string(),
            });
            return;
        }
    };

    let fields = extract_page(&page.body, &page.url);

    record.product_image_url = fields.product_image_url;
    if let Some(carbon_footprint) = fields.carbon_footprint {
        record.carbon_footprint = carbon_footprint;
    }
    if let Some(additives) = fields.additives_detail {
        record.additives_detail = additives;
    }
    if let Some(species) = fields.threatened_species {
        record.threatened_species = species;
    }
    record.warnings.extend(fields.warnings);
}
