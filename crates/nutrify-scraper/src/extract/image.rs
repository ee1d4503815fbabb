use std::sync::LazyLock;

use nutrify_core::SourceKind;
use reqwest::Url;
use scraper::{Html, Selector};

use super::{selector, ExtractionRule};

static PRODUCT_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img.product_image"));

/// First `img.product_image` on the page, made absolute against the page URL.
pub struct ProductImageRule {
    page_url: Url,
}

impl ProductImageRule {
    #[must_use]
    pub fn new(page_url: Url) -> Self {
        Self { page_url }
    }
}

impl ExtractionRule for ProductImageRule {
    type Output = String;

    fn name(&self) -> &'static str {
        "product image"
    }

    fn source(&self) -> SourceKind {
        SourceKind::ProductImage
    }

    fn extract(&self, document: &Html) -> Option<String> {
        let src = document
            .select(&PRODUCT_IMAGE)
            .next()?
            .value()
            .attr("src")
            .map(str::trim)
            .filter(|src| !src.is_empty())?;

        match self.page_url.join(src) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::debug!(src, error = %e, "product image src is not a valid URL");
                None
            }
        }
    }
}
