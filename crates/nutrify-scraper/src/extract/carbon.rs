use std::sync::LazyLock;

use nutrify_core::SourceKind;
use regex::Regex;
use scraper::{Html, Selector};

use super::{element_text, selector, ExtractionRule};

static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));

/// An amount, an optional unit, then a CO₂-equivalent marker.
static CO2E_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:[.,]\d+)?\s*(?:[[:alpha:]]+\s*)?CO[₂2]\s?e").expect("valid CO2e regex")
});

/// First innermost `<span>` carrying a CO₂-equivalent figure.
pub struct CarbonFootprintRule;

impl ExtractionRule for CarbonFootprintRule {
    type Output = String;

    fn name(&self) -> &'static str {
        "carbon footprint"
    }

    fn source(&self) -> SourceKind {
        SourceKind::CarbonFootprint
    }

    fn extract(&self, document: &Html) -> Option<String> {
        document
            .select(&SPAN)
            .filter(|span| span.select(&SPAN).next().is_none())
            .map(element_text)
            .find(|text| CO2E_AMOUNT.is_match(text))
    }
}
