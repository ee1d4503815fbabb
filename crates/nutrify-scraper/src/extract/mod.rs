//! Extraction rules for the Open Food Facts product page.
//!
//! Every assumption about the page markup lives in this module. Rules run
//! independently on one parsed document; a rule that finds nothing yields
//! `None` and never affects the others.

mod additives;
mod carbon;
mod image;
mod species;

use std::collections::BTreeMap;

use nutrify_core::{SourceKind, SourceWarning, SpeciesInfo, WarningKind};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

pub use additives::AdditivesRule;
pub use carbon::CarbonFootprintRule;
pub use image::ProductImageRule;
pub use species::ThreatenedSpeciesRule;

/// A named lookup against a parsed product page.
pub trait ExtractionRule {
    type Output;

    fn name(&self) -> &'static str;

    /// Record field this rule feeds, used to label diagnostics.
    fn source(&self) -> SourceKind;

    fn extract(&self, document: &Html) -> Option<Self::Output>;
}

/// Everything the product page contributed to a record.
#[derive(Debug, Default)]
pub struct PageFields {
    pub product_image_url: Option<String>,
    pub carbon_footprint: Option<String>,
    pub additives_detail: Option<BTreeMap<String, String>>,
    pub threatened_species: Option<BTreeMap<String, SpeciesInfo>>,
    pub warnings: Vec<SourceWarning>,
}

/// Parses `body` once and runs all four rules on it.
#[must_use]
pub fn extract_page(body: &str, page_url: &Url) -> PageFields {
    let document = Html::parse_document(body);
    let mut warnings = Vec::new();

    let product_image_url = run_rule(
        &ProductImageRule::new(page_url.clone()),
        &document,
        &mut warnings,
    );
    let carbon_footprint = run_rule(&CarbonFootprintRule, &document, &mut warnings);
    let additives_detail = run_rule(&AdditivesRule, &document, &mut warnings);
    let threatened_species = run_rule(&ThreatenedSpeciesRule, &document, &mut warnings);

    PageFields {
        product_image_url,
        carbon_footprint,
        additives_detail,
        threatened_species,
        warnings,
    }
}

fn run_rule<R: ExtractionRule>(
    rule: &R,
    document: &Html,
    warnings: &mut Vec<SourceWarning>,
) -> Option<R::Output> {
    let output = rule.extract(document);
    if output.is_none() {
        tracing::debug!(rule = rule.name(), "expected markup not found on product page");
        warnings.push(SourceWarning {
            source: rule.source(),
            kind: WarningKind::MarkupMismatch,
            message: format!("{} markup not found on product page", rule.name()),
        });
    }
    output
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Text content with runs of whitespace collapsed to single spaces.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// All elements of `document` in pre-order (document order).
pub(crate) fn document_order(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect()
}

/// Elements that start after `anchor` in document order, beginning with
/// its own descendants.
pub(crate) fn following<'a, 'b>(
    order: &'b [ElementRef<'a>],
    anchor: ElementRef<'a>,
) -> &'b [ElementRef<'a>] {
    match order.iter().position(|el| *el == anchor) {
        Some(index) => &order[index + 1..],
        None => &[],
    }
}
