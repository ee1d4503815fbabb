use std::collections::BTreeMap;
use std::sync::LazyLock;

use nutrify_core::product::DEFAULT_ADDITIVE_DESCRIPTION;
use nutrify_core::SourceKind;
use scraper::{Html, Selector};

use super::{document_order, element_text, following, selector, ExtractionRule};

static PANEL: LazyLock<Selector> = LazyLock::new(|| selector("div#panel_additives"));
static ACCORDION: LazyLock<Selector> = LazyLock::new(|| selector("ul.panel_accordion"));
static NAME_HEADING: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"h4[style="font-size:1.1rem;"]"#));
static HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h4"));
static PANEL_TEXT: LazyLock<Selector> = LazyLock::new(|| selector("div.panel_text"));

/// Additive name → description from the additives panel.
///
/// The name is the styled name heading of each accordion, or its first `h4`
/// when no heading carries that style. Only names beginning with `E` are kept. The description is the next
/// `div.panel_text` in document order after the accordion starts, which may
/// sit outside the accordion itself.
pub struct AdditivesRule;

impl ExtractionRule for AdditivesRule {
    type Output = BTreeMap<String, String>;

    fn name(&self) -> &'static str {
        "additives panel"
    }

    fn source(&self) -> SourceKind {
        SourceKind::AdditivesDetail
    }

    fn extract(&self, document: &Html) -> Option<Self::Output> {
        let panel = document.select(&PANEL).next()?;
        let order = document_order(document);
        let mut additives = BTreeMap::new();

        for accordion in panel.select(&ACCORDION) {
            let Some(heading) = accordion
                .select(&NAME_HEADING)
                .next()
                .or_else(|| accordion.select(&HEADING).next())
            else {
                continue;
            };
            let name = element_text(heading);
            if !name.starts_with('E') {
                continue;
            }

            let description = following(&order, accordion)
                .iter()
                .find(|el| PANEL_TEXT.matches(el))
                .map_or_else(|| DEFAULT_ADDITIVE_DESCRIPTION.to_owned(), |el| element_text(*el));

            additives.insert(name, description);
        }

        Some(additives)
    }
}
