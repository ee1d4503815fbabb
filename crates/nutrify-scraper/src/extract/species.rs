use std::collections::BTreeMap;
use std::sync::LazyLock;

use nutrify_core::{SourceKind, SpeciesInfo};
use scraper::{Html, Selector};

use super::{document_order, element_text, following, selector, ExtractionRule};

const SECTION_TITLE: &str = "Threatened species";

static TITLE_CARD: LazyLock<Selector> = LazyLock::new(|| selector("h3.panel_title_card"));
static ACCORDION: LazyLock<Selector> = LazyLock::new(|| selector("ul.panel_accordion"));
static SPECIES_NAME: LazyLock<Selector> = LazyLock::new(|| selector("h4.evaluation_bad_title"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static PANEL_TEXT: LazyLock<Selector> = LazyLock::new(|| selector("div.panel_text"));

/// Species entries listed under the "Threatened species" title card, up to
/// the next title card.
pub struct ThreatenedSpeciesRule;

impl ExtractionRule for ThreatenedSpeciesRule {
    type Output = BTreeMap<String, SpeciesInfo>;

    fn name(&self) -> &'static str {
        "threatened species panel"
    }

    fn source(&self) -> SourceKind {
        SourceKind::ThreatenedSpecies
    }

    fn extract(&self, document: &Html) -> Option<Self::Output> {
        let title = document
            .select(&TITLE_CARD)
            .find(|h3| element_text(*h3) == SECTION_TITLE)?;
        let order = document_order(document);
        let mut species = BTreeMap::new();

        for accordion in following(&order, title)
            .iter()
            .take_while(|el| !TITLE_CARD.matches(el))
            .filter(|el| ACCORDION.matches(el))
        {
            let name = accordion.select(&SPECIES_NAME).next();
            let description = accordion.select(&SPAN).next();
            let detail = accordion.select(&PANEL_TEXT).next();

            if let (Some(name), Some(description), Some(detail)) = (name, description, detail) {
                species.insert(
                    element_text(name),
                    SpeciesInfo {
                        description: element_text(description),
                        detailed_description: element_text(detail),
                    },
                );
            }
        }

        Some(species)
    }
}
