use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::Barcode;

/// Sentinel substituted for any nutrient or grade the source did not report.
///
/// This is a string on purpose: it must never be read as a zero quantity.
pub const NOT_AVAILABLE: &str = "Not available";

pub const DEFAULT_ALLERGENS: &str = "No allergens listed.";
pub const DEFAULT_INGREDIENTS: &str = "No ingredients found.";
pub const DEFAULT_LABELS: &str = "No labels available";
pub const DEFAULT_PACKAGING_MATERIALS: &str = "Packaging materials not available";
pub const DEFAULT_CARBON_FOOTPRINT: &str = "Carbon footprint not found on the page.";
pub const DEFAULT_ADDITIVE_DESCRIPTION: &str = "No description available.";

pub const CATALOG_NOT_FOUND: &str = "Product not found or missing data.";
pub const CATALOG_UNAVAILABLE: &str = "Failed to fetch data from Open Food Facts API.";

/// The eight nutrients every [`NutritionalInfo`] carries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    EnergyKcal,
    Fat,
    SaturatedFat,
    Carbohydrates,
    Sugars,
    Fiber,
    Proteins,
    Salt,
}

impl Nutrient {
    pub const ALL: [Nutrient; 8] = [
        Nutrient::EnergyKcal,
        Nutrient::Fat,
        Nutrient::SaturatedFat,
        Nutrient::Carbohydrates,
        Nutrient::Sugars,
        Nutrient::Fiber,
        Nutrient::Proteins,
        Nutrient::Salt,
    ];

    /// Key under which the record exposes this nutrient.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Nutrient::EnergyKcal => "🔥energy_kcal",
            Nutrient::Fat => "🧈fat(%)",
            Nutrient::SaturatedFat => "🍳saturated_fat(%)",
            Nutrient::Carbohydrates => "🥔carbohydrates",
            Nutrient::Sugars => "🍭sugars(%)",
            Nutrient::Fiber => "🥦fiber",
            Nutrient::Proteins => "🥩proteins",
            Nutrient::Salt => "🧂salt",
        }
    }

    /// Key inside the Open Food Facts `nutriments` object.
    #[must_use]
    pub fn source_key(self) -> &'static str {
        match self {
            Nutrient::EnergyKcal => "energy-kcal",
            Nutrient::Fat => "fat",
            Nutrient::SaturatedFat => "saturated-fat",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Sugars => "sugars",
            Nutrient::Fiber => "fiber",
            Nutrient::Proteins => "proteins",
            Nutrient::Salt => "salt",
        }
    }
}

/// A nutrient amount exactly as the source reported it, or the sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum NutrientValue {
    Reported(Value),
    Unavailable,
}

impl NutrientValue {
    /// `None` and JSON `null` both count as not reported.
    #[must_use]
    pub fn from_source(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => NutrientValue::Unavailable,
            Some(v) => NutrientValue::Reported(v.clone()),
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, NutrientValue::Reported(_))
    }

    /// Numeric view for charting. Only JSON numbers qualify; the sentinel
    /// and textual values yield `None`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NutrientValue::Reported(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }
}

impl Serialize for NutrientValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NutrientValue::Reported(v) => v.serialize(serializer),
            NutrientValue::Unavailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Fixed eight-entry nutrient table. Serializes as an ordered JSON object
/// keyed by [`Nutrient::label`].
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionalInfo {
    entries: Vec<(Nutrient, NutrientValue)>,
}

impl NutritionalInfo {
    /// Builds the table from an Open Food Facts `nutriments` object. Each
    /// nutrient defaults independently.
    #[must_use]
    pub fn from_nutriments(nutriments: Option<&Value>) -> Self {
        let entries = Nutrient::ALL
            .iter()
            .map(|&nutrient| {
                let raw = nutriments.and_then(|n| n.get(nutrient.source_key()));
                (nutrient, NutrientValue::from_source(raw))
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self::from_nutriments(None)
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&NutrientValue> {
        self.entries
            .iter()
            .find(|(n, _)| n.label() == label)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn value(&self, nutrient: Nutrient) -> &NutrientValue {
        static UNAVAILABLE: NutrientValue = NutrientValue::Unavailable;
        self.entries
            .iter()
            .find(|(n, _)| *n == nutrient)
            .map_or(&UNAVAILABLE, |(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, &NutrientValue)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    /// Entries that can be drawn as a share of the product: numeric values
    /// only, and energy is left out because it is not a mass.
    pub fn chartable(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries
            .iter()
            .filter(|(n, _)| *n != Nutrient::EnergyKcal)
            .filter_map(|(n, v)| v.as_f64().map(|amount| (n.label(), amount)))
    }
}

impl Serialize for NutritionalInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (nutrient, value) in &self.entries {
            map.serialize_entry(nutrient.label(), value)?;
        }
        map.end()
    }
}

/// Outcome of the structured API lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CatalogStatus {
    Found,
    NotFound { error: String },
    Unavailable { error: String },
}

impl CatalogStatus {
    #[must_use]
    pub fn not_found() -> Self {
        CatalogStatus::NotFound {
            error: CATALOG_NOT_FOUND.to_owned(),
        }
    }

    #[must_use]
    pub fn unavailable() -> Self {
        CatalogStatus::Unavailable {
            error: CATALOG_UNAVAILABLE.to_owned(),
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, CatalogStatus::Found)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            CatalogStatus::Found => None,
            CatalogStatus::NotFound { error } | CatalogStatus::Unavailable { error } => {
                Some(error)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesInfo {
    pub description: String,
    pub detailed_description: String,
}

/// Which lookup a [`SourceWarning`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    StructuredApi,
    ProductPage,
    ProductImage,
    CarbonFootprint,
    AdditivesDetail,
    ThreatenedSpecies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The remote call failed, timed out, or returned an unexpected status.
    SourceUnavailable,
    /// The page loaded but the expected markup was not there.
    MarkupMismatch,
}

/// Diagnostic attached to a record when a source degraded to placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceWarning {
    pub source: SourceKind,
    pub kind: WarningKind,
    pub message: String,
}

/// Normalized result of one product lookup. Every field is populated; data
/// that could not be retrieved holds its placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub barcode: Barcode,
    pub catalog: CatalogStatus,
    pub product_name: String,
    pub nutritional_info: NutritionalInfo,
    pub allergens: String,
    pub ingredients_text: String,
    pub categories: String,
    pub quantity: String,
    pub packaging: String,
    pub packaging_materials: String,
    pub labels: String,
    pub nutriscore: String,
    pub ecoscore: String,
    pub additives: Vec<String>,
    pub carbon_footprint: String,
    pub additives_detail: BTreeMap<String, String>,
    pub threatened_species: BTreeMap<String, SpeciesInfo>,
    pub product_image_url: Option<String>,
    pub warnings: Vec<SourceWarning>,
}

impl ProductRecord {
    /// Record with every field at its placeholder.
    #[must_use]
    pub fn placeholder(barcode: Barcode, catalog: CatalogStatus) -> Self {
        Self {
            barcode,
            catalog,
            product_name: NOT_AVAILABLE.to_owned(),
            nutritional_info: NutritionalInfo::unavailable(),
            allergens: DEFAULT_ALLERGENS.to_owned(),
            ingredients_text: DEFAULT_INGREDIENTS.to_owned(),
            categories: NOT_AVAILABLE.to_owned(),
            quantity: NOT_AVAILABLE.to_owned(),
            packaging: NOT_AVAILABLE.to_owned(),
            packaging_materials: DEFAULT_PACKAGING_MATERIALS.to_owned(),
            labels: DEFAULT_LABELS.to_owned(),
            nutriscore: NOT_AVAILABLE.to_owned(),
            ecoscore: NOT_AVAILABLE.to_owned(),
            additives: Vec::new(),
            carbon_footprint: DEFAULT_CARBON_FOOTPRINT.to_owned(),
            additives_detail: BTreeMap::new(),
            threatened_species: BTreeMap::new(),
            product_image_url: None,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_product_found(&self) -> bool {
        self.catalog.is_found()
    }
}

#[cfg(test)]
#[path = "product_test.rs"]
mod tests;
