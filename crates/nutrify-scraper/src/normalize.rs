//! Maps an Open Food Facts product object onto [`ProductRecord`] fields.
//!
//! Only API-sourced fields are touched. Anything the product does not carry
//! keeps the placeholder it already has.

use nutrify_core::{NutritionalInfo, ProductRecord};
use serde_json::{Map, Value};

/// Copies catalog fields from `product` into `record`.
pub fn apply_catalog_product(record: &mut ProductRecord, product: &Map<String, Value>) {
    record.nutritional_info = NutritionalInfo::from_nutriments(product.get("nutriments"));

    let text_targets: [(&str, &mut String); 11] = [
        ("product_name", &mut record.product_name),
        ("allergens", &mut record.allergens),
        ("ingredients_text", &mut record.ingredients_text),
        ("categories", &mut record.categories),
        ("quantity", &mut record.quantity),
        ("packaging", &mut record.packaging),
        ("packaging_materials", &mut record.packaging_materials),
        ("labels", &mut record.labels),
        ("nutriscore_grade", &mut record.nutriscore),
        ("ecoscore_score", &mut record.ecoscore),
        ("carbon_footprint", &mut record.carbon_footprint),
    ];
    for (key, target) in text_targets {
        if let Some(value) = text_field(product, key) {
            *target = value;
        }
    }

    record.additives = additive_tags(product);
}

/// Reads `key` as display text.
///
/// `null` and blank strings count as absent; numbers, booleans, and nested
/// values are rendered as their JSON text.
#[must_use]
pub fn text_field(product: &Map<String, Value>, key: &str) -> Option<String> {
    match product.get(key)? {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        other => Some(other.to_string()),
    }
}

fn additive_tags(product: &Map<String, Value>) -> Vec<String> {
    match product.get("additives_tags") {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect(),
        Some(Value::String(tag)) if !tag.trim().is_empty() => vec![tag.trim().to_owned()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
