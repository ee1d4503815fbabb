use nutrify_core::product::{DEFAULT_ALLERGENS, DEFAULT_CARBON_FOOTPRINT};
use nutrify_core::{Barcode, CatalogStatus, Nutrient, NutrientValue, NOT_AVAILABLE};
use serde_json::json;

use super::*;

fn placeholder() -> ProductRecord {
    ProductRecord::placeholder(
        Barcode::parse_manual("3017620422003").unwrap(),
        CatalogStatus::Found,
    )
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// -----------------------------------------------------------------------
// text_field
// -----------------------------------------------------------------------

#[test]
fn text_field_reads_strings() {
    let product = object(json!({"quantity": "400 g"}));
    assert_eq!(text_field(&product, "quantity").as_deref(), Some("400 g"));
}

#[test]
fn text_field_treats_null_and_blank_as_absent() {
    let product = object(json!({"labels": null, "packaging": "   "}));
    assert!(text_field(&product, "labels").is_none());
    assert!(text_field(&product, "packaging").is_none());
    assert!(text_field(&product, "missing").is_none());
}

#[test]
fn text_field_renders_non_strings_as_json() {
    let product = object(json!({"ecoscore_score": 23, "flag": true, "ratio": 1.5}));
    assert_eq!(text_field(&product, "ecoscore_score").as_deref(), Some("23"));
    assert_eq!(text_field(&product, "flag").as_deref(), Some("true"));
    assert_eq!(text_field(&product, "ratio").as_deref(), Some("1.5"));
}

// -----------------------------------------------------------------------
// apply_catalog_product
// -----------------------------------------------------------------------

#[test]
fn copies_catalog_fields() {
    let product = object(json!({
        "product_name": "Nutella",
        "nutriments": {"energy-kcal": 539, "sugars": 56.3},
        "allergens": "en:milk,en:nuts",
        "ingredients_text": "Sugar, palm oil, hazelnuts",
        "categories": "Spreads",
        "quantity": "400 g",
        "packaging": "Glass jar",
        "packaging_materials": "glass",
        "labels": "No gluten",
        "nutriscore_grade": "e",
        "ecoscore_score": 23,
        "additives_tags": ["en:e322", "en:e322i"],
    }));
    let mut record = placeholder();

    apply_catalog_product(&mut record, &product);

    assert_eq!(record.product_name, "Nutella");
    assert_eq!(record.allergens, "en:milk,en:nuts");
    assert_eq!(record.categories, "Spreads");
    assert_eq!(record.packaging_materials, "glass");
    assert_eq!(record.nutriscore, "e");
    assert_eq!(record.ecoscore, "23");
    assert_eq!(record.additives, vec!["en:e322", "en:e322i"]);
    assert_eq!(
        record.nutritional_info.value(Nutrient::EnergyKcal),
        &NutrientValue::Reported(json!(539))
    );
    assert_eq!(
        record.nutritional_info.value(Nutrient::Fiber),
        &NutrientValue::Unavailable
    );
}

#[test]
fn absent_fields_keep_placeholders() {
    let product = object(json!({"product_name": "Plain water"}));
    let mut record = placeholder();

    apply_catalog_product(&mut record, &product);

    assert_eq!(record.product_name, "Plain water");
    assert_eq!(record.allergens, DEFAULT_ALLERGENS);
    assert_eq!(record.nutriscore, NOT_AVAILABLE);
    assert_eq!(record.carbon_footprint, DEFAULT_CARBON_FOOTPRINT);
    assert!(record.additives.is_empty());
    assert_eq!(record.nutritional_info.iter().count(), 8);
    assert!(record
        .nutritional_info
        .iter()
        .all(|(_, value)| !value.is_available()));
}

#[test]
fn api_carbon_footprint_overrides_placeholder() {
    let product = object(json!({"carbon_footprint": "320 g CO2e"}));
    let mut record = placeholder();

    apply_catalog_product(&mut record, &product);

    assert_eq!(record.carbon_footprint, "320 g CO2e");
}

#[test]
fn additive_tags_ignore_non_strings() {
    let product = object(json!({"additives_tags": ["en:e330", 4, null, ""]}));
    let mut record = placeholder();

    apply_catalog_product(&mut record, &product);

    assert_eq!(record.additives, vec!["en:e330"]);
}
