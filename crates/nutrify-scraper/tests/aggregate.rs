//! End-to-end tests for `ProductAggregator::aggregate`.
//!
//! A `wiremock` server stands in for both the catalog API and the product
//! pages, so every scenario runs without real network traffic.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nutrify_core::product::{DEFAULT_ALLERGENS, DEFAULT_CARBON_FOOTPRINT};
use nutrify_core::{
    Barcode, CatalogStatus, Nutrient, NutrientValue, ProductRecord, SourceKind, WarningKind,
    NOT_AVAILABLE,
};
use nutrify_scraper::{AggregatorConfig, ProductAggregator};

const NUTELLA: &str = "3017620422003";

fn config_for(server: &MockServer) -> AggregatorConfig {
    AggregatorConfig {
        api_host: server.uri(),
        web_host: server.uri(),
        request_timeout: Duration::from_secs(5),
        user_agent: "nutrify-test/0.1".to_owned(),
        max_retries: 0,
        backoff_base_secs: 0,
    }
}

fn aggregator(server: &MockServer) -> ProductAggregator {
    ProductAggregator::new(&config_for(server)).expect("failed to build test aggregator")
}

fn barcode(code: &str) -> Barcode {
    Barcode::parse_manual(code).expect("valid test barcode")
}

fn api_path(code: &str) -> String {
    format!("/api/v0/product/{code}.json")
}

fn page_path(code: &str) -> String {
    format!("/product/{code}")
}

fn nutella_json() -> serde_json::Value {
    json!({
        "code": NUTELLA,
        "status": 1,
        "status_verbose": "product found",
        "product": {
            "product_name": "Nutella",
            "nutriments": {
                "energy-kcal": 539,
                "fat": 30.9,
                "saturated-fat": 10.6,
                "carbohydrates": 57.5,
                "sugars": 56.3,
                "proteins": 6.3,
                "salt": 0.107
            },
            "allergens": "en:milk,en:nuts,en:soybeans",
            "ingredients_text": "Sugar, palm oil, hazelnuts 13%, skimmed milk powder 8.7%",
            "categories": "Breakfasts, Spreads, Sweet spreads",
            "quantity": "400 g",
            "packaging": "Glass jar",
            "labels": "Green Dot",
            "nutriscore_grade": "e",
            "ecoscore_score": 23,
            "additives_tags": ["en:e322", "en:e322i"]
        }
    })
}

const FULL_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <img class="product_image" src="/images/products/301/762/042/2003/front_en.jpg" alt="Nutella">
  <div class="panel"><span>Carbon footprint: <span>93 g CO₂e per 100 g</span></span></div>
  <div id="panel_additives">
    <ul class="panel_accordion accordion">
      <li><h4 style="font-size:1.1rem;">E322 - Lecithins</h4>
      <div class="panel_text">Lecithins are a group of emulsifiers.</div></li>
    </ul>
  </div>
  <h3 class="panel_title_card">Threatened species</h3>
  <ul class="panel_accordion accordion">
    <li><h4 class="evaluation_bad_title">Orangutan</h4>
    <span>Palm oil production drives deforestation.</span>
    <div class="panel_text">Borneo and Sumatra habitat loss.</div></li>
  </ul>
</body></html>"#;

const IMAGE_ONLY_PAGE: &str = r#"<html><body>
  <img class="product_image" src="https://images.openfoodfacts.org/unknown.jpg">
</body></html>"#;

async fn mount_api(server: &MockServer, code: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(api_path(code)))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, code: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path(code)))
        .respond_with(response)
        .mount(server)
        .await;
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_owned(), "text/html; charset=utf-8")
}

fn assert_api_placeholders(record: &ProductRecord) {
    assert_eq!(record.product_name, NOT_AVAILABLE);
    assert_eq!(record.allergens, DEFAULT_ALLERGENS);
    assert_eq!(record.nutriscore, NOT_AVAILABLE);
    assert_eq!(record.ecoscore, NOT_AVAILABLE);
    assert!(record.additives.is_empty());
    assert_eq!(record.nutritional_info.iter().count(), 8);
    assert!(record
        .nutritional_info
        .iter()
        .all(|(_, value)| *value == NutrientValue::Unavailable));
}

// ---------------------------------------------------------------------------
// Known product, both sources healthy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn known_product_merges_both_sources() {
    let server = MockServer::start().await;
    mount_api(&server, NUTELLA, ResponseTemplate::new(200).set_body_json(nutella_json())).await;
    mount_page(&server, NUTELLA, html(FULL_PAGE)).await;

    let record = aggregator(&server).aggregate(&barcode(NUTELLA)).await;

    assert_eq!(record.catalog, CatalogStatus::Found);
    assert_eq!(record.product_name, "Nutella");
    assert_eq!(
        record.nutritional_info.value(Nutrient::EnergyKcal),
        &NutrientValue::Reported(json!(539))
    );
    assert_eq!(
        record.nutritional_info.value(Nutrient::Fiber),
        &NutrientValue::Unavailable
    );
    assert_eq!(record.nutriscore, "e");
    assert_eq!(record.ecoscore, "23");
    assert_eq!(record.additives, vec!["en:e322", "en:e322i"]);
    assert_eq!(record.carbon_footprint, "93 g CO₂e per 100 g");
    assert_eq!(
        record.product_image_url,
        Some(format!(
            "{}/images/products/301/762/042/2003/front_en.jpg",
            server.uri()
        ))
    );
    assert_eq!(
        record.additives_detail["E322 - Lecithins"],
        "Lecithins are a group of emulsifiers."
    );
    assert_eq!(
        record.threatened_species["Orangutan"].description,
        "Palm oil production drives deforestation."
    );
    assert!(record.warnings.is_empty(), "unexpected warnings: {:?}", record.warnings);
}

#[tokio::test]
async fn serialized_record_keeps_nutrient_order_and_sentinels() {
    let server = MockServer::start().await;
    mount_api(&server, NUTELLA, ResponseTemplate::new(200).set_body_json(nutella_json())).await;
    mount_page(&server, NUTELLA, html(FULL_PAGE)).await;

    let record = aggregator(&server).aggregate(&barcode(NUTELLA)).await;
    let value = serde_json::to_value(&record).unwrap();

    let nutrients = value["nutritional_info"].as_object().unwrap();
    assert_eq!(nutrients.len(), 8);
    assert_eq!(nutrients["🔥energy_kcal"], json!(539));
    assert_eq!(nutrients["🥦fiber"], json!(NOT_AVAILABLE));
    assert_eq!(value["catalog"]["status"], json!("found"));
    assert_eq!(value["barcode"], json!(NUTELLA));
}

// ---------------------------------------------------------------------------
// Catalog misses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn catalog_404_marks_not_found_but_keeps_page_data() {
    let server = MockServer::start().await;
    let code = "0000000000000";
    mount_api(&server, code, ResponseTemplate::new(404)).await;
    mount_page(&server, code, html(IMAGE_ONLY_PAGE)).await;

    let record = aggregator(&server).aggregate(&barcode(code)).await;

    assert_eq!(record.catalog, CatalogStatus::not_found());
    assert_eq!(
        record.catalog.error(),
        Some("Product not found or missing data.")
    );
    assert_api_placeholders(&record);
    assert_eq!(
        record.product_image_url.as_deref(),
        Some("https://images.openfoodfacts.org/unknown.jpg")
    );
}

#[tokio::test]
async fn catalog_without_product_is_not_found() {
    let server = MockServer::start().await;
    mount_api(
        &server,
        NUTELLA,
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": 0, "status_verbose": "product not found"})),
    )
    .await;
    mount_page(&server, NUTELLA, html(IMAGE_ONLY_PAGE)).await;

    let record = aggregator(&server).aggregate(&barcode(NUTELLA)).await;

    assert_eq!(record.catalog, CatalogStatus::not_found());
    assert_api_placeholders(&record);
}

// ---------------------------------------------------------------------------
// Page without optional panels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn page_without_additives_panel_yields_empty_map() {
    let server = MockServer::start().await;
    mount_api(&server, NUTELLA, ResponseTemplate::new(200).set_body_json(nutella_json())).await;
    mount_page(&server, NUTELLA, html(IMAGE_ONLY_PAGE)).await;

    let record = aggregator(&server).aggregate(&barcode(NUTELLA)).await;

    assert!(record.additives_detail.is_empty());
    assert!(record.threatened_species.is_empty());
    assert_eq!(record.carbon_footprint, DEFAULT_CARBON_FOOTPRINT);
    assert!(record.warnings.iter().any(|w| {
        w.source == SourceKind::AdditivesDetail && w.kind == WarningKind::MarkupMismatch
    }));
    // Catalog data is unaffected by the missing panels.
    assert_eq!(record.nutriscore, "e");
}

// ---------------------------------------------------------------------------
// Source failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn catalog_failure_still_populates_web_fields() {
    let server = MockServer::start().await;
    mount_api(&server, NUTELLA, ResponseTemplate::new(500)).await;
    mount_page(&server, NUTELLA, html(FULL_PAGE)).await;

    let record = aggregator(&server).aggregate(&barcode(NUTELLA)).await;

    assert_eq!(record.catalog, CatalogStatus::unavailable());
    assert_eq!(
        record.catalog.error(),
        Some("Failed to fetch data from Open Food Facts API.")
    );
    assert_api_placeholders(&record);
    assert!(record.product_image_url.is_some());
    assert_eq!(record.carbon_footprint, "93 g CO₂e per 100 g");
    assert_eq!(record.additives_detail.len(), 1);
    assert_eq!(record.threatened_species.len(), 1);
    assert!(record
        .warnings
        .iter()
        .any(|w| w.source == SourceKind::StructuredApi && w.kind == WarningKind::SourceUnavailable));
}

#[tokio::test]
async fn invalid_catalog_json_is_unavailable() {
    let server = MockServer::start().await;
    mount_api(
        &server,
        NUTELLA,
        ResponseTemplate::new(200).set_body_raw("<html>maintenance</html>", "text/html"),
    )
    .await;
    mount_page(&server, NUTELLA, html(IMAGE_ONLY_PAGE)).await;

    let record = aggregator(&server).aggregate(&barcode(NUTELLA)).await;

    assert_eq!(record.catalog, CatalogStatus::unavailable());
    assert!(record.product_image_url.is_some());
}

#[tokio::test]
async fn page_failure_keeps_catalog_data() {
    let server = MockServer::start().await;
    mount_api(&server, NUTELLA, ResponseTemplate::new(200).set_body_json(nutella_json())).await;
    mount_page(&server, NUTELLA, ResponseTemplate::new(503)).await;

    let record = aggregator(&server).aggregate(&barcode(NUTELLA)).await;

    assert_eq!(record.catalog, CatalogStatus::Found);
    assert_eq!(record.product_name, "Nutella");
    assert!(record.product_image_url.is_none());
    assert_eq!(record.carbon_footprint, DEFAULT_CARBON_FOOTPRINT);
    assert!(record.additives_detail.is_empty());
    assert_eq!(record.warnings.len(), 1);
    assert_eq!(record.warnings[0].source, SourceKind::ProductPage);
}

#[tokio::test]
async fn both_sources_down_yield_full_placeholder_record() {
    let server = MockServer::start().await;
    mount_api(&server, NUTELLA, ResponseTemplate::new(502)).await;
    mount_page(&server, NUTELLA, ResponseTemplate::new(502)).await;

    let record = aggregator(&server).aggregate(&barcode(NUTELLA)).await;

    let mut expected = ProductRecord::placeholder(barcode(NUTELLA), CatalogStatus::unavailable());
    expected.warnings.clone_from(&record.warnings);
    assert_eq!(record, expected);
    assert_eq!(record.warnings.len(), 2);
}

#[tokio::test]
async fn slow_catalog_times_out_without_blocking_page() {
    let server = MockServer::start().await;
    mount_api(
        &server,
        NUTELLA,
        ResponseTemplate::new(200)
            .set_body_json(nutella_json())
            .set_delay(Duration::from_secs(5)),
    )
    .await;
    mount_page(&server, NUTELLA, html(FULL_PAGE)).await;

    let config = AggregatorConfig {
        request_timeout: Duration::from_secs(1),
        ..config_for(&server)
    };
    let record = ProductAggregator::new(&config)
        .unwrap()
        .aggregate(&barcode(NUTELLA))
        .await;

    assert_eq!(record.catalog, CatalogStatus::unavailable());
    assert_eq!(record.carbon_footprint, "93 g CO₂e per 100 g");
}

#[tokio::test]
async fn transient_catalog_error_is_retried_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(NUTELLA)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_api(&server, NUTELLA, ResponseTemplate::new(200).set_body_json(nutella_json())).await;
    mount_page(&server, NUTELLA, html(FULL_PAGE)).await;

    let config = AggregatorConfig {
        max_retries: 1,
        ..config_for(&server)
    };
    let record = ProductAggregator::new(&config)
        .unwrap()
        .aggregate(&barcode(NUTELLA))
        .await;

    assert_eq!(record.catalog, CatalogStatus::Found);
    assert_eq!(record.product_name, "Nutella");
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn aggregate_is_idempotent_for_unchanged_sources() {
    let server = MockServer::start().await;
    mount_api(&server, NUTELLA, ResponseTemplate::new(200).set_body_json(nutella_json())).await;
    mount_page(&server, NUTELLA, html(FULL_PAGE)).await;

    let aggregator = aggregator(&server);
    let first = aggregator.aggregate(&barcode(NUTELLA)).await;
    let second = aggregator.aggregate(&barcode(NUTELLA)).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn requests_use_the_configured_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(NUTELLA)))
        .respond_with(ResponseTemplate::new(200).set_body_json(nutella_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(page_path(NUTELLA)))
        .respond_with(html(FULL_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    aggregator(&server).aggregate(&barcode(NUTELLA)).await;

    server.verify().await;
}
