//! Open Food Facts response types for `GET /api/v0/product/{barcode}.json`.
//!
//! ## Observed shape
//!
//! ### Unknown barcodes
//! The API answers `200 OK` with `{"status": 0, "status_verbose": "product
//! not found", "code": "..."}` and no `product` key. Some mirrors return
//! `404` instead, and a few return `"product": {}`. All three mean the
//! catalog has nothing for this barcode.
//!
//! ### Product fields
//! The product object has hundreds of optional keys whose types drift
//! between products (`ecoscore_score` is usually a number, occasionally a
//! string; `quantity` is normally a string but has been seen as a number).
//! We keep the object as raw JSON and pick fields out in `normalize.rs`.

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct OffProductResponse {
    #[serde(default)]
    pub status: Option<i64>,

    #[serde(default)]
    pub status_verbose: Option<String>,

    #[serde(default)]
    pub product: Option<Value>,
}

impl OffProductResponse {
    /// The product object, if the response carries a non-empty one.
    #[must_use]
    pub fn product(&self) -> Option<&Map<String, Value>> {
        self.product
            .as_ref()
            .and_then(Value::as_object)
            .filter(|fields| !fields.is_empty())
    }
}
