use axum::{
    extract::{Path, State},
    Extension, Json,
};
use nutrify_core::{Barcode, CatalogStatus, ProductRecord};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Manual lookup: the path segment must be a valid retail barcode.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw): Path<String>,
) -> Result<Json<ApiResponse<ProductRecord>>, ApiError> {
    let barcode = Barcode::parse_manual(&raw)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let record = state.aggregator.aggregate(&barcode).await;
    record_response(req_id.0, record)
}

/// Wraps a record in the envelope. A catalog miss is terminal and becomes
/// a 404; an unavailable catalog still returns the partial record.
pub(super) fn record_response(
    request_id: String,
    record: ProductRecord,
) -> Result<Json<ApiResponse<ProductRecord>>, ApiError> {
    if let CatalogStatus::NotFound { error } = &record.catalog {
        return Err(ApiError::new(request_id, "not_found", error.clone()));
    }

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(request_id),
    }))
}
