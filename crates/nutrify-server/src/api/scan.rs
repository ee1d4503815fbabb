use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Extension, Json,
};
use nutrify_core::{Barcode, ProductRecord};
use nutrify_vision::VisionError;
use serde::Serialize;

use crate::middleware::RequestId;

use super::products::record_response;
use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ScanData {
    barcode: Barcode,
}

/// Resolves a barcode from the raw image in the request body.
pub(super) async fn scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<ScanData>>, ApiError> {
    let barcode = resolve_upload(&state, &req_id.0, body).await?;

    Ok(Json(ApiResponse {
        data: ScanData { barcode },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Scan followed by a product lookup on the decoded barcode.
pub(super) async fn scan_lookup(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<ProductRecord>>, ApiError> {
    let barcode = resolve_upload(&state, &req_id.0, body).await?;
    let record = state.aggregator.aggregate(&barcode).await;
    record_response(req_id.0, record)
}

/// Maps a failed body read into the error envelope. Oversized uploads keep
/// their 413 through the `payload_too_large` code.
fn upload_body(
    request_id: &str,
    body: Result<Bytes, BytesRejection>,
) -> Result<Bytes, ApiError> {
    body.map_err(|rejection| {
        let code = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            "payload_too_large"
        } else {
            "bad_request"
        };
        tracing::debug!(%request_id, error = %rejection, "rejected upload body");
        ApiError::new(request_id, code, rejection.body_text())
    })
}

async fn resolve_upload(
    state: &AppState,
    request_id: &str,
    body: Result<Bytes, BytesRejection>,
) -> Result<Barcode, ApiError> {
    let body = upload_body(request_id, body)?;
    if body.is_empty() {
        return Err(ApiError::new(
            request_id,
            "bad_request",
            "request body must contain an image",
        ));
    }

    let resolver = Arc::clone(&state.resolver);
    let result = tokio::task::spawn_blocking(move || resolver.resolve_bytes(&body))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "barcode resolution task failed");
            ApiError::new(request_id, "internal_error", "barcode resolution failed")
        })?;

    result.map_err(|e| match e {
        VisionError::InvalidImage(_) => {
            tracing::debug!(%request_id, error = %e, "rejected undecodable upload");
            ApiError::new(request_id, "bad_request", e.to_string())
        }
        VisionError::NoBarcodeDetected => ApiError::new(
            request_id,
            "no_barcode_detected",
            "no barcode detected in image",
        ),
    })
}
