use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use disbursement_adapters::{
    cancellable, Bank, DisbursementRequest, Records, TransferReceipt, TransferStatusReport,
};
use prometheus::{Encoder, TextEncoder};
use tracing::info;

pub async fn list_banks(
    State(state): State<AppState>,
    Path(rail): Path<String>,
) -> Result<Json<Records<Bank>>, ApiError> {
    let banks = cancellable(&state.shutdown, state.service.list_banks(&rail)).await?;
    Ok(Json(banks))
}

pub async fn transfer(
    State(state): State<AppState>,
    Path(rail): Path<String>,
    Json(request): Json<DisbursementRequest>,
) -> Result<Json<TransferReceipt>, ApiError> {
    info!(
        "Disbursement request on {} to bank {}",
        rail, request.details.receiving_bank
    );
    let receipt = cancellable(&state.shutdown, state.service.transfer_funds(&rail, &request)).await?;
    Ok(Json(receipt))
}

pub async fn transfer_status(
    State(state): State<AppState>,
    Path((method, reference_id)): Path<(String, String)>,
) -> Result<Json<TransferStatusReport>, ApiError> {
    let report = cancellable(
        &state.shutdown,
        state.service.get_status(&method, &reference_id),
    )
    .await?;
    Ok(Json(report))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&prometheus::gather(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain".to_string())],
            format!("Failed to export metrics: {}", e).into_bytes(),
        ),
    }
}
